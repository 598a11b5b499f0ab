//! Nerd Font glyphs for rows.
//!
//! Well-known directories get their own icon unless custom directory icons
//! are turned off, in which case every directory uses the plain folder glyph.

use crate::provider::Entry;

const FOLDER: &str = "\u{f07b} ";
const FILE: &str = "\u{f15b} ";
const SYMLINK: &str = "\u{f0c1} ";

pub fn icon_for_entry(entry: &Entry, custom_dir_icons: bool) -> &'static str {
    if !entry.is_dir() {
        return if entry.is_symlink { SYMLINK } else { FILE };
    }
    if custom_dir_icons {
        if let Some(icon) = icon_for_dirname(&entry.name) {
            return icon;
        }
    }
    FOLDER
}

fn icon_for_dirname(name: &str) -> Option<&'static str> {
    let icon = match name.to_lowercase().as_str() {
        ".git" => "\u{e5fb} ",
        ".github" => "\u{e5fd} ",
        ".config" => "\u{e5fc} ",
        "node_modules" => "\u{e5fa} ",
        "desktop" => "\u{f108} ",
        "downloads" => "\u{f019} ",
        "music" => "\u{f001} ",
        "pictures" | "photos" => "\u{f03e} ",
        "videos" | "movies" => "\u{f008} ",
        "documents" => "\u{f02d} ",
        _ => return None,
    };
    Some(icon)
}
