//! Recursive row filter.
//!
//! A row stays visible when its own text matches the pattern or when any
//! row below it does, at any depth.

use crate::model::TreeModel;
use crate::provider::Entry;
use regex::{Regex, RegexBuilder};
use tracing::trace;

#[derive(Debug, Clone, Default)]
enum Matcher {
    #[default]
    All,
    Regex(Regex),
    /// Lowercased needle, used when the text is not a valid regex.
    Literal(String),
}

/// A case-insensitive pattern typed into the filter box.
#[derive(Debug, Clone, Default)]
pub struct FilterPattern {
    source: String,
    matcher: Matcher,
}

impl FilterPattern {
    pub fn new(text: &str) -> Self {
        if text.is_empty() {
            return FilterPattern::default();
        }
        let matcher = match RegexBuilder::new(text).case_insensitive(true).build() {
            Ok(re) => Matcher::Regex(re),
            Err(e) => {
                trace!("filter {:?} is not a regex, matching literally: {}", text, e);
                Matcher::Literal(text.to_lowercase())
            }
        };
        FilterPattern {
            source: text.to_string(),
            matcher,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn is_match(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::All => true,
            Matcher::Regex(re) => re.is_match(text),
            Matcher::Literal(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecursiveFilter {
    pattern: FilterPattern,
}

impl RecursiveFilter {
    pub fn set_pattern(&mut self, text: &str) {
        self.pattern = FilterPattern::new(text);
    }

    pub fn pattern(&self) -> &FilterPattern {
        &self.pattern
    }

    pub fn is_active(&self) -> bool {
        !self.pattern.is_empty()
    }

    /// Whether `entry` or any descendant matches.
    ///
    /// Children are enumerated through `model` only when the row itself does
    /// not match. Unreadable directories simply have no children, and
    /// symlinked directories are not descended into.
    pub fn accepts<M: TreeModel + ?Sized>(&self, model: &M, entry: &Entry) -> bool {
        if self.pattern.is_match(&model.display_text(entry)) {
            return true;
        }
        if !entry.is_dir() || entry.is_symlink {
            return false;
        }
        model
            .unordered_children(entry)
            .iter()
            .any(|child| self.accepts(model, child))
    }
}
