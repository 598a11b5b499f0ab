use super::app_logic::TuiApp;
use super::app_state::AppMode;
use crate::icons::icon_for_entry;
use crate::model::TreeModel;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

const DETAIL_COLUMN_WIDTH: u16 = 16;

fn draw_help_block<M: TreeModel>(f: &mut Frame, _app: &TuiApp<M>, area: Rect) {
    let help_text_lines_content = vec![
        Line::from("Arrows/jk: Nav | Right/l: Open | Left/h: Close/Parent | Enter/Space/o: Fold | q: Quit"),
        Line::from("PgUp/PgDn/Home/End: Jump | -: Collapse All | r: Reload | s/S: Sort/Reverse | /: Filter | Esc: Clear Filter"),
    ];
    let help_paragraph = Paragraph::new(help_text_lines_content)
        .block(Block::default().borders(Borders::ALL).title("Dir View"));
    f.render_widget(help_paragraph, area);
}

fn draw_filter_input_block<M: TreeModel>(f: &mut Frame, app: &TuiApp<M>, area: Rect) {
    let input_text = format!("/{}", app.filter_input);
    let filter_paragraph = Paragraph::new(input_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Enter file or folder name to filter (Esc to clear, Enter to apply)"),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(filter_paragraph, area);
    let cursor_col = app.filter_input[..app.filter_cursor_pos].chars().count() as u16;
    f.set_cursor_position((area.x + 1 + cursor_col + 1, area.y + 1));
}

fn draw_tree_block<M: TreeModel>(f: &mut Frame, app: &mut TuiApp<M>, area: Rect) {
    // Borders plus the header row.
    app.list_viewport_height = area.height.saturating_sub(3) as usize;
    app.ensure_selection_is_visible_in_viewport();

    let selected_position = app.selected_position();
    let visible_rows = app.visible_rows().to_vec();
    let num_visible_items = visible_rows.len();
    let column_count = app.model.column_count();

    let rows_to_render = visible_rows
        .get(app.scroll_offset..(app.scroll_offset + app.list_viewport_height).min(num_visible_items))
        .unwrap_or(&[]);

    // Cell values are computed only for rows inside the viewport.
    let rows: Vec<Row> = rows_to_render
        .iter()
        .map(|visible| {
            let item = &app.items[visible.index];
            let expansion_prefix = if item.is_dir() {
                if item.is_expanded { "[-] " } else { "[+] " }
            } else {
                "    "
            };
            let name_cell = format!(
                "{}{}{}{}",
                visible.prefix,
                expansion_prefix,
                icon_for_entry(&item.entry, app.custom_dir_icons),
                app.model.cell_value(&item.entry, 0)
            );
            let mut cells = vec![Cell::from(name_cell)];
            cells.extend((1..column_count).map(|c| Cell::from(app.model.cell_value(&item.entry, c))));
            Row::new(cells)
        })
        .collect();

    let header = Row::new((0..column_count).map(|c| {
        let label = app.model.header_label(c);
        if c == app.sort.column {
            Cell::from(format!("{} {}", label, app.sort.indicator()))
        } else {
            Cell::from(label)
        }
    }))
    .style(Style::default().add_modifier(Modifier::BOLD));

    let widths: Vec<Constraint> = (0..column_count)
        .map(|c| {
            if c == 0 {
                Constraint::Fill(1)
            } else {
                Constraint::Length(DETAIL_COLUMN_WIDTH)
            }
        })
        .collect();

    let root_display = app.root_path().display().to_string();
    let tree_title = if app.filter.is_active() && app.mode == AppMode::Normal {
        format!("{} (Filter: '{}')", root_display, app.filter.pattern().as_str())
    } else {
        root_display
    };

    let selected_path = app
        .selected_entry()
        .map(|entry| entry.path.display().to_string())
        .unwrap_or_default();

    let table_widget = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(tree_title)
                .title_bottom(Line::from(selected_path)),
        )
        .row_highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("❯ ");

    let mut table_state = TableState::default();
    if let Some(pos) = selected_position {
        if pos >= app.scroll_offset && pos < app.scroll_offset + app.list_viewport_height {
            table_state.select(Some(pos - app.scroll_offset));
        }
    }
    f.render_stateful_widget(table_widget, area, &mut table_state);
}

pub(super) fn ui_frame<M: TreeModel>(frame: &mut Frame, app: &mut TuiApp<M>) {
    let help_lines = 2;
    let filter_input_height = if app.mode == AppMode::Filtering { 3 } else { 0 };
    let top_block_container_height = (help_lines + 2) + filter_input_height;

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(top_block_container_height),
            Constraint::Min(0),
        ])
        .split(frame.area());

    let top_container_area = main_chunks[0];
    let tree_area = main_chunks[1];

    let top_content_constraints = if app.mode == AppMode::Filtering {
        vec![
            Constraint::Length(help_lines + 2),
            Constraint::Length(filter_input_height),
        ]
    } else {
        vec![Constraint::Length(help_lines + 2)]
    };
    let top_content_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(top_content_constraints)
        .split(top_container_area);

    draw_help_block(frame, app, top_content_chunks[0]);
    if app.mode == AppMode::Filtering {
        draw_filter_input_block(frame, app, top_content_chunks[1]);
    }

    draw_tree_block(frame, app, tree_area);
}
