use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::sync::OnceLock;

use crate::app::{App, Popup, Section};
use crate::theme::Theme;

// Load theme colors from system (Omarchy/Hyprland) once at startup
static THEME: OnceLock<Theme> = OnceLock::new();

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::load)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn tile_color() -> Color { theme().tile }
fn tile_marked() -> Color { theme().tile_marked }
fn inactive() -> Color { theme().inactive }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

/// Width of one grid cell in terminal columns
const CELL_WIDTH: u16 = 2;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(4),    // Grid + mirror panel
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);

    // The mirror panel only occupies space while it is visible, like the
    // show/hide container on the original tiles page
    if app.mirror.visible {
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(20),
                Constraint::Length(26), // Mirror panel
            ])
            .split(chunks[1]);
        draw_grid_box(f, app, main[0]);
        draw_mirror_panel(f, app, main[1]);
    } else {
        draw_grid_box(f, app, chunks[1]);
    }

    draw_footer(f, app, chunks[2]);

    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f),
        Popup::ConfirmClear => draw_confirm_popup(f, app),
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.as_str(), Style::default().fg(warning())))
    } else if app.grid.is_empty() {
        Line::from(Span::styled(
            format!("No tiles in {}", app.map_dir.display()),
            Style::default().fg(text_dim()),
        ))
    } else if app.config.show_coordinates {
        match app.grid.tile_at(app.cursor_x, app.cursor_z) {
            Some(tile) => {
                let mut spans = vec![
                    Span::styled(tile.name.clone(), Style::default().fg(text())),
                    Span::styled(
                        format!(" ({}, {})", tile.x, tile.z),
                        Style::default().fg(text_dim()),
                    ),
                ];
                if app.widget.contains(&tile.name) {
                    spans.push(Span::styled(" ● selected", Style::default().fg(tile_marked())));
                }
                Line::from(spans)
            }
            None => Line::from(Span::styled(
                format!("({}, {}) — no tile", app.cursor_x, app.cursor_z),
                Style::default().fg(text_dim()),
            )),
        }
    } else {
        Line::from(Span::styled(
            format!("{} tiles · {} selected", app.grid.len(), app.widget.len()),
            Style::default().fg(text_dim()),
        ))
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_grid_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Grid;
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    let title = match app.grid.bounds() {
        Some(b) => format!(" Map ({} tiles, {}×{}) ", app.grid.len(), b.width(), b.height()),
        None => " Map ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    if app.grid.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No tile images found",
                Style::default().fg(text_dim()),
            )),
            Line::from(Span::styled(
                "  Expected files like tile.0.0.png",
                Style::default().fg(text_dim()),
            )),
        ])
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    // Bounds exist whenever the grid is non-empty
    let Some(bounds) = app.grid.bounds() else {
        return;
    };

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let cols = (inner_width / CELL_WIDTH).max(1) as i32;
    let rows = inner_height.max(1) as i32;

    let start_x = viewport_start(app.cursor_x, bounds.min_x, bounds.max_x, cols);
    let start_z = viewport_start(app.cursor_z, bounds.min_z, bounds.max_z, rows);

    let mut lines = Vec::new();
    for z in start_z..=(start_z + rows - 1).min(bounds.max_z) {
        let mut spans = Vec::new();
        for x in start_x..=(start_x + cols - 1).min(bounds.max_x) {
            let is_cursor = is_active && x == app.cursor_x && z == app.cursor_z;
            let (glyph, fg) = match app.grid.tile_at(x, z) {
                Some(t) if t.marked => ("██", tile_marked()),
                Some(_) => ("▒▒", tile_color()),
                None => ("  ", text_dim()),
            };
            let mut style = Style::default().fg(fg);
            if is_cursor {
                style = style.bg(bg_selected()).add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(glyph, style));
        }
        lines.push(Line::from(spans));
    }

    let grid = Paragraph::new(lines).block(block);
    f.render_widget(grid, area);
}

/// First visible coordinate so the cursor stays on screen, preferring to
/// center it on maps larger than the viewport.
fn viewport_start(cursor: i32, min: i32, max: i32, len: i32) -> i32 {
    if len <= 0 {
        return min;
    }
    let last_start = (max - len + 1).max(min);
    (cursor - len / 2).clamp(min, last_start)
}

fn draw_mirror_panel(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Mirror;
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    let block = Block::default()
        .title(Span::styled(
            format!(" Selected ({}) ", app.widget.len()),
            title_style,
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let mut lines: Vec<Line> = app
        .mirror
        .text
        .lines()
        .map(|name| {
            // Names the grid does not know are dimmed while the user edits
            let known = app.grid.find_by_name(name.trim()).is_some();
            let style = if known {
                Style::default().fg(text())
            } else {
                Style::default().fg(text_dim())
            };
            Line::styled(name.to_string(), style)
        })
        .collect();

    if is_active {
        lines.push(Line::styled("█", Style::default().fg(accent())));
    }

    let panel = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(panel, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.section {
        Section::Grid => vec![
            ("←↓↑→", "Move"),
            ("Space", "Toggle"),
            ("Tab", "Edit list"),
            ("c", "Clear"),
            ("R", "Rescan"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
        Section::Mirror => vec![
            ("type", "Edit names"),
            ("Enter", "New line"),
            ("Esc/Tab", "Back to map"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 {
        4
    } else if area.width < 80 {
        5
    } else {
        hints.len()
    };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 90 } else { 60 },
        if area.height < 30 { 90 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "═══ Map ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  ←↓↑→ hjkl ", Style::default().fg(accent())),
            Span::raw("Move the cursor across the tile grid"),
        ]),
        Line::from(vec![
            Span::styled("  Space     ", Style::default().fg(accent())),
            Span::raw("Toggle the tile under the cursor"),
        ]),
        Line::from(vec![
            Span::styled("  c         ", Style::default().fg(accent())),
            Span::raw("Clear the whole selection"),
        ]),
        Line::from(vec![
            Span::styled("  R         ", Style::default().fg(accent())),
            Span::raw("Rescan the map directory"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Selected list ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  Tab       ", Style::default().fg(accent())),
            Span::raw("Focus the list (appears once something is selected)"),
        ]),
        Line::from(vec![
            Span::raw("            Edit it freely: names separated by whitespace"),
        ]),
        Line::from(vec![
            Span::raw("            become the new selection as you type"),
        ]),
        Line::from(vec![
            Span::styled("  Esc       ", Style::default().fg(accent())),
            Span::raw("Back to the map, tidying the list"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Command line ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  tilepick DIR           ", Style::default().fg(accent())),
            Span::raw("Pick tiles from a map directory"),
        ]),
        Line::from(vec![
            Span::styled("  tilepick --list DIR    ", Style::default().fg(accent())),
            Span::raw("Print tile names and exit"),
        ]),
        Line::from(vec![
            Span::styled("  tilepick --select NAME ", Style::default().fg(accent())),
            Span::raw("Start with tiles pre-selected"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  On quit the selection is printed to stdout,", Style::default().fg(text_dim())),
        ]),
        Line::from(vec![
            Span::styled("  one tile name per line.", Style::default().fg(text_dim())),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" tilepick Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn draw_confirm_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(40, 20, f.area());

    f.render_widget(Clear, popup_area);

    let message = app.status_message.as_deref().unwrap_or("Confirm?");

    let confirm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(warning()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y", Style::default().fg(tile_marked()).add_modifier(Modifier::BOLD)),
            Span::raw(" Yes   "),
            Span::styled("n", Style::default().fg(danger()).add_modifier(Modifier::BOLD)),
            Span::raw(" No"),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Confirm ", Style::default().fg(warning())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(warning())),
    )
    .alignment(Alignment::Center);

    f.render_widget(confirm, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_start_small_map_pins_to_min() {
        // Map fits entirely in the viewport
        assert_eq!(viewport_start(0, 0, 3, 10), 0);
        assert_eq!(viewport_start(3, 0, 3, 10), 0);
    }

    #[test]
    fn test_viewport_start_follows_cursor() {
        // 20-wide map, 5-wide viewport
        assert_eq!(viewport_start(0, 0, 19, 5), 0);
        assert_eq!(viewport_start(10, 0, 19, 5), 8, "Cursor centered");
        assert_eq!(viewport_start(19, 0, 19, 5), 15, "Clamped at far edge");
    }

    #[test]
    fn test_viewport_start_negative_coords() {
        assert_eq!(viewport_start(-10, -10, 10, 7), -10);
        assert_eq!(viewport_start(10, -10, 10, 7), 4);
    }
}
