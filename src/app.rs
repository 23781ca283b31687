use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::AppConfig;
use crate::selection::{SelectionWidget, TileView};
use crate::tiles::TileGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Grid,
    Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
    ConfirmClear,
}

/// The "Selected" text panel. Holds whatever the user typed, which the
/// selection widget re-normalizes when the panel loses focus.
#[derive(Debug, Default)]
pub struct Mirror {
    pub text: String,
    pub visible: bool,
}

/// The grid and the mirror panel together are the view the selection
/// widget drives.
struct GridView<'a> {
    grid: &'a mut TileGrid,
    mirror: &'a mut Mirror,
}

impl TileView for GridView<'_> {
    fn set_mark(&mut self, name: &str, marked: bool) -> bool {
        self.grid.set_mark(name, marked)
    }

    fn clear_marks(&mut self) {
        self.grid.clear_marks();
    }

    fn set_mirror(&mut self, text: &str, visible: bool) {
        self.mirror.text = text.to_string();
        self.mirror.visible = visible;
    }
}

pub struct App {
    pub section: Section,
    pub popup: Popup,

    pub map_dir: PathBuf,
    pub grid: TileGrid,
    pub mirror: Mirror,
    pub widget: SelectionWidget,

    // Grid cursor, in tile coordinates
    pub cursor_x: i32,
    pub cursor_z: i32,

    pub config: AppConfig,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub fn new(map_dir: &Path, config: AppConfig) -> Result<Self> {
        let grid = TileGrid::scan(map_dir)?;
        Ok(Self::with_grid(map_dir.to_path_buf(), grid, config))
    }

    pub fn with_grid(map_dir: PathBuf, grid: TileGrid, config: AppConfig) -> Self {
        let (cursor_x, cursor_z) = grid
            .tiles()
            .first()
            .map(|t| (t.x, t.z))
            .unwrap_or((0, 0));

        Self {
            section: Section::Grid,
            popup: Popup::None,
            map_dir,
            grid,
            mirror: Mirror::default(),
            widget: SelectionWidget::new(),
            cursor_x,
            cursor_z,
            config,
            status_message: None,
            status_message_time: None,
        }
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Pre-select tiles by name, e.g. from --select flags. Unknown names
    /// are dropped, matching the mirror-edit path.
    pub fn select_names<S: AsRef<str>>(&mut self, names: &[S]) {
        let mut view = GridView {
            grid: &mut self.grid,
            mirror: &mut self.mirror,
        };
        self.widget.replace_selection(&mut view, names.iter().map(|s| s.as_ref()));
        self.widget.sync_mirror(&mut view);
    }

    /// Selected tile names in mirror order, for the final stdout print.
    pub fn selected_names(&self) -> Vec<String> {
        self.widget.names().map(String::from).collect()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.popup != Popup::None {
            self.handle_popup_key(key);
            return Ok(());
        }

        match self.section {
            Section::Grid => self.handle_grid_key(key),
            Section::Mirror => self.handle_mirror_key(key),
        }
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        match self.popup {
            Popup::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')
                ) {
                    self.popup = Popup::None;
                }
            }
            Popup::ConfirmClear => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.clear_selection();
                    self.popup = Popup::None;
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.popup = Popup::None;
                }
                _ => {}
            },
            Popup::None => {}
        }
    }

    fn handle_grid_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            // Cursor movement; gaps in the map are navigable
            KeyCode::Char('h') | KeyCode::Left => self.move_cursor(-1, 0),
            KeyCode::Char('l') | KeyCode::Right => self.move_cursor(1, 0),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(0, -1),
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(0, 1),

            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_at_cursor(),

            // Jump to the mirror panel (only exists while visible)
            KeyCode::Tab => {
                if self.mirror.visible {
                    self.section = Section::Mirror;
                } else {
                    self.set_status("Nothing selected yet (Space toggles a tile)");
                }
            }

            KeyCode::Char('c') => {
                if self.widget.is_empty() {
                    self.set_status("Selection is already empty");
                } else {
                    self.set_status(format!(
                        "Clear {} selected tile(s)? (y/n)",
                        self.widget.len()
                    ));
                    self.popup = Popup::ConfirmClear;
                }
            }

            KeyCode::Char('R') => self.rescan()?,

            KeyCode::Char('?') | KeyCode::F(1) => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    fn handle_mirror_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            // Leaving the panel re-derives its text from the selection
            KeyCode::Esc | KeyCode::Tab => {
                self.section = Section::Grid;
                let mut view = GridView {
                    grid: &mut self.grid,
                    mirror: &mut self.mirror,
                };
                self.widget.sync_mirror(&mut view);
            }
            KeyCode::Char(c) => {
                self.mirror.text.push(c);
                self.reparse_mirror();
            }
            KeyCode::Enter => {
                self.mirror.text.push('\n');
                self.reparse_mirror();
            }
            KeyCode::Backspace => {
                self.mirror.text.pop();
                self.reparse_mirror();
            }
            _ => {}
        }
        Ok(())
    }

    fn move_cursor(&mut self, dx: i32, dz: i32) {
        let Some(bounds) = self.grid.bounds() else {
            return;
        };
        self.cursor_x = (self.cursor_x + dx).clamp(bounds.min_x, bounds.max_x);
        self.cursor_z = (self.cursor_z + dz).clamp(bounds.min_z, bounds.max_z);
    }

    fn toggle_at_cursor(&mut self) {
        let Some(name) = self
            .grid
            .tile_at(self.cursor_x, self.cursor_z)
            .map(|t| t.name.clone())
        else {
            return;
        };
        let mut view = GridView {
            grid: &mut self.grid,
            mirror: &mut self.mirror,
        };
        self.widget.toggle(&mut view, &name);
    }

    /// Every edit of the panel reparses it and replaces the selection
    fn reparse_mirror(&mut self) {
        let text = self.mirror.text.clone();
        let mut view = GridView {
            grid: &mut self.grid,
            mirror: &mut self.mirror,
        };
        self.widget.replace_from_text(&mut view, &text);
    }

    fn clear_selection(&mut self) {
        let mut view = GridView {
            grid: &mut self.grid,
            mirror: &mut self.mirror,
        };
        self.widget.replace_selection(&mut view, std::iter::empty::<&str>());
        self.widget.sync_mirror(&mut view);
        self.set_status("Selection cleared");
    }

    /// Re-read the map directory. Selected names whose tiles disappeared
    /// are dropped; the rest keep their marks on the fresh grid.
    fn rescan(&mut self) -> Result<()> {
        let kept: Vec<String> = self.selected_names();
        self.grid = TileGrid::scan(&self.map_dir)?;

        let mut view = GridView {
            grid: &mut self.grid,
            mirror: &mut self.mirror,
        };
        self.widget.replace_selection(&mut view, kept.iter());
        self.widget.sync_mirror(&mut view);

        // Keep the cursor inside the (possibly shrunken) bounds
        self.move_cursor(0, 0);
        self.set_status(format!("Rescanned: {} tiles", self.grid.len()));
        Ok(())
    }

    pub fn tick(&mut self) {
        // Clear status message after 3 seconds
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::Tile;

    fn tile(x: i32, z: i32) -> Tile {
        Tile {
            name: format!("tile.{}.{}", x, z),
            x,
            z,
            path: PathBuf::from(format!("tile.{}.{}.png", x, z)),
            marked: false,
        }
    }

    fn test_app() -> App {
        let grid = TileGrid::from_tiles(vec![tile(0, 0), tile(1, 0), tile(0, 1)]);
        App::with_grid(PathBuf::from("map"), grid, AppConfig::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::from(code)).unwrap();
    }

    #[test]
    fn test_space_toggles_tile_under_cursor() {
        let mut app = test_app();

        press(&mut app, KeyCode::Char(' '));
        assert!(app.widget.contains("tile.0.0"));
        assert!(app.grid.find_by_name("tile.0.0").unwrap().marked);
        assert_eq!(app.mirror.text, "tile.0.0\n");
        assert!(app.mirror.visible);

        press(&mut app, KeyCode::Char(' '));
        assert!(app.widget.is_empty());
        assert!(!app.mirror.visible, "Panel hides when the selection empties");
    }

    #[test]
    fn test_toggle_on_gap_is_a_no_op() {
        let mut app = test_app();
        // (1, 1) has no tile
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.widget.is_empty());
    }

    #[test]
    fn test_cursor_clamps_to_bounds() {
        let mut app = test_app();
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Up);
        assert_eq!((app.cursor_x, app.cursor_z), (0, 0));

        for _ in 0..5 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.cursor_x, 1, "Cursor must stay inside the map bounds");
    }

    #[test]
    fn test_mirror_editing_replaces_selection() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.section, Section::Mirror);

        // Type " tile.1.0" after the existing "tile.0.0\n"
        for c in " tile.1.0".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.widget.len(), 2);
        assert!(app.widget.contains("tile.1.0"));
        assert!(app.grid.find_by_name("tile.1.0").unwrap().marked);
    }

    #[test]
    fn test_mirror_unknown_names_dropped_and_normalized_on_exit() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Tab);

        for c in " tile.9.9".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.widget.len(), 1, "Unknown names never enter the set");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.section, Section::Grid);
        assert_eq!(
            app.mirror.text, "tile.0.0\n",
            "Leaving the panel re-derives canonical text"
        );
    }

    #[test]
    fn test_tab_needs_visible_mirror() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.section, Section::Grid, "Hidden panel cannot take focus");
    }

    #[test]
    fn test_clear_selection_confirms() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.popup, Popup::ConfirmClear);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.widget.len(), 1, "Declining keeps the selection");

        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.widget.is_empty());
        assert!(!app.mirror.visible);
    }

    #[test]
    fn test_select_names_preselects() {
        let mut app = test_app();
        app.select_names(&["tile.0.1", "tile.9.9"]);

        assert_eq!(app.selected_names(), vec!["tile.0.1".to_string()]);
        assert!(app.mirror.visible);
        assert_eq!(app.mirror.text, "tile.0.1\n");
    }
}
