//! Selection state shared between the tile grid and the "Selected" text panel.

use std::collections::BTreeSet;

/// What the selection widget needs from the view layer.
///
/// The widget never touches the grid or the panel directly; the app hands it
/// a view for the duration of each operation, and tests hand it a mock.
pub trait TileView {
    /// Set or clear the selected mark on the tile with this name.
    /// Returns false when no tile matches.
    fn set_mark(&mut self, name: &str, marked: bool) -> bool;

    /// Clear the selected mark from every tile.
    fn clear_marks(&mut self);

    /// Replace the mirror panel text and set its visibility.
    fn set_mirror(&mut self, text: &str, visible: bool);
}

/// The set of selected tile names, kept in sync with the tile marks and the
/// editable text mirror.
///
/// Invariant: a name is in the set exactly when its tile (if any) carries the
/// selected mark, and the mirror text is the set rendered one name per line.
#[derive(Debug, Default)]
pub struct SelectionWidget {
    selected: BTreeSet<String>,
}

impl SelectionWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `name` and mirror the change into the view.
    ///
    /// A name with no matching tile still flips in the set; it just has no
    /// visual effect on the grid.
    pub fn toggle(&mut self, view: &mut dyn TileView, name: &str) {
        let now_selected = if self.selected.remove(name) {
            false
        } else {
            self.selected.insert(name.to_string());
            true
        };
        view.set_mark(name, now_selected);
        self.sync_mirror(view);
    }

    /// Replace the whole selection with `names`, in order.
    ///
    /// Names with no matching tile are dropped silently. The mirror text is
    /// left alone: this is the mirror-to-grid direction, and rewriting the
    /// panel while the user types in it would fight the edit.
    pub fn replace_selection<I, S>(&mut self, view: &mut dyn TileView, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        view.clear_marks();
        self.selected.clear();
        for name in names {
            let name = name.as_ref();
            if view.set_mark(name, true) {
                self.selected.insert(name.to_string());
            }
        }
    }

    /// Parse mirror text as whitespace-separated names and replace the
    /// selection with them. Wired to every edit of the panel.
    pub fn replace_from_text(&mut self, view: &mut dyn TileView, text: &str) {
        self.replace_selection(view, text.split_whitespace());
    }

    /// The selection rendered one name per line; empty exactly when the
    /// selection is empty.
    pub fn text_mirror(&self) -> String {
        let mut text = String::new();
        for name in &self.selected {
            text.push_str(name);
            text.push('\n');
        }
        text
    }

    /// Push the canonical mirror text and visibility into the view.
    pub fn sync_mirror(&self, view: &mut dyn TileView) {
        let text = self.text_mirror();
        let visible = !text.is_empty();
        view.set_mirror(&text, visible);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Selected names in mirror order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Mock view: a fixed set of tiles with mark flags, plus the last mirror
    /// update the widget pushed.
    struct MockView {
        marks: BTreeMap<String, bool>,
        mirror_text: String,
        mirror_visible: bool,
    }

    impl MockView {
        fn with_tiles(names: &[&str]) -> Self {
            Self {
                marks: names.iter().map(|n| (n.to_string(), false)).collect(),
                mirror_text: String::new(),
                mirror_visible: false,
            }
        }

        fn marked(&self, name: &str) -> bool {
            self.marks.get(name).copied().unwrap_or(false)
        }
    }

    impl TileView for MockView {
        fn set_mark(&mut self, name: &str, marked: bool) -> bool {
            match self.marks.get_mut(name) {
                Some(m) => {
                    *m = marked;
                    true
                }
                None => false,
            }
        }

        fn clear_marks(&mut self) {
            for m in self.marks.values_mut() {
                *m = false;
            }
        }

        fn set_mirror(&mut self, text: &str, visible: bool) {
            self.mirror_text = text.to_string();
            self.mirror_visible = visible;
        }
    }

    #[test]
    fn test_toggle_selects_and_mirrors() {
        let mut view = MockView::with_tiles(&["a", "b", "c"]);
        let mut widget = SelectionWidget::new();

        widget.toggle(&mut view, "a");
        assert!(widget.contains("a"));
        assert!(view.marked("a"), "Tile mark should follow the set");
        assert_eq!(view.mirror_text, "a\n");
        assert!(view.mirror_visible, "Panel should show once something is selected");
    }

    #[test]
    fn test_toggle_twice_is_idempotent() {
        let mut view = MockView::with_tiles(&["a", "b", "c"]);
        let mut widget = SelectionWidget::new();

        widget.toggle(&mut view, "a");
        widget.toggle(&mut view, "a");

        assert!(widget.is_empty(), "Double toggle should restore prior state");
        assert!(!view.marked("a"));
        assert_eq!(view.mirror_text, "");
        assert!(!view.mirror_visible, "Panel should hide when the set empties");
    }

    #[test]
    fn test_toggle_unknown_name_flips_set_only() {
        let mut view = MockView::with_tiles(&["a"]);
        let mut widget = SelectionWidget::new();

        widget.toggle(&mut view, "zz");
        assert!(widget.contains("zz"));
        assert_eq!(view.mirror_text, "zz\n");

        widget.toggle(&mut view, "zz");
        assert!(widget.is_empty());
    }

    #[test]
    fn test_replace_drops_unmatched_names() {
        let mut view = MockView::with_tiles(&["a", "b", "c"]);
        let mut widget = SelectionWidget::new();

        widget.replace_selection(&mut view, ["b", "c", "zz"]);

        assert_eq!(widget.len(), 2);
        assert!(widget.contains("b") && widget.contains("c"));
        assert!(!widget.contains("zz"), "Unmatched names must not enter the set");
        assert!(view.marked("b") && view.marked("c"));
    }

    #[test]
    fn test_replace_clears_previous_marks() {
        let mut view = MockView::with_tiles(&["a", "b"]);
        let mut widget = SelectionWidget::new();

        widget.toggle(&mut view, "a");
        widget.replace_selection(&mut view, ["b"]);

        assert!(!widget.contains("a"));
        assert!(!view.marked("a"), "Old marks must be cleared on replace");
        assert!(view.marked("b"));
    }

    #[test]
    fn test_replace_round_trip() {
        let mut view = MockView::with_tiles(&["a", "b", "c"]);
        let mut widget = SelectionWidget::new();

        widget.replace_selection(&mut view, ["c", "b", "zz", "b"]);

        // Re-derived mirror holds exactly the matched subset, each once.
        assert_eq!(widget.text_mirror(), "b\nc\n");
        assert!(view.marked("b") && view.marked("c"));
    }

    #[test]
    fn test_text_input_collapses_whitespace() {
        let mut view = MockView::with_tiles(&["a", "b"]);
        let mut widget = SelectionWidget::new();

        widget.replace_from_text(&mut view, "  a   b \n");

        assert_eq!(widget.len(), 2);
        assert!(widget.contains("a") && widget.contains("b"));
    }

    #[test]
    fn test_empty_text_clears_selection() {
        let mut view = MockView::with_tiles(&["a"]);
        let mut widget = SelectionWidget::new();

        widget.toggle(&mut view, "a");
        widget.replace_from_text(&mut view, "   ");

        assert!(widget.is_empty());
        assert!(!view.marked("a"));
    }

    #[test]
    fn test_sync_mirror_visibility() {
        let mut view = MockView::with_tiles(&["a"]);
        let mut widget = SelectionWidget::new();

        widget.sync_mirror(&mut view);
        assert!(!view.mirror_visible, "Empty selection keeps the panel hidden");

        widget.replace_selection(&mut view, ["a"]);
        widget.sync_mirror(&mut view);
        assert_eq!(view.mirror_text, "a\n");
        assert!(view.mirror_visible);
    }
}
