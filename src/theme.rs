//! Theme colors loaded from the Omarchy/Hyprland system theme
//! Reads colors from ~/.config/omarchy/current/theme/kitty.conf

use ratatui::style::Color;
use std::collections::HashMap;
use std::fs;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Active borders, key hints
    pub tile: Color,        // Unselected tiles in the grid
    pub tile_marked: Color, // Selected tiles
    pub danger: Color,      // Errors, destructive confirms
    pub warning: Color,     // Status feedback
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Dimmed text, grid gaps
    pub bg_selected: Color, // Cursor cell background
    pub inactive: Color,    // Inactive borders
    pub header: Color,      // Panel headers
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired fallback when no system theme is found
        Self {
            accent: Color::Rgb(250, 179, 135),
            tile: Color::Rgb(147, 153, 178),
            tile_marked: Color::Rgb(166, 218, 149),
            danger: Color::Rgb(243, 139, 168),
            warning: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(88, 91, 112),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    /// Load theme from the Omarchy system theme, falling back to defaults
    pub fn load() -> Self {
        Self::load_omarchy_theme().unwrap_or_default()
    }

    /// Load colors from the Omarchy kitty.conf theme file
    fn load_omarchy_theme() -> Option<Self> {
        let home = dirs::home_dir()?;
        let theme_path = home.join(".config/omarchy/current/theme/kitty.conf");

        let content = fs::read_to_string(&theme_path).ok()?;
        let colors = Self::parse_kitty_conf(&content);

        if colors.is_empty() {
            return None;
        }

        let fallback = Theme::default();
        let get = |keys: &[&str], fallback: Color| {
            keys.iter()
                .find_map(|k| colors.get(*k))
                .copied()
                .unwrap_or(fallback)
        };

        let accent = get(&["color2", "color10"], fallback.accent);
        let text_dim = get(&["color8"], fallback.text_dim);

        Some(Self {
            accent,
            // Marked tiles take the accent so they read at a glance;
            // unmarked ones sit close to the dim text
            tile: get(&["color7", "foreground"], fallback.tile),
            tile_marked: accent,
            danger: get(&["color1"], fallback.danger),
            warning: get(&["color4", "color12"], fallback.warning),
            text: get(&["foreground"], fallback.text),
            text_dim,
            bg_selected: get(&["selection_background", "color0"], fallback.bg_selected),
            inactive: get(&["inactive_border_color", "color8"], fallback.inactive),
            header: get(&["color1"], fallback.header),
        })
    }

    /// Parse kitty.conf format: `key value` or `key #hexcolor`
    fn parse_kitty_conf(content: &str) -> HashMap<String, Color> {
        let mut colors = HashMap::new();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.splitn(2, char::is_whitespace).collect();
            if parts.len() == 2 {
                if let Some(color) = Self::parse_hex_color(parts[1].trim()) {
                    colors.insert(parts[0].trim().to_string(), color);
                }
            }
        }

        colors
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
