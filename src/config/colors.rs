//! Color configuration for the TUI.

use ratatui::style::Color;
use serde::{de, Deserialize, Deserializer};

/// Configuration for all TUI colors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    #[serde(deserialize_with = "deserialize_color")]
    pub active_border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub inactive_border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_bg_active: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_fg_active: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_bg_inactive: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_fg_inactive: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub title: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub metadata_source: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub metadata_author: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub metadata_date: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub metadata_link: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub offline_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub offline_bg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_bg: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            active_border: Color::Cyan,
            inactive_border: Color::DarkGray,
            selection_bg_active: Color::Cyan,
            selection_fg_active: Color::Black,
            selection_bg_inactive: Color::DarkGray,
            selection_fg_inactive: Color::White,
            title: Color::White,
            metadata_source: Color::Green,
            metadata_author: Color::Yellow,
            metadata_date: Color::Yellow,
            metadata_link: Color::Blue,
            offline_fg: Color::White,
            offline_bg: Color::Red,
            status_fg: Color::White,
            status_bg: Color::DarkGray,
        }
    }
}

/// Custom deserializer for Color that supports named colors and hex codes.
fn deserialize_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color_string(&s).map_err(de::Error::custom)
}

/// Parse a named color (case-insensitive) or a `#RRGGBB` / `#RGB` hex code.
pub fn parse_color_string(s: &str) -> Result<Color, String> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex).ok_or_else(|| format!("Invalid hex color: {}", s));
    }

    let color = match s.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        "reset" => Color::Reset,
        _ => return Err(format!("Unknown color: {}", s)),
    };
    Ok(color)
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();

    match hex.len() {
        6 => Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        // #RGB expands each nibble: F -> FF
        3 => Some(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color_string("Cyan").unwrap(), Color::Cyan);
        assert_eq!(parse_color_string("cyan").unwrap(), Color::Cyan);
        assert_eq!(parse_color_string("CYAN").unwrap(), Color::Cyan);
        assert_eq!(parse_color_string("DarkGray").unwrap(), Color::DarkGray);
        assert_eq!(parse_color_string("darkgray").unwrap(), Color::DarkGray);
    }

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(
            parse_color_string("#FF0000").unwrap(),
            Color::Rgb(255, 0, 0)
        );
        assert_eq!(
            parse_color_string("#00ff00").unwrap(),
            Color::Rgb(0, 255, 0)
        );
        assert_eq!(
            parse_color_string("#0000FF").unwrap(),
            Color::Rgb(0, 0, 255)
        );
    }

    #[test]
    fn test_parse_short_hex_colors() {
        assert_eq!(parse_color_string("#F00").unwrap(), Color::Rgb(255, 0, 0));
        assert_eq!(parse_color_string("#0F0").unwrap(), Color::Rgb(0, 255, 0));
        assert_eq!(parse_color_string("#00F").unwrap(), Color::Rgb(0, 0, 255));
        assert_eq!(
            parse_color_string("#FFF").unwrap(),
            Color::Rgb(255, 255, 255)
        );
    }

    #[test]
    fn test_color_config_override() {
        let config: ColorConfig = toml::from_str("offline_bg = \"#800\"").unwrap();
        assert_eq!(config.offline_bg, Color::Rgb(136, 0, 0));
        assert_eq!(config.offline_fg, Color::White);
    }

    #[test]
    fn test_parse_invalid_colors() {
        assert!(parse_color_string("invalid").is_err());
        assert!(parse_color_string("#GGGGGG").is_err());
        assert!(parse_color_string("#12345").is_err());
    }
}
