//! Keybinding configuration for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

/// Configuration for all keybindings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub next_page: Vec<String>,
    pub prev_page: Vec<String>,
    pub load_more: Vec<String>,
    pub refresh: Vec<String>,
    pub toggle_mode: Vec<String>,
    pub select: Vec<String>,
    pub back: Vec<String>,
    pub save: Vec<String>,
    pub open_in_browser: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: keys(&["q", "Ctrl+c"]),
            move_up: keys(&["k", "Up"]),
            move_down: keys(&["j", "Down"]),
            next_page: keys(&["PageDown"]),
            prev_page: keys(&["PageUp"]),
            load_more: keys(&["n"]),
            refresh: keys(&["R"]),
            toggle_mode: keys(&["t"]),
            select: keys(&["Enter"]),
            back: keys(&["Esc"]),
            save: keys(&["s"]),
            open_in_browser: keys(&["o"]),
        }
    }
}

impl KeybindingConfig {
    /// Get the action for a key event. Earlier entries win on conflicts.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table: [(&[String], Action); 12] = [
            (self.quit.as_slice(), Action::Quit),
            (self.move_up.as_slice(), Action::MoveUp),
            (self.move_down.as_slice(), Action::MoveDown),
            (self.next_page.as_slice(), Action::NextPage),
            (self.prev_page.as_slice(), Action::PrevPage),
            (self.load_more.as_slice(), Action::LoadMore),
            (self.refresh.as_slice(), Action::Refresh),
            (self.toggle_mode.as_slice(), Action::ToggleMode),
            (self.select.as_slice(), Action::Select),
            (self.back.as_slice(), Action::Back),
            (self.save.as_slice(), Action::Save),
            (self.open_in_browser.as_slice(), Action::OpenInBrowser),
        ];

        table
            .iter()
            .find(|(bindings, _)| matches_any(key, bindings))
            .map(|(_, action)| *action)
            .unwrap_or(Action::None)
    }
}

fn matches_any(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings
        .iter()
        .filter_map(|binding| parse_key_string(binding).ok())
        .any(|parsed| parsed.matches(key))
}

/// A parsed key binding with code and modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Check if this binding matches a key event.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == (key.modifiers & !KeyModifiers::SHIFT))
    }
}

/// Parse a key string into a KeyBinding.
///
/// Supported formats:
/// - Single characters: "a", "A", "1", "/"
/// - Special keys: "Enter", "Tab", "BackTab", "Backspace", "Delete", "Home", "End",
///   "PageUp", "PageDown", "Up", "Down", "Left", "Right", "Esc", "Space", "F1"-"F12"
/// - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter", "Ctrl+Shift+a"
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    // "Ctrl++" style bindings are not supported; the last segment is the key
    let (modifier_parts, key_part) = match s.rsplit_once('+') {
        Some((mods, key)) if !key.is_empty() => (Some(mods), key),
        _ => (None, s),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in modifier_parts.into_iter().flat_map(|m| m.split('+')) {
        modifiers |= match part.to_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" => KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        };
    }

    Ok(KeyBinding {
        code: parse_key_code(key_part)?,
        modifiers,
    })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = s.to_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" | "bs" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n @ 1..=12) => KeyCode::F(n),
            _ => return Err(format!("Unknown key: {}", s)),
        },
    };
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_char() {
        let binding = parse_key_string("j").unwrap();
        assert_eq!(binding.code, KeyCode::Char('j'));
        assert_eq!(binding.modifiers, KeyModifiers::NONE);
    }

    #[test]
    fn test_parse_uppercase_char() {
        let binding = parse_key_string("R").unwrap();
        assert_eq!(binding.code, KeyCode::Char('R'));
        assert_eq!(binding.modifiers, KeyModifiers::NONE);
    }

    #[test]
    fn test_parse_special_key() {
        let binding = parse_key_string("Enter").unwrap();
        assert_eq!(binding.code, KeyCode::Enter);
        assert_eq!(binding.modifiers, KeyModifiers::NONE);

        let binding = parse_key_string("Tab").unwrap();
        assert_eq!(binding.code, KeyCode::Tab);

        let binding = parse_key_string("BackTab").unwrap();
        assert_eq!(binding.code, KeyCode::BackTab);

        let binding = parse_key_string("PageDown").unwrap();
        assert_eq!(binding.code, KeyCode::PageDown);
    }

    #[test]
    fn test_parse_ctrl_modifier() {
        let binding = parse_key_string("Ctrl+c").unwrap();
        assert_eq!(binding.code, KeyCode::Char('c'));
        assert_eq!(binding.modifiers, KeyModifiers::CONTROL);
    }

    #[test]
    fn test_parse_shift_modifier() {
        let binding = parse_key_string("Shift+Tab").unwrap();
        assert_eq!(binding.code, KeyCode::Tab);
        assert_eq!(binding.modifiers, KeyModifiers::SHIFT);
    }

    #[test]
    fn test_parse_multiple_modifiers() {
        let binding = parse_key_string("Ctrl+Shift+a").unwrap();
        assert_eq!(binding.code, KeyCode::Char('a'));
        assert_eq!(
            binding.modifiers,
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        );
    }

    #[test]
    fn test_parse_function_keys() {
        let binding = parse_key_string("F1").unwrap();
        assert_eq!(binding.code, KeyCode::F(1));

        let binding = parse_key_string("F12").unwrap();
        assert_eq!(binding.code, KeyCode::F(12));
    }

    #[test]
    fn test_keybinding_matches() {
        let binding = parse_key_string("Ctrl+c").unwrap();
        let key_event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(binding.matches(&key_event));

        let key_event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert!(!binding.matches(&key_event));
    }

    #[test]
    fn test_keybinding_config_get_action() {
        let config = KeybindingConfig::default();

        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(config.get_action(&key), Action::Quit);

        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(config.get_action(&key), Action::Quit);

        let key = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(config.get_action(&key), Action::LoadMore);

        let key = KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT);
        assert_eq!(config.get_action(&key), Action::Refresh);

        let key = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::NONE);
        assert_eq!(config.get_action(&key), Action::ToggleMode);

        let key = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(config.get_action(&key), Action::Back);

        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(config.get_action(&key), Action::None);
    }

    #[test]
    fn test_custom_binding_overrides_default() {
        let config: KeybindingConfig = toml::from_str("toggle_mode = [\"m\"]").unwrap();

        let key = KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE);
        assert_eq!(config.get_action(&key), Action::ToggleMode);

        let key = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::NONE);
        assert_eq!(config.get_action(&key), Action::None);
    }
}
