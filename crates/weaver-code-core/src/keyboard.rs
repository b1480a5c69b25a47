//! Keyboard event classification.
//!
//! Platform-agnostic key representation plus the semantic predicates the
//! input pipeline and the editor branch on. Platform-specific code converts
//! native key events into `KeyEvent`.

use smol_str::SmolStr;

/// Key values for keyboard input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character key.
    Character(SmolStr),

    /// Unknown/unidentified key.
    Unidentified,

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Insert,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,

    // === Modifiers ===
    Alt,
    AltGraph,
    CapsLock,
    Control,
    Fn,
    Meta,
    Shift,

    // === IME / composition ===
    Process,
    Dead,

    /// Any other named key.
    Named(SmolStr),
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            "Insert" => Self::Insert,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Alt" => Self::Alt,
            "AltGraph" => Self::AltGraph,
            "CapsLock" => Self::CapsLock,
            "Control" => Self::Control,
            "Fn" => Self::Fn,
            "Meta" | "OS" => Self::Meta,
            "Shift" => Self::Shift,
            "Process" => Self::Process,
            "Dead" => Self::Dead,
            "Unidentified" | "" => Self::Unidentified,
            "Spacebar" => Self::Character(SmolStr::new_inline(" ")),
            other if other.chars().count() == 1 => Self::Character(SmolStr::new(other)),
            other => Self::Named(SmolStr::new(other)),
        }
    }

    /// The DOM `KeyboardEvent.key` spelling of this key.
    pub fn as_dom_key(&self) -> &str {
        match self {
            Self::Character(s) | Self::Named(s) => s.as_str(),
            Self::Unidentified => "Unidentified",
            Self::Backspace => "Backspace",
            Self::Delete => "Delete",
            Self::Enter => "Enter",
            Self::Tab => "Tab",
            Self::Escape => "Escape",
            Self::Insert => "Insert",
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::Home => "Home",
            Self::End => "End",
            Self::PageUp => "PageUp",
            Self::PageDown => "PageDown",
            Self::Alt => "Alt",
            Self::AltGraph => "AltGraph",
            Self::CapsLock => "CapsLock",
            Self::Control => "Control",
            Self::Fn => "Fn",
            Self::Meta => "Meta",
            Self::Shift => "Shift",
            Self::Process => "Process",
            Self::Dead => "Dead",
        }
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }

    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Self::Alt
                | Self::AltGraph
                | Self::CapsLock
                | Self::Control
                | Self::Fn
                | Self::Meta
                | Self::Shift
        )
    }
}

/// Modifier key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const META: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: true,
    };

    /// Whether the platform's primary shortcut modifier is held (Cmd on Mac, Ctrl elsewhere).
    pub fn primary(&self, is_mac: bool) -> bool {
        if is_mac { self.meta } else { self.ctrl }
    }
}

/// A classified keyboard event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// Physical key code (`KeyboardEvent.code`), if known.
    pub code: Option<SmolStr>,
    pub modifiers: Modifiers,
    pub repeat: bool,
    /// Part of an IME composition.
    pub is_composing: bool,
    /// Use Mac shortcut conventions.
    pub is_mac: bool,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            code: None,
            modifiers,
            repeat: false,
            is_composing: false,
            is_mac: false,
        }
    }

    /// A plain key press without modifiers.
    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn with_mac(mut self, is_mac: bool) -> Self {
        self.is_mac = is_mac;
        self
    }

    pub fn with_composing(mut self, is_composing: bool) -> Self {
        self.is_composing = is_composing;
        self
    }

    /// The typed character for printable keys.
    pub fn character(&self) -> Option<&str> {
        match &self.key {
            Key::Character(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn shift(&self) -> bool {
        self.modifiers.shift
    }

    /// Primary shortcut modifier (Cmd on Mac, Ctrl elsewhere).
    pub fn is_primary_shortcut(&self) -> bool {
        self.modifiers.primary(self.is_mac)
    }

    fn is_plain_or_shifted(&self) -> bool {
        !self.modifiers.ctrl && !self.modifiers.meta && !self.modifiers.alt
    }

    pub fn is_enter(&self) -> bool {
        self.key == Key::Enter
    }

    pub fn is_tab(&self) -> bool {
        self.key == Key::Tab && !self.modifiers.ctrl && !self.modifiers.meta && !self.modifiers.alt
    }

    pub fn is_escape(&self) -> bool {
        self.key == Key::Escape
    }

    pub fn is_backspace(&self) -> bool {
        self.key == Key::Backspace
    }

    pub fn is_delete(&self) -> bool {
        self.key == Key::Delete
    }

    pub fn is_navigation(&self) -> bool {
        self.key.is_navigation()
    }

    pub fn is_modifier_only(&self) -> bool {
        self.key.is_modifier()
    }

    fn is_letter(&self, letter: &str) -> bool {
        self.character()
            .is_some_and(|c| c.eq_ignore_ascii_case(letter))
    }

    /// Ctrl/Cmd+Z.
    pub fn is_undo(&self) -> bool {
        self.is_primary_shortcut() && !self.modifiers.shift && self.is_letter("z")
    }

    /// Ctrl/Cmd+Shift+Z, or Ctrl+Y off Mac.
    pub fn is_redo(&self) -> bool {
        if !self.is_primary_shortcut() {
            return false;
        }
        (self.modifiers.shift && self.is_letter("z"))
            || (!self.is_mac && !self.modifiers.shift && self.is_letter("y"))
    }

    /// Ctrl/Cmd+A.
    pub fn is_select_all(&self) -> bool {
        self.is_primary_shortcut() && !self.modifiers.shift && self.is_letter("a")
    }

    /// Whether the key would change the text if the browser handled it.
    pub fn is_mutating_input(&self) -> bool {
        match &self.key {
            Key::Character(_) => {
                self.is_plain_or_shifted()
                    || (self.modifiers.alt && !self.modifiers.ctrl && !self.modifiers.meta)
            }
            Key::Enter | Key::Tab | Key::Backspace | Key::Delete => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str, modifiers: Modifiers) -> KeyEvent {
        KeyEvent::new(Key::from_dom_key(k), modifiers)
    }

    #[test]
    fn test_parse_dom_keys() {
        assert_eq!(Key::from_dom_key("Enter"), Key::Enter);
        assert_eq!(Key::from_dom_key("a"), Key::character("a"));
        assert_eq!(Key::from_dom_key("("), Key::character("("));
        assert_eq!(Key::from_dom_key("é"), Key::character("é"));
        assert_eq!(Key::from_dom_key("Left"), Key::ArrowLeft);
        assert_eq!(Key::from_dom_key("F5"), Key::Named("F5".into()));
        assert_eq!(Key::from_dom_key(""), Key::Unidentified);
    }

    #[test]
    fn test_dom_key_spelling_normalizes_aliases() {
        assert_eq!(Key::from_dom_key("Left").as_dom_key(), "ArrowLeft");
        assert_eq!(Key::from_dom_key("Esc").as_dom_key(), "Escape");
        assert_eq!(Key::from_dom_key("Spacebar").as_dom_key(), " ");
        assert_eq!(Key::from_dom_key("F5").as_dom_key(), "F5");
    }

    #[test]
    fn test_undo_redo_off_mac() {
        assert!(key("z", Modifiers::CTRL).is_undo());
        assert!(!key("z", Modifiers::META).is_undo());
        let ctrl_shift = Modifiers {
            shift: true,
            ..Modifiers::CTRL
        };
        assert!(key("Z", ctrl_shift).is_redo());
        assert!(!key("Z", ctrl_shift).is_undo());
        assert!(key("y", Modifiers::CTRL).is_redo());
    }

    #[test]
    fn test_undo_redo_on_mac() {
        assert!(key("z", Modifiers::META).with_mac(true).is_undo());
        assert!(!key("z", Modifiers::CTRL).with_mac(true).is_undo());
        // Cmd+Y is not redo on Mac.
        assert!(!key("y", Modifiers::META).with_mac(true).is_redo());
    }

    #[test]
    fn test_mutating_input() {
        assert!(key("a", Modifiers::NONE).is_mutating_input());
        assert!(key("A", Modifiers::SHIFT).is_mutating_input());
        assert!(key("Enter", Modifiers::NONE).is_mutating_input());
        assert!(key("Backspace", Modifiers::NONE).is_mutating_input());
        assert!(!key("a", Modifiers::CTRL).is_mutating_input());
        assert!(!key("ArrowLeft", Modifiers::NONE).is_mutating_input());
        assert!(!key("Shift", Modifiers::SHIFT).is_mutating_input());

        // Option-composed characters type text; Alt combined with Ctrl does not.
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        let ctrl_alt = Modifiers {
            ctrl: true,
            ..alt
        };
        assert!(key("ø", alt).is_mutating_input());
        assert!(!key("a", ctrl_alt).is_mutating_input());
    }

    #[test]
    fn test_tab_with_modifiers() {
        assert!(key("Tab", Modifiers::NONE).is_tab());
        assert!(key("Tab", Modifiers::SHIFT).is_tab());
        // Ctrl+Tab switches browser tabs; leave it alone.
        assert!(!key("Tab", Modifiers::CTRL).is_tab());
    }

    #[test]
    fn test_select_all() {
        assert!(key("a", Modifiers::CTRL).is_select_all());
        assert!(!key("a", Modifiers::NONE).is_select_all());
    }
}
