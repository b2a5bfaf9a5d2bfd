//! Domain types for termshell.
//!
//! Theme roles, color-pair handles, rendering attributes and cursor
//! visibility. Pure data, no terminal access.

use ratatui::style::Modifier;
use serde::{Deserialize, Serialize};

// ============================================================================
// ROLES
// ============================================================================

/// Semantic slot in the theme. Each role gets its own color pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Menu and form foregrounds.
    Foreground,
    /// Menu and form backgrounds.
    Background,
    /// Inactive (menu) elements.
    Inactive,
    /// Form labels and soft-label keys.
    Label,
    /// Form backgrounds.
    DialogBackground,
    /// Default window backgrounds.
    WindowBackground,
    /// Title window.
    Title,
}

impl Role {
    /// All roles, in registration order.
    pub const ALL: [Role; 7] = [
        Role::Foreground,
        Role::Background,
        Role::Inactive,
        Role::Label,
        Role::DialogBackground,
        Role::WindowBackground,
        Role::Title,
    ];

    /// Position of this role in [`Role::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Role::Foreground => 0,
            Role::Background => 1,
            Role::Inactive => 2,
            Role::Label => 3,
            Role::DialogBackground => 4,
            Role::WindowBackground => 5,
            Role::Title => 6,
        }
    }
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// Opaque color-pair handle issued by a terminal driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorPairId(pub u16);

/// Rendering attribute: an optional color pair plus emphasis modifiers.
///
/// Monochrome attributes carry no pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr {
    pub pair: Option<ColorPairId>,
    pub modifier: Modifier,
}

impl Attr {
    /// Plain text, no color.
    pub const NORMAL: Attr = Attr::mono(Modifier::empty());

    /// Bold, no color.
    pub const BOLD: Attr = Attr::mono(Modifier::BOLD);

    /// Dim, no color.
    pub const DIM: Attr = Attr::mono(Modifier::DIM);

    /// Monochrome attribute with the given emphasis.
    pub const fn mono(modifier: Modifier) -> Self {
        Attr { pair: None, modifier }
    }

    /// Colored attribute using a registered pair.
    pub const fn pair(id: ColorPairId) -> Self {
        Attr {
            pair: Some(id),
            modifier: Modifier::empty(),
        }
    }

    /// Add emphasis on top of this attribute.
    pub const fn with(self, modifier: Modifier) -> Self {
        Attr {
            pair: self.pair,
            modifier: self.modifier.union(modifier),
        }
    }

    /// True when the attribute uses no color pair.
    pub const fn is_mono(&self) -> bool {
        self.pair.is_none()
    }
}

// ============================================================================
// CURSOR
// ============================================================================

/// Terminal cursor visibility level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorVisibility {
    /// Cursor hidden.
    #[default]
    Invisible,
    /// Steady cursor.
    Normal,
    /// Blinking cursor.
    VeryVisible,
}

// ============================================================================
// RUN LOOP
// ============================================================================

/// Why the run loop stopped. Both are normal terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The kill key was pressed.
    KillKey,
    /// The driver reported end of input.
    EndOfInput,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_index_matches_position_in_all() {
        for (i, role) in Role::ALL.iter().enumerate() {
            assert_eq!(role.index(), i);
        }
    }

    #[test]
    fn with_keeps_pair_and_adds_emphasis() {
        let attr = Attr::pair(ColorPairId(3)).with(Modifier::DIM);
        assert_eq!(attr.pair, Some(ColorPairId(3)));
        assert!(attr.modifier.contains(Modifier::DIM));
        assert!(!attr.is_mono());
    }

    #[test]
    fn mono_constants_have_no_pair() {
        assert!(Attr::NORMAL.is_mono());
        assert!(Attr::BOLD.modifier.contains(Modifier::BOLD));
        assert!(Attr::DIM.modifier.contains(Modifier::DIM));
        assert!(Attr::NORMAL.modifier.is_empty());
    }

    #[test]
    fn cursor_visibility_reads_snake_case() {
        let cursor: CursorVisibility = serde_json::from_str("\"very_visible\"").unwrap();
        assert_eq!(cursor, CursorVisibility::VeryVisible);
        assert_eq!(CursorVisibility::default(), CursorVisibility::Invisible);
    }
}
