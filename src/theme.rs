//! Theme model and attribute resolution.
//!
//! A theme is the palette the shell asked for, the color pairs the driver
//! actually registered (absent when colors are unavailable), and a cursor
//! visibility level. Attribute resolution is a pluggable policy so a host
//! can restyle any subset of roles without touching callers.
//!
//! Monochrome fallback, per role:
//! - Bold: foreground, title
//! - Dim: inactive
//! - Normal: everything else

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

use crate::types::{Attr, ColorPairId, CursorVisibility, Role};

// ============================================================================
// PALETTE
// ============================================================================

/// Foreground/background colors requested for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairColors {
    pub fg: Color,
    pub bg: Color,
}

impl PairColors {
    pub const fn new(fg: Color, bg: Color) -> Self {
        PairColors { fg, bg }
    }
}

/// Requested colors for every role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub foreground: PairColors,
    pub background: PairColors,
    pub inactive: PairColors,
    pub label: PairColors,
    pub dialog_background: PairColors,
    pub window_background: PairColors,
    pub title: PairColors,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            foreground: PairColors::new(Color::White, Color::Blue),
            background: PairColors::new(Color::Blue, Color::White),
            inactive: PairColors::new(Color::Black, Color::Cyan),
            label: PairColors::new(Color::Black, Color::Yellow),
            dialog_background: PairColors::new(Color::Black, Color::White),
            window_background: PairColors::new(Color::White, Color::Black),
            title: PairColors::new(Color::Yellow, Color::Blue),
        }
    }
}

impl Palette {
    /// Colors requested for a role.
    pub fn get(&self, role: Role) -> PairColors {
        match role {
            Role::Foreground => self.foreground,
            Role::Background => self.background,
            Role::Inactive => self.inactive,
            Role::Label => self.label,
            Role::DialogBackground => self.dialog_background,
            Role::WindowBackground => self.window_background,
            Role::Title => self.title,
        }
    }
}

// ============================================================================
// THEME
// ============================================================================

/// Pair handles issued by the driver, one per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPairs {
    ids: [ColorPairId; 7],
}

impl ColorPairs {
    /// Build from handles listed in [`Role::ALL`] order.
    pub fn new(ids: [ColorPairId; 7]) -> Self {
        ColorPairs { ids }
    }

    /// Handle registered for a role.
    pub fn get(&self, role: Role) -> ColorPairId {
        self.ids[role.index()]
    }

    /// Role a handle was registered for, if it belongs to this set.
    pub fn role_of(&self, id: ColorPairId) -> Option<Role> {
        Role::ALL.into_iter().find(|role| self.get(*role) == id)
    }
}

/// Color pairs plus cursor setting owned by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pairs: Option<ColorPairs>,
    palette: Palette,
    cursor: CursorVisibility,
}

impl Theme {
    /// Theme for a terminal without usable colors.
    pub fn monochrome(palette: Palette, cursor: CursorVisibility) -> Self {
        Theme {
            pairs: None,
            palette,
            cursor,
        }
    }

    /// Theme backed by registered color pairs.
    pub fn colored(pairs: ColorPairs, palette: Palette, cursor: CursorVisibility) -> Self {
        Theme {
            pairs: Some(pairs),
            palette,
            cursor,
        }
    }

    /// Registered pairs, `None` when running monochrome.
    pub fn pairs(&self) -> Option<&ColorPairs> {
        self.pairs.as_ref()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn cursor(&self) -> CursorVisibility {
        self.cursor
    }

    /// Convert an attribute into a ratatui style.
    ///
    /// Pairs this theme did not register contribute no color.
    pub fn style(&self, attr: Attr) -> Style {
        let style = Style::new().add_modifier(attr.modifier);
        let role = match (attr.pair, &self.pairs) {
            (Some(id), Some(pairs)) => pairs.role_of(id),
            _ => None,
        };
        match role {
            Some(role) => {
                let colors = self.palette.get(role);
                style.fg(colors.fg).bg(colors.bg)
            }
            None => style,
        }
    }
}

// ============================================================================
// POLICY
// ============================================================================

/// Strategy mapping a role to a rendering attribute.
///
/// `pairs` is `Some` only when the shell has colors. Implementations that
/// restyle a few roles should defer to [`default_attr`] for the rest.
pub trait AttributePolicy {
    fn resolve(&self, role: Role, pairs: Option<&ColorPairs>) -> Attr {
        default_attr(role, pairs)
    }
}

/// The stock look.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl AttributePolicy for DefaultPolicy {}

/// Stock attribute for a role.
pub fn default_attr(role: Role, pairs: Option<&ColorPairs>) -> Attr {
    match pairs {
        Some(pairs) => {
            let attr = Attr::pair(pairs.get(role));
            if role == Role::Inactive {
                attr.with(Modifier::DIM)
            } else {
                attr
            }
        }
        None => monochrome_attr(role),
    }
}

/// Fixed fallback used when colors are unavailable.
pub fn monochrome_attr(role: Role) -> Attr {
    match role {
        Role::Foreground | Role::Title => Attr::BOLD,
        Role::Inactive => Attr::DIM,
        Role::Background | Role::Label | Role::DialogBackground | Role::WindowBackground => {
            Attr::NORMAL
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential_pairs() -> ColorPairs {
        ColorPairs::new([1, 2, 3, 4, 5, 6, 7].map(ColorPairId))
    }

    #[test]
    fn monochrome_fallbacks_are_fixed_per_role() {
        assert_eq!(monochrome_attr(Role::Foreground), Attr::BOLD);
        assert_eq!(monochrome_attr(Role::Background), Attr::NORMAL);
        assert_eq!(monochrome_attr(Role::Inactive), Attr::DIM);
        assert_eq!(monochrome_attr(Role::Label), Attr::NORMAL);
        assert_eq!(monochrome_attr(Role::DialogBackground), Attr::NORMAL);
        assert_eq!(monochrome_attr(Role::WindowBackground), Attr::NORMAL);
        assert_eq!(monochrome_attr(Role::Title), Attr::BOLD);
    }

    #[test]
    fn colored_roles_use_their_own_pair() {
        let pairs = sequential_pairs();
        for role in Role::ALL {
            let attr = default_attr(role, Some(&pairs));
            assert_eq!(attr.pair, Some(pairs.get(role)));
        }
    }

    #[test]
    fn only_inactive_adds_dim_to_its_pair() {
        let pairs = sequential_pairs();
        for role in Role::ALL {
            let attr = default_attr(role, Some(&pairs));
            assert_eq!(attr.modifier.contains(Modifier::DIM), role == Role::Inactive);
        }
    }

    #[test]
    fn role_of_finds_registered_handle() {
        let pairs = sequential_pairs();
        assert_eq!(pairs.role_of(ColorPairId(4)), Some(Role::Label));
        assert_eq!(pairs.role_of(ColorPairId(42)), None);
    }

    #[test]
    fn style_uses_palette_colors_for_registered_pair() {
        let theme = Theme::colored(sequential_pairs(), Palette::default(), CursorVisibility::Normal);
        let style = theme.style(default_attr(Role::Inactive, theme.pairs()));
        assert_eq!(style.fg, Some(Color::Black));
        assert_eq!(style.bg, Some(Color::Cyan));
        assert!(style.add_modifier.contains(Modifier::DIM));
    }

    #[test]
    fn monochrome_theme_styles_without_color() {
        let theme = Theme::monochrome(Palette::default(), CursorVisibility::Invisible);
        let style = theme.style(Attr::pair(ColorPairId(1)).with(Modifier::BOLD));
        assert_eq!(style.fg, None);
        assert_eq!(style.bg, None);
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn partial_palette_json_keeps_defaults() {
        let palette: Palette =
            serde_json::from_str(r#"{ "title": { "fg": "red", "bg": "black" } }"#).unwrap();
        assert_eq!(palette.title, PairColors::new(Color::Red, Color::Black));
        assert_eq!(palette.foreground, Palette::default().foreground);
    }
}
