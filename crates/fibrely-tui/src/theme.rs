//! Dark-fibre palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

use fibrely_core::{DeviceKind, OltStatus};

// ── Core Palette ──────────────────────────────────────────────────────

pub const SIGNAL_GREEN: Color = Color::Rgb(118, 224, 132); // #76e084
pub const PULSE_CYAN: Color = Color::Rgb(102, 217, 239); // #66d9ef
pub const SPLICE_AMBER: Color = Color::Rgb(235, 187, 92); // #ebbb5c
pub const LASER_RED: Color = Color::Rgb(242, 95, 92); // #f25f5c
pub const STRAND_VIOLET: Color = Color::Rgb(187, 134, 252); // #bb86fc

// ── Extended Palette ──────────────────────────────────────────────────

pub const SOFT_WHITE: Color = Color::Rgb(205, 209, 219); // #cdd1db
pub const GRID_GRAY: Color = Color::Rgb(92, 103, 133); // #5c6785
pub const BG_RAISED: Color = Color::Rgb(38, 41, 53); // #262935

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default()
        .fg(PULSE_CYAN)
        .add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(STRAND_VIOLET)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(GRID_GRAY)
}

/// Selected / highlighted row.
pub fn row_selected() -> Style {
    Style::default()
        .fg(STRAND_VIOLET)
        .bg(BG_RAISED)
        .add_modifier(Modifier::BOLD)
}

/// Key hint text (e.g., "q quit").
pub fn key_hint() -> Style {
    Style::default().fg(GRID_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default()
        .fg(PULSE_CYAN)
        .add_modifier(Modifier::BOLD)
}

/// Field label in detail panels and forms.
pub fn label() -> Style {
    Style::default().fg(GRID_GRAY)
}

/// Field value in detail panels.
pub fn value() -> Style {
    Style::default().fg(PULSE_CYAN)
}

/// Accent colour for a device kind, used for icons and badges.
pub fn kind_color(kind: DeviceKind) -> Color {
    match kind {
        DeviceKind::Olt => SPLICE_AMBER,
        DeviceKind::Ms => PULSE_CYAN,
        DeviceKind::Subms => STRAND_VIOLET,
        DeviceKind::Fdb => SIGNAL_GREEN,
        DeviceKind::X2 => SOFT_WHITE,
    }
}

/// Single-glyph icon for a device kind.
pub fn kind_icon(kind: DeviceKind) -> &'static str {
    match kind {
        DeviceKind::Olt => "◉",
        DeviceKind::Ms => "◇",
        DeviceKind::Subms => "◆",
        DeviceKind::Fdb => "▣",
        DeviceKind::X2 => "▫",
    }
}

/// Colour for an OLT operational status badge.
pub fn status_color(status: OltStatus) -> Color {
    match status {
        OltStatus::Active => SIGNAL_GREEN,
        OltStatus::Maintenance => SPLICE_AMBER,
        OltStatus::Error => LASER_RED,
        OltStatus::Inactive | OltStatus::Unknown => GRID_GRAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_has_a_badge_colour() {
        assert_eq!(status_color(OltStatus::Active), SIGNAL_GREEN);
        assert_eq!(status_color(OltStatus::Maintenance), SPLICE_AMBER);
        assert_eq!(status_color(OltStatus::Error), LASER_RED);
        assert_eq!(status_color(OltStatus::Inactive), GRID_GRAY);
        assert_eq!(status_color(OltStatus::Unknown), GRID_GRAY);
    }

    #[test]
    fn kinds_get_distinct_icons() {
        let icons = [
            kind_icon(DeviceKind::Olt),
            kind_icon(DeviceKind::Ms),
            kind_icon(DeviceKind::Subms),
            kind_icon(DeviceKind::Fdb),
            kind_icon(DeviceKind::X2),
        ];
        for (i, a) in icons.iter().enumerate() {
            for b in &icons[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
