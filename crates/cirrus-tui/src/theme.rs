//! Cirrus palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const SKY: Color = Color::Rgb(94, 190, 255); // #5ebeff
pub const DEEP_BLUE: Color = Color::Rgb(58, 110, 210); // #3a6ed2
pub const MINT: Color = Color::Rgb(86, 230, 160); // #56e6a0
pub const AMBER: Color = Color::Rgb(255, 196, 87); // #ffc457
pub const ROSE: Color = Color::Rgb(255, 104, 120); // #ff6878

// ── Neutrals ──────────────────────────────────────────────────────────

pub const TEXT: Color = Color::Rgb(205, 212, 224); // #cdd4e0
pub const MUTED: Color = Color::Rgb(112, 124, 150); // #707c96
pub const BG_HIGHLIGHT: Color = Color::Rgb(36, 44, 62); // #242c3e
pub const BG_OVERLAY: Color = Color::Rgb(22, 27, 38); // #161b26

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(SKY).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(SKY)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(MUTED)
}

pub fn table_row() -> Style {
    Style::default().fg(TEXT)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(SKY)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(TEXT)
        .bg(DEEP_BLUE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(MUTED)
}

/// Placeholder rows: "Loading…", "No items to display.", errors.
pub fn message() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::ITALIC)
}

pub fn error_text() -> Style {
    Style::default().fg(ROSE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(MUTED)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(SKY).add_modifier(Modifier::BOLD)
}

/// Color for an API status word.
pub fn status_color(status: &str) -> Color {
    match status {
        "running" | "active" | "finished" => MINT,
        "offline" | "failed" | "disabled" | "deleting" => ROSE,
        _ => AMBER,
    }
}

/// Clickable text, e.g. the migration banner link.
pub fn link() -> Style {
    Style::default()
        .fg(SKY)
        .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
}
