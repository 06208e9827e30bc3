//! Overlays drawn on top of the active screen: toast, confirm dialog and
//! the help panel.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::action::{ConfirmAction, Notification, NotificationLevel};
use crate::theme;

use super::centered_rect;

fn framed(frame: &mut Frame, area: Rect, title: Option<&str>, border: Style) -> Rect {
    frame.render_widget(Clear, area);
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(Style::default().bg(theme::BG_OVERLAY));
    if let Some(title) = title {
        block = block.title(format!(" {title} ")).title_style(theme::title_style());
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Toast in the bottom-right corner, above the status bar.
pub fn render_toast(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_width = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_width.saturating_add(6).clamp(20, 60).min(area.width);
    let height = 3u16.min(area.height);
    let toast = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + area.height.saturating_sub(height + 2),
        width,
        height,
    );

    let (color, icon) = match notif.level {
        NotificationLevel::Success => (theme::MINT, "✓"),
        NotificationLevel::Error => (theme::ROSE, "✗"),
        NotificationLevel::Warning => (theme::AMBER, "!"),
        NotificationLevel::Info => (theme::SKY, "·"),
    };
    let inner = framed(frame, toast, None, Style::default().fg(color));
    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::TEXT)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

pub fn render_confirm(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog = centered_rect(area, 56, 5);
    let inner = framed(frame, dialog, Some("Confirm"), Style::default().fg(theme::AMBER));
    let text = vec![
        Line::from(Span::styled(
            format!("  {confirm}"),
            Style::default().fg(theme::TEXT),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

const HELP: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("1-2", "Dashboard / Search"),
            ("Tab", "Next screen"),
            ("j/k ↑/↓", "Move selection"),
            ("Enter", "Open selected server"),
            ("Esc", "Back"),
        ],
    ),
    (
        "Global",
        &[
            ("/", "Search"),
            ("Ctrl+r", "Refresh account"),
            ("?", "This help"),
            ("q", "Quit"),
        ],
    ),
    (
        "Server",
        &[
            ("b r s", "Boot / reboot / shut down"),
            ("m", "Migrate"),
            ("c", "Follow the migration notice"),
        ],
    ),
    ("Dashboard", &[("e", "Mark events seen")]),
];

pub fn render_help(frame: &mut Frame, area: Rect) {
    let help_area = centered_rect(area, 52, 24);
    let inner = framed(frame, help_area, Some("Keyboard Shortcuts"), theme::border_focused());

    let mut lines = Vec::new();
    for (section, keys) in HELP {
        lines.push(Line::from(Span::styled(
            format!("  {section}"),
            Style::default().fg(theme::SKY),
        )));
        for (key, what) in *keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(*what, theme::key_hint()),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "  Esc or ? to close",
        theme::key_hint(),
    )));
    frame.render_widget(Paragraph::new(lines), inner);
}
