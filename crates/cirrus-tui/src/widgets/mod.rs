//! Small rendering helpers shared by the screens and the app overlays.

pub mod overlay;

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;

use crate::theme;

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Status word with a colored dot, or the running operation's progress
/// when there is one.
pub fn status_span(status: &str, progress: Option<&str>) -> Span<'static> {
    match progress {
        Some(progress) => Span::styled(format!("◐ {progress}"), Style::default().fg(theme::AMBER)),
        None => {
            let color = theme::status_color(status);
            let dot = if color == theme::MINT { "●" } else { "○" };
            Span::styled(format!("{dot} {status}"), Style::default().fg(color))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_rect(area, 20, 4), Rect::new(10, 3, 20, 4));
        assert_eq!(centered_rect(area, 80, 20), area);
    }

    #[test]
    fn progress_wins_over_status() {
        assert_eq!(status_span("offline", Some("Booting (40%)")).content, "◐ Booting (40%)");
        assert_eq!(status_span("running", None).content, "● running");
        assert_eq!(status_span("offline", None).content, "○ offline");
    }
}
