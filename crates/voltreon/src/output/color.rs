//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:  green   (done status, completed actions)
//!   - Warning/Active: yellow (in progress, in review)
//!   - Error:         red     (rejections, failures)
//!   - Info/Reference: cyan   (ticket IDs, root tree node)
//!   - Accent:        magenta (AI-generated marker)
//!   - Muted:         dimmed  (field labels, connectors, backlog, cancelled)
//!   - Emphasis:      bold    (section headers)

use crate::domain::TicketStatus;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply color to status text based on ticket status.
pub(crate) fn colorize_status(status: TicketStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        TicketStatus::Backlog | TicketStatus::Cancelled => text.dimmed().to_string(),
        TicketStatus::ToDo => text.white().to_string(),
        TicketStatus::InProgress | TicketStatus::InReview => text.yellow().to_string(),
        TicketStatus::Done => text.green().to_string(),
    }
}

/// Colorize an entity ID (cyan), rendered as `#id`.
pub(crate) fn colorize_id(id: impl std::fmt::Display, config: &OutputConfig) -> String {
    let text = format!("#{id}");
    if !config.use_colors {
        return text;
    }
    text.cyan().to_string()
}

/// Marker for AI-generated tickets; empty for human-written ones.
pub(crate) fn ai_marker(is_ai_generated: bool, config: &OutputConfig) -> String {
    if !is_ai_generated {
        return String::new();
    }
    let text = if config.use_ascii { "[ai]" } else { "✦ ai" };
    if !config.use_colors {
        return text.to_string();
    }
    text.magenta().to_string()
}

/// Get a colored status icon, with ASCII fallback support.
pub(crate) fn colored_status_icon(status: TicketStatus, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match status {
            TicketStatus::Backlog => ".",
            TicketStatus::ToDo => "o",
            TicketStatus::InProgress => ">",
            TicketStatus::InReview => "?",
            TicketStatus::Done => "+",
            TicketStatus::Cancelled => "x",
        }
    } else {
        match status {
            TicketStatus::Backlog => "·",
            TicketStatus::ToDo => "○",
            TicketStatus::InProgress => "▶",
            TicketStatus::InReview => "◎",
            TicketStatus::Done => "✓",
            TicketStatus::Cancelled => "✗",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }

    match status {
        TicketStatus::Backlog | TicketStatus::Cancelled => icon.dimmed().to_string(),
        TicketStatus::ToDo => icon.white().to_string(),
        TicketStatus::InProgress | TicketStatus::InReview => icon.yellow().to_string(),
        TicketStatus::Done => icon.green().to_string(),
    }
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Apply cyan color to text (for arrows/connectors).
pub(crate) fn cyan(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Apply yellow color to text (for arrows/connectors).
pub(crate) fn yellow(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::control::set_override;
    use std::sync::{Mutex, MutexGuard};

    static GLOBAL_STATE_MUTEX: Mutex<()> = Mutex::new(());

    struct ColorGuard<'a> {
        _guard: MutexGuard<'a, ()>,
    }

    impl ColorGuard<'_> {
        fn new() -> Self {
            let guard = GLOBAL_STATE_MUTEX
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            set_override(true);
            Self { _guard: guard }
        }
    }

    impl Drop for ColorGuard<'_> {
        fn drop(&mut self) {
            set_override(false);
        }
    }

    #[test]
    fn test_colorize_status_contains_ansi_codes() {
        let _colors = ColorGuard::new();
        let config = OutputConfig::new(80, false, true);

        for status in TicketStatus::ALL {
            let text = colorize_status(status, &config);
            assert!(text.contains(status.as_str()));
            assert!(text.contains("\x1b["), "{status} should have ANSI codes");
        }
    }

    #[test]
    fn test_no_colors_returns_plain_text() {
        let config = OutputConfig::new(80, false, false);
        assert_eq!(colorize_status(TicketStatus::InProgress, &config), "In Progress");
        assert_eq!(colorize_id(7, &config), "#7");
        assert_eq!(success("ok", &config), "ok");
        assert_eq!(error("bad", &config), "bad");
        assert_eq!(warning("careful", &config), "careful");
    }

    #[test]
    fn test_warning_is_yellow() {
        let _colors = ColorGuard::new();
        let config = OutputConfig::new(80, false, true);
        assert_eq!(warning("careful", &config), "\x1b[33mcareful\x1b[0m");
    }

    #[test]
    fn test_status_icons_ascii_fallback() {
        let config = OutputConfig::new(80, true, false);
        for status in TicketStatus::ALL {
            assert!(colored_status_icon(status, &config).is_ascii());
        }
        assert_eq!(colored_status_icon(TicketStatus::Done, &config), "+");
    }

    #[test]
    fn test_ai_marker() {
        let config = OutputConfig::new(80, true, false);
        assert_eq!(ai_marker(false, &config), "");
        assert_eq!(ai_marker(true, &config), "[ai]");
    }
}
