//! Ledger theme and color utilities.

use crate::notifications::NotificationLevel;
use backoffice_core::{status_tone, StatusTone};
use ratatui::style::Color;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTheme {
    pub bg: Color,
    pub bg_secondary: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl LedgerTheme {
    pub fn ledger() -> Self {
        Self {
            bg: Color::Rgb(16, 18, 22),
            bg_secondary: Color::Rgb(28, 31, 38),
            bg_highlight: Color::Rgb(44, 49, 60),
            primary: Color::Rgb(97, 175, 239),
            primary_dim: Color::Rgb(52, 101, 142),
            secondary: Color::Rgb(198, 120, 221),
            success: Color::Rgb(46, 204, 113),
            warning: Color::Rgb(241, 196, 15),
            error: Color::Rgb(231, 76, 60),
            info: Color::Rgb(97, 175, 239),
            text: Color::Rgb(230, 230, 230),
            text_dim: Color::Rgb(150, 150, 150),
            text_muted: Color::Rgb(90, 90, 90),
            border: Color::Rgb(70, 74, 84),
            border_focus: Color::Rgb(97, 175, 239),
        }
    }
}

impl Default for LedgerTheme {
    fn default() -> Self {
        Self::ledger()
    }
}

pub fn tone_color(tone: StatusTone, theme: &LedgerTheme) -> Color {
    match tone {
        StatusTone::Positive => theme.success,
        StatusTone::Negative => theme.error,
        StatusTone::Neutral => theme.warning,
    }
}

/// Colour of a free-form status value; empty counts as pending.
pub fn status_color(status: &str, theme: &LedgerTheme) -> Color {
    tone_color(status_tone(status), theme)
}

pub fn notification_color(level: NotificationLevel, theme: &LedgerTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}
