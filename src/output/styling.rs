use std::fmt::Display;

use console::{style, StyledObject};

/// Underlined section title with a leading icon, e.g. "📋 Summary".
pub fn section(icon: &str, title: &str) -> String {
    format!("{} {}", style(icon).bright(), style(title).bright().underlined())
}

/// Phase that is still running.
pub fn pending(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn done(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn failed(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

/// Secondary text: versions, workflow ids.
pub fn muted(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn banner(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}
