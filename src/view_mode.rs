//! View mode types
//!
//! SchoolFinder offers two mutually exclusive views:
//! - Assistant mode: conversational Q&A with persisted history
//! - Classic mode: the traditional filtered search list
//!
//! The [`SearchContainer`] owns the active mode and is the only state shared
//! between the two views.

use colored::Colorize;
use std::fmt;

/// Which view is currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Conversational Q&A assistant
    #[default]
    Assistant,

    /// Traditional filtered search list
    Classic,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assistant => write!(f, "ASSISTANT"),
            Self::Classic => write!(f, "CLASSIC"),
        }
    }
}

impl ViewMode {
    /// Parse a view mode from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use schoolfinder::view_mode::ViewMode;
    ///
    /// assert_eq!(ViewMode::parse_str("chat").unwrap(), ViewMode::Assistant);
    /// assert_eq!(ViewMode::parse_str("Classic").unwrap(), ViewMode::Classic);
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "assistant" | "chat" => Ok(Self::Assistant),
            "classic" | "search" | "list" => Ok(Self::Classic),
            other => Err(format!("Unknown view mode: {}", other)),
        }
    }

    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            Self::Assistant => Self::Classic,
            Self::Classic => Self::Assistant,
        }
    }

    /// Get a user-friendly description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            Self::Assistant => "Ask questions and get answers about schools",
            Self::Classic => "Browse schools with search filters",
        }
    }

    /// Get a colored tag representation of this mode
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Assistant => format!("[{}]", "ASSISTANT".purple()),
            Self::Classic => format!("[{}]", "CLASSIC".blue()),
        }
    }
}

/// Owner of the active view mode
#[derive(Debug, Clone, Default)]
pub struct SearchContainer {
    mode: ViewMode,
}

impl SearchContainer {
    /// Create a container showing `mode`
    pub fn new(mode: ViewMode) -> Self {
        Self { mode }
    }

    /// Currently shown mode
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch to the other mode, returning the previous one
    pub fn toggle(&mut self) -> ViewMode {
        let old = self.mode;
        self.mode = old.toggled();
        tracing::debug!("View mode {} -> {}", old, self.mode);
        old
    }

    /// Switch to `mode`, returning the previous one
    pub fn switch_to(&mut self, mode: ViewMode) -> ViewMode {
        let old = self.mode;
        self.mode = mode;
        old
    }

    /// Prompt text for the active mode
    pub fn format_prompt(&self) -> String {
        format!("{} >> ", self.mode.colored_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_mode_default_is_assistant() {
        assert_eq!(ViewMode::default(), ViewMode::Assistant);
    }

    #[test]
    fn test_view_mode_parse_str() {
        assert_eq!(ViewMode::parse_str("assistant").unwrap(), ViewMode::Assistant);
        assert_eq!(ViewMode::parse_str("CHAT").unwrap(), ViewMode::Assistant);
        assert_eq!(ViewMode::parse_str("search").unwrap(), ViewMode::Classic);
        assert!(ViewMode::parse_str("kiosk").is_err());
    }

    #[test]
    fn test_view_mode_display() {
        assert_eq!(ViewMode::Assistant.to_string(), "ASSISTANT");
        assert_eq!(ViewMode::Classic.to_string(), "CLASSIC");
    }

    #[test]
    fn test_toggle_alternates() {
        let mut container = SearchContainer::default();
        assert_eq!(container.toggle(), ViewMode::Assistant);
        assert_eq!(container.mode(), ViewMode::Classic);
        assert_eq!(container.toggle(), ViewMode::Classic);
        assert_eq!(container.mode(), ViewMode::Assistant);
    }

    #[test]
    fn test_switch_to_returns_previous() {
        let mut container = SearchContainer::new(ViewMode::Classic);
        assert_eq!(container.switch_to(ViewMode::Classic), ViewMode::Classic);
        assert_eq!(container.switch_to(ViewMode::Assistant), ViewMode::Classic);
        assert_eq!(container.mode(), ViewMode::Assistant);
    }

    #[test]
    fn test_format_prompt_contains_mode() {
        let container = SearchContainer::new(ViewMode::Classic);
        assert!(container.format_prompt().contains("CLASSIC"));
    }
}
