//! Directives — the atomic instructions handed to a renderer.

use serde::{Deserialize, Serialize};

/// One instruction for the technician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    Title { text: String },
    Note { text: String },
    Warning { text: String },
    Check { text: String },
    Table { rows: Vec<Vec<Cell>> },
    Timer { duration: TimerDuration },
}

impl Directive {
    pub fn title(text: impl Into<String>) -> Self {
        Directive::Title { text: text.into() }
    }

    pub fn note(text: impl Into<String>) -> Self {
        Directive::Note { text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Directive::Warning { text: text.into() }
    }

    pub fn check(text: impl Into<String>) -> Self {
        Directive::Check { text: text.into() }
    }

    pub fn timer(duration: TimerDuration) -> Self {
        Directive::Timer { duration }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Directive::Title { .. } => "title",
            Directive::Note { .. } => "note",
            Directive::Warning { .. } => "warning",
            Directive::Check { .. } => "check",
            Directive::Table { .. } => "table",
            Directive::Timer { .. } => "timer",
        }
    }

    /// Text payload of the simple text directives.
    pub fn text(&self) -> Option<&str> {
        match self {
            Directive::Title { text }
            | Directive::Note { text }
            | Directive::Warning { text }
            | Directive::Check { text } => Some(text),
            Directive::Table { .. } | Directive::Timer { .. } => None,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, Directive::Title { .. })
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Directive::Warning { .. })
    }
}

/// A table cell: plain text, or an id the technician ticks off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Checkable { content: String, check: bool },
    Text(String),
}

/// Literal wait length carried by a timer directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerDuration {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl TimerDuration {
    pub fn from_minutes(minutes: u32) -> Self {
        Self {
            hours: minutes / 60,
            minutes: minutes % 60,
            seconds: 0,
        }
    }
}

/// Destination for emitted directives.
pub trait InstructionSink {
    fn emit(&mut self, directive: Directive);
}

impl InstructionSink for Vec<Directive> {
    fn emit(&mut self, directive: Directive) {
        self.push(directive);
    }
}
