use std::fmt;

/// Recorded outcome of one task, keyed by its idx on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Output(String),
    Error(String),
}

impl Observation {
    pub fn content(&self) -> &str {
        match self {
            Self::Output(text) | Self::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content())
    }
}
