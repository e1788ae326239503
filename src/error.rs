use std::{error::Error, fmt};

/// Reported by the complete-input entry points. The combinators themselves never
/// produce errors, only success or failure with a remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing matched. `furthest` is the byte offset of the deepest character
    /// any terminal looked at.
    NoMatch { furthest: usize },

    /// A prefix matched but input was left over.
    Incomplete { consumed: usize, furthest: usize },

    /// The rule registry has no rule of this name.
    UnknownRule(String),
}

impl ParseError {
    /// Byte offset most likely to be near the syntax error.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::NoMatch { furthest } => Some(*furthest),
            Self::Incomplete { consumed, furthest } => Some(*consumed.max(furthest)),
            Self::UnknownRule(_) => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoMatch { furthest } => write!(f, "NoMatch: (furthest={furthest})")?,
            Self::Incomplete { consumed, furthest } => write!(
                f,
                "Incomplete: (consumed={consumed} furthest={furthest})"
            )?,
            Self::UnknownRule(name) => write!(f, "UnknownRule: '{name}'")?,
        };
        Ok(())
    }
}

impl Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_display() {
        assert_eq!(
            ParseError::NoMatch { furthest: 4 }.to_string(),
            "NoMatch: (furthest=4)"
        );
        let e = ParseError::Incomplete {
            consumed: 3,
            furthest: 7,
        };
        assert_eq!(e.to_string(), "Incomplete: (consumed=3 furthest=7)");
        assert_eq!(e.offset(), Some(7));
        assert_eq!(ParseError::UnknownRule("x".into()).offset(), None);
    }
}
