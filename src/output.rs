use crate::cursor::Input;
use crate::error::ParseError;

/// The outcome of running a parser.
///
/// On success it holds the value and the cursor just past what was consumed. On
/// failure there is no value and the remainder is the cursor the parser was
/// invoked with, so callers can retry another alternative from the same place.
///
/// `furthest` is a diagnostic side channel: the largest byte offset any terminal
/// examined while producing this result. It never influences which alternative
/// is chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct Output<'a, T> {
    value: Option<T>,
    remainder: Input<'a>,
    furthest: usize,
}

impl<'a, T> Output<'a, T> {
    #[inline]
    pub fn success(value: T, remainder: Input<'a>) -> Self {
        Self {
            value: Some(value),
            remainder,
            furthest: remainder.offset(),
        }
    }

    #[inline]
    pub fn failure(input: Input<'a>) -> Self {
        Self {
            value: None,
            remainder: input,
            furthest: input.offset(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn remainder(&self) -> Input<'a> {
        self.remainder
    }

    pub fn furthest(&self) -> usize {
        self.furthest
    }

    /// Widens the furthest-examined offset.
    #[inline]
    pub fn reach(mut self, furthest: usize) -> Self {
        self.furthest = self.furthest.max(furthest);
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Output<'a, U> {
        Output {
            value: self.value.map(f),
            remainder: self.remainder,
            furthest: self.furthest,
        }
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// The value with the remainder, or `None` on failure.
    pub fn into_parts(self) -> Option<(T, Input<'a>)> {
        let remainder = self.remainder;
        self.value.map(|v| (v, remainder))
    }

    /// Replaces the remainder, keeping value and diagnostics.
    pub(crate) fn with_remainder(self, remainder: Input<'a>) -> Self {
        Self { remainder, ..self }
    }

    pub fn into_result(self) -> Result<(Input<'a>, T), ParseError> {
        let furthest = self.furthest;
        match self.into_parts() {
            Some((value, rest)) => Ok((rest, value)),
            None => Err(ParseError::NoMatch { furthest }),
        }
    }

    /// The value, provided the parser consumed the whole text.
    pub fn complete(self) -> Result<T, ParseError> {
        let furthest = self.furthest;
        let (rest, value) = self.into_result()?;
        if rest.at_end() {
            Ok(value)
        } else {
            Err(ParseError::Incomplete {
                consumed: rest.offset(),
                furthest,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_output() {
        let inp = Input::new("abc");
        let ok = Output::success('a', inp.advance(1));
        assert!(ok.is_success());
        assert_eq!(ok.value(), Some(&'a'));
        assert_eq!(ok.furthest(), 1);
        assert_eq!(ok.clone().map(|c| c.to_ascii_uppercase()).into_value(), Some('A'));

        let fail: Output<char> = Output::failure(inp).reach(2);
        assert!(!fail.is_success());
        assert_eq!(fail.remainder(), inp);
        assert_eq!(fail.furthest(), 2);
        assert_eq!(fail.clone().into_result(), Err(ParseError::NoMatch { furthest: 2 }));
        assert_eq!(fail.reach(1).furthest(), 2);
    }

    #[test]
    fn test_complete() {
        let inp = Input::new("ab");
        assert_eq!(Output::success((), inp.advance(2)).complete(), Ok(()));
        assert_eq!(
            Output::success((), inp.advance(1)).complete(),
            Err(ParseError::Incomplete {
                consumed: 1,
                furthest: 1
            })
        );
    }
}
