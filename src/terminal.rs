use crate::cst::Terminal;
use crate::cursor::Input;
use crate::output::Output;
use crate::parser::Parser;

/// A fixed string.
#[derive(Debug, Clone, Copy)]
pub struct Literal {
    word: &'static str,
    ignore_case: bool,
}

/// Matches `word` exactly, code point for code point.
pub fn literal(word: &'static str) -> Literal {
    Literal {
        word,
        ignore_case: false,
    }
}

/// Matches `word` ignoring ASCII case. The terminal keeps the spelling found in
/// the input.
pub fn literal_ci(word: &'static str) -> Literal {
    Literal {
        word,
        ignore_case: true,
    }
}

impl Literal {
    fn matches(&self, rest: &str) -> bool {
        if self.ignore_case {
            rest.get(..self.word.len())
                .map_or(false, |s| s.eq_ignore_ascii_case(self.word))
        } else {
            rest.starts_with(self.word)
        }
    }

    // offset of the first differing byte, for diagnostics
    fn agreement(&self, rest: &str) -> usize {
        rest.bytes()
            .zip(self.word.bytes())
            .take_while(|(a, b)| {
                if self.ignore_case {
                    a.eq_ignore_ascii_case(b)
                } else {
                    a == b
                }
            })
            .count()
    }
}

impl<'a> Parser<'a, Terminal<'a>> for Literal {
    fn parse(&self, input: Input<'a>) -> Output<'a, Terminal<'a>> {
        let rest = input.rest();
        if self.matches(rest) {
            let remainder = input.advance_bytes(self.word.len());
            Output::success(Terminal::new(&rest[..self.word.len()], input.offset()), remainder)
        } else {
            Output::failure(input).reach(input.offset() + self.agreement(rest))
        }
    }
}

/// Ordered choice among fixed strings, producing a single terminal.
#[derive(Debug, Clone, Copy)]
pub struct Keyword {
    words: &'static [&'static str],
    ignore_case: bool,
}

/// The first of `words` that matches exactly. List longer words before their
/// prefixes.
pub fn keyword(words: &'static [&'static str]) -> Keyword {
    Keyword {
        words,
        ignore_case: false,
    }
}

pub fn keyword_ci(words: &'static [&'static str]) -> Keyword {
    Keyword {
        words,
        ignore_case: true,
    }
}

impl<'a> Parser<'a, Terminal<'a>> for Keyword {
    fn parse(&self, input: Input<'a>) -> Output<'a, Terminal<'a>> {
        let mut furthest = input.offset();
        for &word in self.words {
            let out = Literal {
                word,
                ignore_case: self.ignore_case,
            }
            .parse(input);
            if out.is_success() {
                return out.reach(furthest);
            }
            furthest = furthest.max(out.furthest());
        }
        Output::failure(input).reach(furthest)
    }
}

/// A single character satisfying a predicate.
#[derive(Debug, Clone, Copy)]
pub struct CharClass<F>(F);

pub fn char_class<F>(pred: F) -> CharClass<F>
where
    F: Fn(char) -> bool,
{
    CharClass(pred)
}

/// A single character in `lo..=hi`.
pub fn char_range(lo: char, hi: char) -> CharClass<impl Fn(char) -> bool> {
    CharClass(move |c: char| (lo..=hi).contains(&c))
}

impl<'a, F> Parser<'a, Terminal<'a>> for CharClass<F>
where
    F: Fn(char) -> bool,
{
    fn parse(&self, input: Input<'a>) -> Output<'a, Terminal<'a>> {
        match input.peek() {
            Some(c) if (self.0)(c) => {
                let remainder = input.advance_bytes(c.len_utf8());
                Output::success(Terminal::new(input.span_to(&remainder), input.offset()), remainder)
            }
            _ => Output::failure(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_literal() {
        let inp = Input::new("$top=5");
        let out = literal("$top").parse(inp);
        assert_eq!(out.value().map(|t| t.text()), Some("$top"));
        assert_eq!(out.value().map(|t| t.offset()), Some(0));
        assert_eq!(out.remainder().rest(), "=5");

        // never partially consumes
        let out = literal("$topx").parse(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);
        assert_eq!(out.furthest(), 4);

        assert!(!literal("$TOP").parse(inp).is_success());
        assert!(!literal("$top=5!").parse(inp).is_success());
    }

    #[test]
    fn test_literal_ci() {
        let out = literal_ci("$top").parse(Input::new("$TOP=5"));
        assert_eq!(out.value().map(|t| t.text()), Some("$TOP"));
        // no panic when the candidate would split a multibyte character
        assert!(!literal_ci("ab").parse(Input::new("aé")).is_success());
    }

    #[test]
    fn test_keyword() {
        let p = keyword(&["DateTimeOffset", "Date"]);
        assert_eq!(
            p.parse(Input::new("DateTimeOffset")).value().map(|t| t.text()),
            Some("DateTimeOffset")
        );
        assert_eq!(p.parse(Input::new("Date'")).value().map(|t| t.text()), Some("Date"));
        let inp = Input::new("date");
        assert_eq!(p.parse(inp).remainder(), inp);
        assert!(keyword_ci(&["(", "%28"]).parse(Input::new("%28")).is_success());
    }

    #[test]
    fn test_char_class() {
        let alpha = char_class(|c: char| c.is_alphabetic());
        let out = alpha.parse(Input::new("éa"));
        assert_eq!(out.value().map(|t| t.text()), Some("é"));
        assert_eq!(out.remainder().rest(), "a");
        assert!(!alpha.parse(Input::new("1")).is_success());
        assert!(!alpha.parse(Input::new("")).is_success());

        let hex = char_range('A', 'F');
        assert!(hex.parse(Input::new("C")).is_success());
        assert!(!hex.parse(Input::new("G")).is_success());
    }
}
