//! Punctuation and the ABNF core character rules.

use crate::prelude::*;
use crate::node;

// ---- core rules

pub fn alpha<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("ALPHA", input, |i| char_class(|c: char| c.is_ascii_alphabetic()).parse(i))
}

pub fn digit<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("DIGIT", input, |i| char_class(|c: char| c.is_ascii_digit()).parse(i))
}

/// Letters match in either case, as double-quoted grammar literals do.
pub fn hexdig<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("HEXDIG", input, |i| char_class(|c: char| c.is_ascii_hexdigit()).parse(i))
}

pub fn a_to_f<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("A-to-F", input, |i| {
        char_class(|c: char| matches!(c.to_ascii_uppercase(), 'A'..='F')).parse(i)
    })
}

pub fn dquote<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("DQUOTE", input, |i| literal("\"").parse(i))
}

pub fn sp<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("SP", input, |i| literal(" ").parse(i))
}

pub fn htab<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("HTAB", input, |i| literal("\t").parse(i))
}

pub fn vchar<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("VCHAR", input, |i| char_range('\u{21}', '\u{7e}').parse(i))
}

/// Any character outside ASCII; the text is already decoded UTF-8.
pub fn obs_text<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("obs-text", input, |i| char_class(|c: char| !c.is_ascii()).parse(i))
}

// ---- whitespace

fn whitespace_unit<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    keyword_ci(&[" ", "\t", "%20", "%09"]).parse(input)
}

node! {
    /// Required whitespace, plain or percent-encoded.
    pub struct Rws<'a>(pub Plus<Terminal<'a>>);
}

node! {
    /// "Bad" whitespace: allowed but not required.
    pub struct Bws<'a>(pub Star<Terminal<'a>>);
}

pub fn rws<'a>(input: Input<'a>) -> Output<'a, Rws<'a>> {
    rule("RWS", input, |i| {
        whitespace_unit.repeat::<1, UNBOUNDED>().map(Rws).parse(i)
    })
}

pub fn bws<'a>(input: Input<'a>) -> Output<'a, Bws<'a>> {
    rule("BWS", input, |i| {
        whitespace_unit.repeat::<0, UNBOUNDED>().map(Bws).parse(i)
    })
}

// ---- punctuation

pub fn at<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("AT", input, |i| keyword_ci(&["@", "%40"]).parse(i))
}

pub fn colon<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("COLON", input, |i| keyword_ci(&[":", "%3A"]).parse(i))
}

pub fn comma<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("COMMA", input, |i| keyword_ci(&[",", "%2C"]).parse(i))
}

pub fn eq<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("EQ", input, |i| literal("=").parse(i))
}

pub fn sign<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("SIGN", input, |i| keyword_ci(&["+", "%2B", "-"]).parse(i))
}

pub fn semi<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("SEMI", input, |i| keyword_ci(&[";", "%3B"]).parse(i))
}

pub fn star<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("STAR", input, |i| keyword_ci(&["*", "%2A"]).parse(i))
}

pub fn squote<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("SQUOTE", input, |i| keyword_ci(&["'", "%27"]).parse(i))
}

pub fn open<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("OPEN", input, |i| keyword_ci(&["(", "%28"]).parse(i))
}

pub fn close<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("CLOSE", input, |i| keyword_ci(&[")", "%29"]).parse(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_whitespace() {
        let out = rws(Input::new(" %20\t%09x"));
        assert_eq!(out.value().map(|w| w.0.len()), Some(4));
        assert_eq!(out.remainder().rest(), "x");

        let inp = Input::new("x");
        assert!(!rws(inp).is_success());
        let out = bws(inp);
        assert!(out.is_success());
        assert_eq!(out.remainder(), inp);
        assert_eq!(out.value().map(|w| w.source()), Some(String::new()));
    }

    #[test]
    fn test_encoded_punctuation() {
        for s in ["(", "%28"] {
            assert_eq!(open(Input::new(s)).value().map(|t| t.text()), Some(s));
        }
        assert!(squote(Input::new("%27")).is_success());
        assert!(comma(Input::new("%2c")).is_success());
        assert!(!eq(Input::new("%3D")).is_success());
        assert_eq!(sign(Input::new("-1")).remainder().rest(), "1");
    }

    #[test]
    fn test_core() {
        assert!(hexdig(Input::new("f")).is_success());
        assert!(a_to_f(Input::new("e")).is_success());
        assert!(!a_to_f(Input::new("g")).is_success());
        assert!(alpha(Input::new("Z")).is_success());
        assert!(!alpha(Input::new("é")).is_success());
        assert!(obs_text(Input::new("é")).is_success());
        assert!(!vchar(Input::new(" ")).is_success());
    }
}
