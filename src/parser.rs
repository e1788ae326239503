use std::marker::PhantomData;

use crate::cst::Repeated;
use crate::cursor::Input;
use crate::output::Output;

/// Anything that can be run against a cursor.
///
/// Every `Fn(Input<'a>) -> Output<'a, T>` is a parser, which makes plain `fn` items
/// usable as parsers. A `fn` item is resolved lazily by name, so rules may refer to
/// each other recursively without any cyclic construction.
pub trait Parser<'a, T> {
    fn parse(&self, input: Input<'a>) -> Output<'a, T>;

    fn map<U, F>(self, f: F) -> Map<Self, F, T>
    where
        Self: Sized,
        F: Fn(T) -> U,
    {
        Map {
            parser: self,
            f,
            pd: PhantomData,
        }
    }

    /// Like [`map`](Parser::map), but `None` turns the match into a failure at the
    /// original position.
    fn map_opt<U, F>(self, f: F) -> MapOpt<Self, F, T>
    where
        Self: Sized,
        F: Fn(T) -> Option<U>,
    {
        MapOpt {
            parser: self,
            f,
            pd: PhantomData,
        }
    }

    /// Runs `next` on the remainder; the value is the pair.
    fn then<U, P>(self, next: P) -> Then<Self, P>
    where
        Self: Sized,
        P: Parser<'a, U>,
    {
        Then { p1: self, p2: next }
    }

    /// Ordered choice: `other` is only tried when `self` fails.
    fn or<P>(self, other: P) -> Or<Self, P>
    where
        Self: Sized,
        P: Parser<'a, T>,
    {
        Or { p1: self, p2: other }
    }

    fn opt(self) -> Optional<Self>
    where
        Self: Sized,
    {
        Optional(self)
    }

    fn many(self) -> Many<Self>
    where
        Self: Sized,
    {
        Many(self)
    }

    /// Between `MIN` and `MAX` matches, greedily. Use
    /// [`UNBOUNDED`](crate::cst::UNBOUNDED) for no upper limit.
    fn repeat<const MIN: usize, const MAX: usize>(self) -> Repeat<Self, MIN, MAX>
    where
        Self: Sized,
    {
        Repeat(self)
    }
}

impl<'a, T, F> Parser<'a, T> for F
where
    F: Fn(Input<'a>) -> Output<'a, T>,
{
    #[inline]
    fn parse(&self, input: Input<'a>) -> Output<'a, T> {
        (self)(input)
    }
}

pub struct Map<P, F, T> {
    parser: P,
    f: F,
    pd: PhantomData<fn() -> T>,
}

impl<'a, T, U, P, F> Parser<'a, U> for Map<P, F, T>
where
    P: Parser<'a, T>,
    F: Fn(T) -> U,
{
    #[inline]
    fn parse(&self, input: Input<'a>) -> Output<'a, U> {
        self.parser.parse(input).map(&self.f)
    }
}

pub struct MapOpt<P, F, T> {
    parser: P,
    f: F,
    pd: PhantomData<fn() -> T>,
}

impl<'a, T, U, P, F> Parser<'a, U> for MapOpt<P, F, T>
where
    P: Parser<'a, T>,
    F: Fn(T) -> Option<U>,
{
    fn parse(&self, input: Input<'a>) -> Output<'a, U> {
        let out = self.parser.parse(input);
        let furthest = out.furthest();
        match out.into_parts().and_then(|(v, rest)| Some(((self.f)(v)?, rest))) {
            Some((u, rest)) => Output::success(u, rest).reach(furthest),
            None => Output::failure(input).reach(furthest),
        }
    }
}

pub struct Then<P1, P2> {
    p1: P1,
    p2: P2,
}

impl<'a, A, B, P1, P2> Parser<'a, (A, B)> for Then<P1, P2>
where
    P1: Parser<'a, A>,
    P2: Parser<'a, B>,
{
    fn parse(&self, input: Input<'a>) -> Output<'a, (A, B)> {
        let out1 = self.p1.parse(input);
        let furthest = out1.furthest();
        let Some((a, rest)) = out1.into_parts() else {
            return Output::failure(input).reach(furthest);
        };
        let out2 = self.p2.parse(rest);
        let furthest = furthest.max(out2.furthest());
        match out2.into_parts() {
            Some((b, rest)) => Output::success((a, b), rest).reach(furthest),
            None => Output::failure(input).reach(furthest),
        }
    }
}

pub struct Or<P1, P2> {
    p1: P1,
    p2: P2,
}

impl<'a, T, P1, P2> Parser<'a, T> for Or<P1, P2>
where
    P1: Parser<'a, T>,
    P2: Parser<'a, T>,
{
    fn parse(&self, input: Input<'a>) -> Output<'a, T> {
        let out1 = self.p1.parse(input);
        if out1.is_success() {
            return out1;
        }
        self.p2.parse(input).reach(out1.furthest())
    }
}

/// Never fails; an absent match yields `None` at the original position.
pub struct Optional<P>(P);

impl<'a, T, P> Parser<'a, Option<T>> for Optional<P>
where
    P: Parser<'a, T>,
{
    fn parse(&self, input: Input<'a>) -> Output<'a, Option<T>> {
        let out = self.0.parse(input);
        let furthest = out.furthest();
        match out.into_parts() {
            Some((v, rest)) => Output::success(Some(v), rest).reach(furthest),
            None => Output::success(None, input).reach(furthest),
        }
    }
}

/// Zero or more matches, collected in order. Never fails.
pub struct Many<P>(P);

impl<'a, T, P> Parser<'a, Vec<T>> for Many<P>
where
    P: Parser<'a, T>,
{
    fn parse(&self, input: Input<'a>) -> Output<'a, Vec<T>> {
        let (items, rest, furthest) = collect(&self.0, input, 0, usize::MAX);
        Output::success(items, rest).reach(furthest)
    }
}

/// Greedy bounded repetition; fails if fewer than `MIN` matches were found.
pub struct Repeat<P, const MIN: usize, const MAX: usize>(P);

impl<'a, T, P, const MIN: usize, const MAX: usize> Parser<'a, Repeated<T, MIN, MAX>>
    for Repeat<P, MIN, MAX>
where
    P: Parser<'a, T>,
{
    fn parse(&self, input: Input<'a>) -> Output<'a, Repeated<T, MIN, MAX>> {
        let (items, rest, furthest) = collect(&self.0, input, MIN, MAX);
        match Repeated::new(items) {
            Ok(items) => Output::success(items, rest).reach(furthest),
            Err(_) => Output::failure(input).reach(furthest),
        }
    }
}

// An iteration that succeeds without consuming anything ends the loop once at
// least `min` items are held, otherwise a nullable item would repeat forever.
// Below `min` the empty match is repeated until the minimum is met.
fn collect<'a, T, P>(
    p: &P,
    input: Input<'a>,
    min: usize,
    max: usize,
) -> (Vec<T>, Input<'a>, usize)
where
    P: Parser<'a, T>,
{
    let mut items = Vec::new();
    let mut rest = input;
    let mut furthest = input.offset();
    while items.len() < max {
        let out = p.parse(rest);
        furthest = furthest.max(out.furthest());
        let Some((item, next)) = out.into_parts() else {
            break;
        };
        items.push(item);
        let stalled = next.offset() == rest.offset();
        rest = next;
        if stalled && items.len() >= min {
            break;
        }
    }
    (items, rest, furthest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{Node, Terminal, UNBOUNDED};
    use crate::terminal::{char_class, literal};
    use test_log::test;

    fn digit<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
        char_class(|c: char| c.is_ascii_digit()).parse(input)
    }

    #[test]
    fn test_fn_items_are_parsers() {
        let out = digit.parse(Input::new("7x"));
        assert_eq!(out.value().map(|t| t.text()), Some("7"));
        assert_eq!(out.remainder().rest(), "x");

        let closure = |i: Input<'static>| digit(i);
        assert!(closure.parse(Input::new("1")).is_success());
    }

    #[test]
    fn test_map_and_then() {
        let p = digit.then(literal("x")).map(|(d, x)| d.source() + x.text());
        let out = p.parse(Input::new("7xy"));
        assert_eq!(out.value().map(String::as_str), Some("7x"));
        assert_eq!(out.remainder().rest(), "y");

        let inp = Input::new("77");
        let out = digit.then(literal("x")).parse(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);
        assert_eq!(out.furthest(), 1);
    }

    #[test]
    fn test_map_opt() {
        let even = digit.map_opt(|d: Terminal| {
            let n = d.text().parse::<u8>().ok()?;
            (n % 2 == 0).then_some(n)
        });
        assert_eq!(even.parse(Input::new("4")).value(), Some(&4));
        let inp = Input::new("3");
        let out = even.parse(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);
    }

    #[test]
    fn test_or_is_ordered() {
        let p = literal("ab").or(literal("a"));
        assert_eq!(p.parse(Input::new("abc")).value().map(|t| t.text()), Some("ab"));
        assert_eq!(p.parse(Input::new("ac")).value().map(|t| t.text()), Some("a"));

        // first success wins even if the other alternative would consume more
        let p = literal("a").or(literal("ab"));
        assert_eq!(p.parse(Input::new("abc")).remainder().rest(), "bc");

        let inp = Input::new("zz");
        let out = p.parse(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);
    }

    #[test]
    fn test_optional_never_fails() {
        let inp = Input::new("x");
        let out = digit.opt().parse(inp);
        assert_eq!(out.value(), Some(&None));
        assert_eq!(out.remainder(), inp);

        let out = digit.opt().parse(Input::new("5"));
        assert!(out.value().unwrap().is_some());
        assert!(out.remainder().at_end());
    }

    #[test]
    fn test_many() {
        let out = digit.many().parse(Input::new("123a"));
        assert_eq!(out.value().map(Vec::len), Some(3));
        assert_eq!(out.remainder().rest(), "a");

        let inp = Input::new("abc");
        let out = digit.many().parse(inp);
        assert_eq!(out.value().map(Vec::len), Some(0));
        assert_eq!(out.remainder(), inp);

        // a nullable item is collected once, then the loop stops
        let out = digit.opt().many().parse(inp);
        assert_eq!(out.value().map(Vec::len), Some(1));
        assert_eq!(out.remainder(), inp);
    }

    #[test]
    fn test_repeat_bounds() {
        let p = digit.repeat::<2, 3>();
        assert!(!p.parse(Input::new("1a")).is_success());
        assert_eq!(p.parse(Input::new("12a")).value().map(|r| r.len()), Some(2));
        let out = p.parse(Input::new("12345"));
        assert_eq!(out.value().map(|r| r.len()), Some(3));
        assert_eq!(out.remainder().rest(), "45");

        let inp = Input::new("");
        let out = digit.repeat::<1, UNBOUNDED>().parse(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);

        let out = digit.repeat::<0, UNBOUNDED>().parse(inp);
        assert_eq!(out.value().map(|r| r.len()), Some(0));
    }

    #[test]
    fn test_repeat_nullable_item() {
        // empty matches count towards the minimum
        let inp = Input::new("x");
        let out = digit.opt().repeat::<3, UNBOUNDED>().parse(inp);
        assert_eq!(out.value().map(|r| r.len()), Some(3));
        assert_eq!(out.remainder(), inp);

        // real matches first, then empty ones up to the minimum
        let out = digit.opt().repeat::<3, 5>().parse(Input::new("1x"));
        let items = out.value().unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().next().unwrap().is_some());
        assert_eq!(out.remainder().rest(), "x");

        // once the minimum is met a single empty match ends the loop
        let out = digit.opt().repeat::<1, 5>().parse(Input::new("12x"));
        assert_eq!(out.value().map(|r| r.len()), Some(3));
    }
}
