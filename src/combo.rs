use std::marker::PhantomData;

use crate::cst::{Delimited, Star};
use crate::cursor::Input;
use crate::output::Output;
use crate::parser::Parser;

/// Runs each parser of a tuple on the remainder of the previous one. The value is
/// the tuple of values; any failure fails the whole sequence at its start.
pub fn seq<Ps>(parsers: Ps) -> Seq<Ps> {
    Seq(parsers)
}

/// Ordered choice over a tuple of parsers: the first success wins.
pub fn alt<Ps>(parsers: Ps) -> Alt<Ps> {
    Alt(parsers)
}

/// Tries every alternative from the same position and keeps the success that
/// consumed the most. Ties go to the earlier alternative.
pub fn longest<Ps>(parsers: Ps) -> Longest<Ps> {
    Longest(parsers)
}

/// Succeeds without consuming anything if `p` would succeed here.
pub fn followed_by<P, T>(p: P) -> FollowedBy<P, T> {
    FollowedBy(p, PhantomData)
}

/// Runs `p` only where `guard` succeeds. The guard consumes nothing, so `p`
/// starts from the same position the guard looked at.
pub fn when<G, U, P>(guard: G, p: P) -> When<G, U, P> {
    When(followed_by(guard), p)
}

/// `item *( sep item )`. A trailing separator without an item after it is left
/// unconsumed.
pub fn sep_by<P, S>(item: P, sep: S) -> SepBy<P, S> {
    SepBy { item, sep }
}

/// `*item tail`. The repetition gives items back when the tail cannot follow all
/// of them; of the splits where the tail parses, the one reaching furthest wins
/// and ties keep more items.
pub fn star_then<P, Q>(item: P, tail: Q) -> StarThen<P, Q> {
    StarThen { item, tail }
}

pub struct Seq<Ps>(Ps);
pub struct Alt<Ps>(Ps);
pub struct Longest<Ps>(Ps);
pub struct FollowedBy<P, T>(P, PhantomData<fn() -> T>);
pub struct When<G, U, P>(FollowedBy<G, U>, P);

impl<'a, T, P> Parser<'a, ()> for FollowedBy<P, T>
where
    P: Parser<'a, T>,
{
    fn parse(&self, input: Input<'a>) -> Output<'a, ()> {
        let out = self.0.parse(input);
        if out.is_success() {
            Output::success((), input).reach(out.furthest())
        } else {
            Output::failure(input).reach(out.furthest())
        }
    }
}

impl<'a, T, U, G, P> Parser<'a, T> for When<G, U, P>
where
    G: Parser<'a, U>,
    P: Parser<'a, T>,
{
    fn parse(&self, input: Input<'a>) -> Output<'a, T> {
        let guard = self.0.parse(input);
        if guard.is_success() {
            self.1.parse(input).reach(guard.furthest())
        } else {
            Output::failure(input).reach(guard.furthest())
        }
    }
}

pub struct SepBy<P, S> {
    item: P,
    sep: S,
}

impl<'a, T, U, P, S> Parser<'a, Delimited<T, U>> for SepBy<P, S>
where
    P: Parser<'a, T>,
    S: Parser<'a, U>,
{
    fn parse(&self, input: Input<'a>) -> Output<'a, Delimited<T, U>> {
        let out = self.item.parse(input);
        let mut furthest = out.furthest();
        let Some((first, mut rest)) = out.into_parts() else {
            return Output::failure(input).reach(furthest);
        };
        let mut items = Vec::new();
        loop {
            let sep = self.sep.parse(rest);
            furthest = furthest.max(sep.furthest());
            let Some((sep, after)) = sep.into_parts() else {
                break;
            };
            let item = self.item.parse(after);
            furthest = furthest.max(item.furthest());
            let Some((item, next)) = item.into_parts() else {
                break;
            };
            items.push((sep, item));
            let stalled = next.offset() == rest.offset();
            rest = next;
            if stalled {
                break;
            }
        }
        match Star::new(items) {
            Ok(tail) => Output::success(Delimited { first, rest: tail }, rest).reach(furthest),
            Err(_) => Output::failure(input).reach(furthest),
        }
    }
}

pub struct StarThen<P, Q> {
    item: P,
    tail: Q,
}

impl<'a, T, U, P, Q> Parser<'a, (Star<T>, U)> for StarThen<P, Q>
where
    P: Parser<'a, T>,
    Q: Parser<'a, U>,
{
    fn parse(&self, input: Input<'a>) -> Output<'a, (Star<T>, U)> {
        let mut furthest = input.offset();
        let mut items = Vec::new();
        let mut stops = vec![input];
        let mut rest = input;
        loop {
            let out = self.item.parse(rest);
            furthest = furthest.max(out.furthest());
            let Some((item, next)) = out.into_parts() else {
                break;
            };
            if next.offset() == rest.offset() {
                break;
            }
            items.push(item);
            stops.push(next);
            rest = next;
        }

        let mut best: Option<(usize, Output<'a, U>)> = None;
        for (kept, stop) in stops.into_iter().enumerate().rev() {
            let out = self.tail.parse(stop);
            furthest = furthest.max(out.furthest());
            if out.is_success()
                && best
                    .as_ref()
                    .map_or(true, |(_, b)| out.remainder().offset() > b.remainder().offset())
            {
                best = Some((kept, out));
            }
        }
        let Some((kept, Some((tail, rest)))) = best.map(|(k, out)| (k, out.into_parts())) else {
            return Output::failure(input).reach(furthest);
        };
        items.truncate(kept);
        match Star::new(items) {
            Ok(items) => Output::success((items, tail), rest).reach(furthest),
            Err(_) => Output::failure(input).reach(furthest),
        }
    }
}

macro_rules! seq_impl {
    ($($p:ident $P:ident $T:ident $v:ident),+) => {
        impl<'a, $($T,)+ $($P,)+> Parser<'a, ($($T,)+)> for Seq<($($P,)+)>
        where
            $($P: Parser<'a, $T>,)+
        {
            fn parse(&self, input: Input<'a>) -> Output<'a, ($($T,)+)> {
                let ($($p,)+) = &self.0;
                let rest = input;
                let mut furthest = input.offset();
                $(
                    let out = $p.parse(rest);
                    furthest = furthest.max(out.furthest());
                    let Some(($v, rest)) = out.into_parts() else {
                        return Output::failure(input).reach(furthest);
                    };
                )+
                Output::success(($($v,)+), rest).reach(furthest)
            }
        }
    };
}

macro_rules! alt_impl {
    ($($p:ident $P:ident),+) => {
        impl<'a, T, $($P,)+> Parser<'a, T> for Alt<($($P,)+)>
        where
            $($P: Parser<'a, T>,)+
        {
            fn parse(&self, input: Input<'a>) -> Output<'a, T> {
                let ($($p,)+) = &self.0;
                let mut furthest = input.offset();
                $(
                    let out = $p.parse(input);
                    if out.is_success() {
                        return out.reach(furthest);
                    }
                    furthest = furthest.max(out.furthest());
                )+
                Output::failure(input).reach(furthest)
            }
        }

        impl<'a, T, $($P,)+> Parser<'a, T> for Longest<($($P,)+)>
        where
            $($P: Parser<'a, T>,)+
        {
            fn parse(&self, input: Input<'a>) -> Output<'a, T> {
                let ($($p,)+) = &self.0;
                let mut furthest = input.offset();
                let mut best: Option<Output<'a, T>> = None;
                $(
                    let out = $p.parse(input);
                    furthest = furthest.max(out.furthest());
                    if out.is_success()
                        && best
                            .as_ref()
                            .map_or(true, |b| out.remainder().offset() > b.remainder().offset())
                    {
                        best = Some(out);
                    }
                )+
                match best {
                    Some(out) => out.reach(furthest),
                    None => Output::failure(input).reach(furthest),
                }
            }
        }
    };
}

seq_impl!(p1 P1 T1 v1, p2 P2 T2 v2);
seq_impl!(p1 P1 T1 v1, p2 P2 T2 v2, p3 P3 T3 v3);
seq_impl!(p1 P1 T1 v1, p2 P2 T2 v2, p3 P3 T3 v3, p4 P4 T4 v4);
seq_impl!(p1 P1 T1 v1, p2 P2 T2 v2, p3 P3 T3 v3, p4 P4 T4 v4, p5 P5 T5 v5);
seq_impl!(p1 P1 T1 v1, p2 P2 T2 v2, p3 P3 T3 v3, p4 P4 T4 v4, p5 P5 T5 v5, p6 P6 T6 v6);
seq_impl!(
    p1 P1 T1 v1, p2 P2 T2 v2, p3 P3 T3 v3, p4 P4 T4 v4, p5 P5 T5 v5, p6 P6 T6 v6,
    p7 P7 T7 v7
);
seq_impl!(
    p1 P1 T1 v1, p2 P2 T2 v2, p3 P3 T3 v3, p4 P4 T4 v4, p5 P5 T5 v5, p6 P6 T6 v6,
    p7 P7 T7 v7, p8 P8 T8 v8
);
seq_impl!(
    p1 P1 T1 v1, p2 P2 T2 v2, p3 P3 T3 v3, p4 P4 T4 v4, p5 P5 T5 v5, p6 P6 T6 v6,
    p7 P7 T7 v7, p8 P8 T8 v8, p9 P9 T9 v9
);
seq_impl!(
    p1 P1 T1 v1, p2 P2 T2 v2, p3 P3 T3 v3, p4 P4 T4 v4, p5 P5 T5 v5, p6 P6 T6 v6,
    p7 P7 T7 v7, p8 P8 T8 v8, p9 P9 T9 v9, p10 P10 T10 v10
);
seq_impl!(
    p1 P1 T1 v1, p2 P2 T2 v2, p3 P3 T3 v3, p4 P4 T4 v4, p5 P5 T5 v5, p6 P6 T6 v6,
    p7 P7 T7 v7, p8 P8 T8 v8, p9 P9 T9 v9, p10 P10 T10 v10, p11 P11 T11 v11
);
seq_impl!(
    p1 P1 T1 v1, p2 P2 T2 v2, p3 P3 T3 v3, p4 P4 T4 v4, p5 P5 T5 v5, p6 P6 T6 v6,
    p7 P7 T7 v7, p8 P8 T8 v8, p9 P9 T9 v9, p10 P10 T10 v10, p11 P11 T11 v11,
    p12 P12 T12 v12
);

alt_impl!(p1 P1, p2 P2);
alt_impl!(p1 P1, p2 P2, p3 P3);
alt_impl!(p1 P1, p2 P2, p3 P3, p4 P4);
alt_impl!(p1 P1, p2 P2, p3 P3, p4 P4, p5 P5);
alt_impl!(p1 P1, p2 P2, p3 P3, p4 P4, p5 P5, p6 P6);
alt_impl!(p1 P1, p2 P2, p3 P3, p4 P4, p5 P5, p6 P6, p7 P7);
alt_impl!(p1 P1, p2 P2, p3 P3, p4 P4, p5 P5, p6 P6, p7 P7, p8 P8);
alt_impl!(p1 P1, p2 P2, p3 P3, p4 P4, p5 P5, p6 P6, p7 P7, p8 P8, p9 P9);
alt_impl!(p1 P1, p2 P2, p3 P3, p4 P4, p5 P5, p6 P6, p7 P7, p8 P8, p9 P9, p10 P10);
alt_impl!(p1 P1, p2 P2, p3 P3, p4 P4, p5 P5, p6 P6, p7 P7, p8 P8, p9 P9, p10 P10, p11 P11);
alt_impl!(
    p1 P1, p2 P2, p3 P3, p4 P4, p5 P5, p6 P6, p7 P7, p8 P8, p9 P9, p10 P10, p11 P11,
    p12 P12
);
alt_impl!(
    p1 P1, p2 P2, p3 P3, p4 P4, p5 P5, p6 P6, p7 P7, p8 P8, p9 P9, p10 P10, p11 P11,
    p12 P12, p13 P13
);
alt_impl!(
    p1 P1, p2 P2, p3 P3, p4 P4, p5 P5, p6 P6, p7 P7, p8 P8, p9 P9, p10 P10, p11 P11,
    p12 P12, p13 P13, p14 P14
);
alt_impl!(
    p1 P1, p2 P2, p3 P3, p4 P4, p5 P5, p6 P6, p7 P7, p8 P8, p9 P9, p10 P10, p11 P11,
    p12 P12, p13 P13, p14 P14, p15 P15
);
alt_impl!(
    p1 P1, p2 P2, p3 P3, p4 P4, p5 P5, p6 P6, p7 P7, p8 P8, p9 P9, p10 P10, p11 P11,
    p12 P12, p13 P13, p14 P14, p15 P15, p16 P16
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{Node, Terminal};
    use crate::terminal::{char_class, literal};
    use test_log::test;

    fn digit<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
        char_class(|c: char| c.is_ascii_digit()).parse(input)
    }

    #[test]
    fn test_seq() {
        let p = seq((literal("$top"), literal("="), digit));
        let out = p.parse(Input::new("$top=5&"));
        let (k, eq, d) = out.value().unwrap();
        assert_eq!((k.text(), eq.text(), d.text()), ("$top", "=", "5"));
        assert_eq!(out.remainder().rest(), "&");

        // backtracks to the start of the sequence, not to the failing element
        let inp = Input::new("$top=x");
        let out = p.parse(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);
        assert_eq!(out.furthest(), 5);
    }

    #[test]
    fn test_alt() {
        let p = alt((literal("a"), literal("ab"), digit));
        assert_eq!(p.parse(Input::new("ab")).remainder().rest(), "b");
        assert_eq!(p.parse(Input::new("7")).value().map(|t| t.text()), Some("7"));
        let inp = Input::new("x");
        assert_eq!(p.parse(inp).remainder(), inp);

        // deterministic
        let a = p.parse(Input::new("ab"));
        let b = p.parse(Input::new("ab"));
        assert_eq!(a.value(), b.value());
    }

    #[test]
    fn test_longest() {
        let p = longest((literal("a"), literal("ab"), literal("ab")));
        let out = p.parse(Input::new("abc"));
        assert_eq!(out.value().map(|t| t.text()), Some("ab"));
        assert_eq!(out.remainder().rest(), "c");

        // ties go to the earlier alternative
        let p = longest((
            literal("x").map(|t: Terminal| (1, t.source())),
            literal("x").map(|t: Terminal| (2, t.source())),
        ));
        assert_eq!(p.parse(Input::new("x")).value().map(|v| v.0), Some(1));

        let inp = Input::new("q");
        assert_eq!(p.parse(inp).remainder(), inp);
    }

    #[test]
    fn test_sep_by() {
        let p = sep_by(digit, literal(","));
        let out = p.parse(Input::new("1,2,3,x"));
        let list = out.value().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.items().map(|t| t.text()).collect::<Vec<_>>(), ["1", "2", "3"]);
        assert_eq!(list.source(), "1,2,3");
        assert_eq!(out.remainder().rest(), ",x");

        let inp = Input::new(",1");
        assert_eq!(p.parse(inp).remainder(), inp);
    }

    #[test]
    fn test_star_then() {
        // *( digit "," ) digit
        let p = star_then(seq((digit, literal(","))), digit);
        let out = p.parse(Input::new("1,2,3,x"));
        let (items, last) = out.value().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(last.text(), "3");
        assert_eq!(out.remainder().rest(), ",x");

        // a tail that also matches an item is given back
        let p = star_then(literal("a"), seq((literal("a"), literal("b"))));
        let out = p.parse(Input::new("aaab"));
        assert_eq!(out.value().map(|(items, _)| items.len()), Some(2));
        assert!(out.remainder().at_end());

        // the split reaching furthest wins over the one keeping more items
        let p = star_then(literal("a"), literal("ab").opt());
        let out = p.parse(Input::new("aab"));
        assert_eq!(out.value().map(|(items, _)| items.len()), Some(1));
        assert!(out.remainder().at_end());

        let inp = Input::new("aa");
        let p = star_then(literal("a"), literal("b"));
        assert_eq!(p.parse(inp).remainder(), inp);
    }

    #[test]
    fn test_followed_by() {
        let p = followed_by(literal("."));
        let inp = Input::new(".a");
        let out = p.parse(inp);
        assert!(out.is_success());
        assert_eq!(out.remainder(), inp);
        assert!(!p.parse(Input::new("a")).is_success());
    }

    #[test]
    fn test_when() {
        // the guard looks past what the parser itself reads
        let p = when(seq((literal("a"), literal("b"))), literal("a"));
        let out = p.parse(Input::new("abc"));
        assert_eq!(out.value().map(|t| t.text()), Some("a"));
        assert_eq!(out.remainder().rest(), "bc");
        assert_eq!(out.furthest(), 2);

        let inp = Input::new("ac");
        let out = p.parse(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);

        // a guard that matches does not rescue a failing parser
        let p = when(literal("a"), literal("ab"));
        assert!(!p.parse(Input::new("ac")).is_success());
    }
}
