//! Concrete syntax tree building blocks.
//!
//! Rule nodes take one of four shapes:
//!
//! * a [`Terminal`], for rules that are a literal or a set of literal strings;
//! * a struct with one field per component, for sequences (optional components are
//!   `Option`, anonymous groups are tuples);
//! * an enum with one variant per alternative, for alternations;
//! * a [`Repeated`] with the bounds in its type, for repetitions.
//!
//! Every node can write back the exact text it was parsed from.

use std::fmt::Debug;
use std::ops::Deref;

/// Upper bound for repetitions written as `*item` or `1*item`.
pub const UNBOUNDED: usize = usize::MAX;

/// Implemented by every node. Writing out the nodes of a successful parse in
/// order reproduces the consumed input byte for byte.
pub trait Node: Debug {
    fn write_source(&self, out: &mut String);

    fn source(&self) -> String {
        let mut s = String::new();
        self.write_source(&mut s);
        s
    }
}

/// A leaf: the exact text a literal or character class matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Terminal<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Terminal<'a> {
    pub(crate) fn new(text: &'a str, offset: usize) -> Self {
        Self { text, offset }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the match within the parsed text.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// ASCII case-insensitive comparison, the way double-quoted grammar literals match.
    pub fn is(&self, word: &str) -> bool {
        self.text.eq_ignore_ascii_case(word)
    }
}

impl<'a> Node for Terminal<'a> {
    fn write_source(&self, out: &mut String) {
        out.push_str(self.text);
    }
}

/// Between `MIN` and `MAX` items. Only [`Repeated::new`] builds one, so a value of
/// this type always respects its bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeated<T, const MIN: usize, const MAX: usize> {
    items: Vec<T>,
}

pub type Star<T> = Repeated<T, 0, UNBOUNDED>;
pub type Plus<T> = Repeated<T, 1, UNBOUNDED>;

impl<T, const MIN: usize, const MAX: usize> Repeated<T, MIN, MAX> {
    /// Hands the items back if there are too few or too many.
    pub fn new(items: Vec<T>) -> Result<Self, Vec<T>> {
        if items.len() >= MIN && items.len() <= MAX {
            Ok(Self { items })
        } else {
            Err(items)
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T, const MIN: usize, const MAX: usize> Deref for Repeated<T, MIN, MAX> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T, const MIN: usize, const MAX: usize> TryFrom<Vec<T>> for Repeated<T, MIN, MAX> {
    type Error = Vec<T>;

    fn try_from(items: Vec<T>) -> Result<Self, Vec<T>> {
        Self::new(items)
    }
}

impl<'r, T, const MIN: usize, const MAX: usize> IntoIterator for &'r Repeated<T, MIN, MAX> {
    type Item = &'r T;
    type IntoIter = std::slice::Iter<'r, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Node, const MIN: usize, const MAX: usize> Node for Repeated<T, MIN, MAX> {
    fn write_source(&self, out: &mut String) {
        self.items.iter().for_each(|n| n.write_source(out));
    }
}

/// `item *( sep item )`, the grammar's list shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimited<T, S> {
    pub first: T,
    pub rest: Star<(S, T)>,
}

impl<T, S> Delimited<T, S> {
    /// The items without their separators.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, t)| t))
    }

    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<T: Node, S: Node> Node for Delimited<T, S> {
    fn write_source(&self, out: &mut String) {
        self.first.write_source(out);
        self.rest.write_source(out);
    }
}

impl<T: Node + ?Sized> Node for Box<T> {
    fn write_source(&self, out: &mut String) {
        (**self).write_source(out);
    }
}

impl<T: Node> Node for Option<T> {
    fn write_source(&self, out: &mut String) {
        if let Some(n) = self {
            n.write_source(out);
        }
    }
}

impl<T: Node> Node for Vec<T> {
    fn write_source(&self, out: &mut String) {
        self.iter().for_each(|n| n.write_source(out));
    }
}

impl Node for () {
    fn write_source(&self, _out: &mut String) {}
}

macro_rules! tuple_node {
    ($($t:ident $v:ident),+) => {
        impl<$($t: Node),+> Node for ($($t,)+) {
            fn write_source(&self, out: &mut String) {
                let ($($v,)+) = self;
                $($v.write_source(out);)+
            }
        }
    };
}

tuple_node!(A a);
tuple_node!(A a, B b);
tuple_node!(A a, B b, C c);
tuple_node!(A a, B b, C c, D d);
tuple_node!(A a, B b, C c, D d, E e);
tuple_node!(A a, B b, C c, D d, E e, F f);
tuple_node!(A a, B b, C c, D d, E e, F f, G g);
tuple_node!(A a, B b, C c, D d, E e, F f, G g, H h);

/// Declares a sequence node: a struct whose fields are written back in order.
///
/// ```ignore
/// node! {
///     pub struct Top<'a> {
///         pub keyword: Terminal<'a>,
///         pub eq: Terminal<'a>,
///         pub digits: Plus<Terminal<'a>>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! node {
    (
        $(#[$meta:meta])*
        pub struct $name:ident<$lt:lifetime> {
            $($(#[$fmeta:meta])* pub $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name<$lt> {
            $($(#[$fmeta])* pub $field: $ty),*
        }

        impl<$lt> $crate::cst::Node for $name<$lt> {
            fn write_source(&self, out: &mut String) {
                $($crate::cst::Node::write_source(&self.$field, out);)*
            }
        }
    };
    (
        $(#[$meta:meta])*
        pub struct $name:ident<$lt:lifetime>(pub $ty:ty);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name<$lt>(pub $ty);

        impl<$lt> $crate::cst::Node for $name<$lt> {
            fn write_source(&self, out: &mut String) {
                $crate::cst::Node::write_source(&self.0, out);
            }
        }
    };
}

/// Declares an alternation node: an enum with one single-field variant per
/// alternative.
#[macro_export]
macro_rules! choice {
    (
        $(#[$meta:meta])*
        pub enum $name:ident<$lt:lifetime> {
            $($(#[$vmeta:meta])* $variant:ident($ty:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name<$lt> {
            $($(#[$vmeta])* $variant($ty)),+
        }

        impl<$lt> $crate::cst::Node for $name<$lt> {
            fn write_source(&self, out: &mut String) {
                match self {
                    $(Self::$variant(n) => $crate::cst::Node::write_source(n, out),)+
                }
            }
        }
    };
}

/// Declares a rule that is another rule under a new name (`a = b`): a one-field
/// wrapper node and its parser.
#[macro_export]
macro_rules! rename {
    ($(#[$meta:meta])* $name:ident, $func:ident, $abnf:literal, $inner:ident, $inner_func:path) => {
        $crate::node! {
            $(#[$meta])*
            pub struct $name<'a>(pub $inner<'a>);
        }

        pub fn $func<'a>(
            input: $crate::cursor::Input<'a>,
        ) -> $crate::output::Output<'a, $name<'a>> {
            $crate::rule::rule($abnf, input, |i| {
                $crate::parser::Parser::parse(&$crate::parser::Parser::map($inner_func, $name), i)
            })
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    node! {
        pub struct Pair<'a> {
            pub left: Terminal<'a>,
            pub sep: Option<Terminal<'a>>,
            pub right: Star<Terminal<'a>>,
        }
    }

    choice! {
        pub enum Either<'a> {
            One(Terminal<'a>),
            Two(Box<Pair<'a>>),
        }
    }

    fn t(text: &str, offset: usize) -> Terminal {
        Terminal::new(text, offset)
    }

    #[test]
    fn test_repeated_bounds() {
        assert!(Repeated::<u8, 1, 2>::new(vec![]).is_err());
        assert!(Repeated::<u8, 1, 2>::new(vec![1]).is_ok());
        assert!(Repeated::<u8, 1, 2>::new(vec![1, 2]).is_ok());
        assert_eq!(Repeated::<u8, 1, 2>::new(vec![1, 2, 3]), Err(vec![1, 2, 3]));
        let r: Plus<u8> = vec![4, 5].try_into().unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r[1], 5);
        assert_eq!(r.into_iter().count(), 2);
    }

    #[test]
    fn test_write_source() {
        let s = "a=bc";
        let pair = Pair {
            left: t(&s[0..1], 0),
            sep: Some(t(&s[1..2], 1)),
            right: Star::new(vec![t(&s[2..3], 2), t(&s[3..4], 3)]).unwrap(),
        };
        assert_eq!(pair.source(), s);

        let either = Either::Two(Box::new(Pair {
            sep: None,
            ..pair.clone()
        }));
        assert_eq!(either.source(), "abc");
        assert_eq!(Either::One(t("x", 0)).source(), "x");
        assert_eq!((t("a", 0), None::<Terminal>, t("b", 1)).source(), "ab");
    }

    #[test]
    fn test_terminal_is() {
        assert!(t("EQ", 0).is("eq"));
        assert!(!t("eq", 0).is("ne"));
    }
}
