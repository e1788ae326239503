use std::fmt;

use crate::config::ParseOptions;
use crate::util;

/// An immutable position within the text being parsed.
///
/// Cursors are `Copy` and never mutate or copy the underlying text; moving forward
/// produces a new cursor. The offset is a byte offset that always lies on a
/// character boundary.
///
/// Two cursors are equal when they point into the same text at the same offset.
/// The nesting and stack budgets carried alongside are not part of a cursor's
/// identity.
#[derive(Clone, Copy)]
pub struct Input<'a> {
    text: &'a str,
    offset: usize,
    depth: u32,
    max_depth: u32,
    // stack address recorded by the outermost active rule, 0 outside any rule
    stack_base: usize,
    max_stack: usize,
}

impl<'a> Input<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::with_options(text, &ParseOptions::default())
    }

    pub fn with_options(text: &'a str, options: &ParseOptions) -> Self {
        Self {
            text,
            offset: 0,
            depth: 0,
            max_depth: options.max_depth,
            stack_base: 0,
            max_stack: options.max_stack,
        }
    }

    /// The full text, including what has already been consumed.
    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The unconsumed text.
    pub fn rest(&self) -> &'a str {
        &self.text[self.offset..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn at_end(&self) -> bool {
        self.offset == self.text.len()
    }

    /// Moves forward `n` characters, stopping at the end of the text.
    pub fn advance(self, n: usize) -> Self {
        let rest = self.rest();
        let bytes = rest
            .char_indices()
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.advance_bytes(bytes)
    }

    /// The text consumed between this cursor and a later one.
    pub fn span_to(&self, later: &Input<'a>) -> &'a str {
        let end = later.offset.max(self.offset).min(self.text.len());
        &self.text[self.offset..end]
    }

    /// Number of rule invocations active at this position.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Bytes of native stack grown between the outermost rule and `stack_pos`.
    pub(crate) fn stack_used(&self, stack_pos: usize) -> usize {
        if self.depth == 0 {
            0
        } else {
            self.stack_base.abs_diff(stack_pos)
        }
    }

    /// `n` must land on a character boundary within the unconsumed text.
    pub(crate) fn advance_bytes(self, n: usize) -> Self {
        debug_assert!(self.rest().is_char_boundary(n));
        Self {
            offset: self.offset + n,
            ..self
        }
    }

    /// Enters one level of nesting, or `None` if either budget is spent.
    ///
    /// `stack_pos` is the address of a local in the caller's frame. The first
    /// level entered records it as the base that later levels are measured from.
    pub(crate) fn descend(self, stack_pos: usize) -> Option<Self> {
        if self.depth >= self.max_depth || self.stack_used(stack_pos) > self.max_stack {
            return None;
        }
        let stack_base = if self.depth == 0 { stack_pos } else { self.stack_base };
        Some(Self {
            depth: self.depth + 1,
            stack_base,
            ..self
        })
    }

    /// Same position, with the nesting level of `outer`.
    pub(crate) fn ascend_to(self, outer: &Input<'a>) -> Self {
        Self {
            depth: outer.depth,
            stack_base: outer.stack_base,
            ..self
        }
    }
}

impl<'a> PartialEq for Input<'a> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.text, other.text) && self.offset == other.offset
    }
}

impl<'a> Eq for Input<'a> {}

impl<'a> From<&'a str> for Input<'a> {
    #[inline]
    fn from(s: &'a str) -> Self {
        Self::new(s)
    }
}

impl<'a> fmt::Debug for Input<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Input({offset}, {rest})",
            offset = self.offset,
            rest = util::formatter_str(self.rest()).trim_end()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_cursor() {
        let s = "Héllo World!";
        let c1 = Input::from(s);
        let c2: Input = s.into();
        assert_eq!(c1, c2);
        assert_eq!(c1.peek(), Some('H'));
        assert!(!c1.at_end());

        let c3 = c1.advance(2);
        assert_eq!(c3.rest(), "llo World!");
        assert_eq!(c3.offset(), 3);
        assert_eq!(c1.span_to(&c3), "Hé");
        assert_ne!(c1, c3);

        let end = c1.advance(100);
        assert!(end.at_end());
        assert_eq!(end.peek(), None);
        assert_eq!(end.rest(), "");
    }

    #[test]
    fn test_equality_ignores_budget() {
        let s = "abc";
        let c = Input::new(s);
        let inner = c.descend(0x8000).unwrap();
        assert_eq!(inner.depth(), 1);
        assert_eq!(c, inner);

        // same characters, different text
        let other = String::from("abc");
        assert_ne!(c, Input::new(&other));
    }

    #[test]
    fn test_descend() {
        let opts = ParseOptions::default().with_max_depth(2);
        let c = Input::with_options("x", &opts);
        let c1 = c.descend(0x8000).unwrap();
        let c2 = c1.descend(0x7f00).unwrap();
        assert!(c2.descend(0x7e00).is_none());
        assert_eq!(c2.advance(1).ascend_to(&c).depth(), 0);
    }

    #[test]
    fn test_descend_stack() {
        let opts = ParseOptions::default().with_max_stack(0x1000);
        let c = Input::with_options("x", &opts);
        assert_eq!(c.stack_used(0x1234), 0);

        let c1 = c.descend(0x9000).unwrap();
        assert_eq!(c1.stack_used(0x8800), 0x800);
        let c2 = c1.descend(0x8100).unwrap();
        assert!(c2.descend(0x7fff).is_none());

        // the base goes away with the outermost level
        let back = c2.ascend_to(&c);
        assert_eq!(back.stack_used(0x10), 0);
        assert!(back.descend(0x10).is_some());
    }
}
