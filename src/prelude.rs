pub use crate::combo::{alt, followed_by, longest, sep_by, seq, star_then, when};
pub use crate::config::ParseOptions;
pub use crate::cst::{Delimited, Node, Plus, Repeated, Star, Terminal, UNBOUNDED};
pub use crate::cursor::Input;
pub use crate::error::ParseError;
pub use crate::output::Output;
pub use crate::parser::Parser;
pub use crate::rule::rule;
pub use crate::terminal::{char_class, char_range, keyword, keyword_ci, literal, literal_ci};
