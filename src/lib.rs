//! A lossless concrete syntax tree parser for OData V4.01 URIs.
//!
//! The grammar layer in [`grammar`] has one public parser function per rule of the
//! OData ABNF construction rules, each returning a node that mirrors the rule's
//! shape and remembers every character it matched. The rules are built from a
//! small set of parser combinators ([`parser`], [`combo`], [`terminal`]) over an
//! immutable cursor ([`Input`]).
//!
//! ```
//! use odata_cst::prelude::*;
//!
//! let out = odata_cst::grammar::top(Input::new("$top=5"));
//! assert!(out.remainder().at_end());
//! assert_eq!(out.value().unwrap().source(), "$top=5");
//! ```
#![allow(dead_code)]
#![warn(clippy::all)]
#![warn(clippy::correctness)]
#![warn(clippy::style)]
#![warn(clippy::complexity)]
#![warn(clippy::perf)]
#![allow(clippy::type_complexity)]

mod logging;
mod util;

pub mod combo;
pub mod config;
pub mod cst;
pub mod cursor;
pub mod error;
pub mod grammar;
pub mod output;
pub mod parser;
pub mod prelude;
pub mod registry;
pub mod rule;
pub mod terminal;

pub(crate) const LOG_TARGET: &str = "odata";

pub use crate::config::ParseOptions;
pub use crate::cst::{Node, Terminal};
pub use crate::cursor::Input;
pub use crate::error::ParseError;
pub use crate::grammar::{
    parse_complete, parse_odata_uri, parse_odata_uri_complete, parse_odata_uri_with,
};
pub use crate::output::Output;
pub use crate::parser::Parser;
