//! The OData V4.01 ABNF construction rules.
//!
//! Each rule is a public function named after the rule (`keyPredicate` is
//! [`key_predicate`]) returning a node type named after it ([`KeyPredicate`]).
//! Rules that are plain renames of another rule, such as `entitySetName`, wrap
//! the inner node in a newtype so the tree still records which rule matched.
//!
//! The modules follow the sections of the grammar: [`resource`] for resource
//! paths, [`query`] for query options, [`context`] for context URL fragments,
//! [`expr`] for expressions, [`json`] for JSON in URIs, [`names`],
//! [`literals`] and [`geo`] for names and values, [`punctuation`] and [`uri`]
//! for the core and URI character rules.

use crate::prelude::*;

pub mod context;
pub mod expr;
pub mod geo;
pub mod json;
pub mod literals;
pub mod names;
pub mod punctuation;
pub mod query;
pub mod resource;
pub mod uri;

pub use context::*;
pub use expr::*;
pub use geo::*;
pub use json::*;
pub use literals::*;
pub use names::*;
pub use punctuation::*;
pub use query::*;
pub use resource::*;
pub use uri::*;

/// Parses a full OData URI. The result may leave input unconsumed; see
/// [`parse_odata_uri_complete`].
pub fn parse_odata_uri(uri: &str) -> Output<'_, OdataUri<'_>> {
    odata_uri(Input::new(uri))
}

pub fn parse_odata_uri_with<'a>(uri: &'a str, options: &ParseOptions) -> Output<'a, OdataUri<'a>> {
    odata_uri(Input::with_options(uri, options))
}

/// Runs `parser` over `text` and requires it to consume all of it.
///
/// ```
/// use odata_cst::{grammar, parse_complete, ParseError};
///
/// assert!(parse_complete(grammar::top, "$top=5").is_ok());
/// assert!(matches!(
///     parse_complete(grammar::top, "$top=5x"),
///     Err(ParseError::Incomplete { consumed: 6, .. })
/// ));
/// ```
pub fn parse_complete<'a, T>(parser: impl Parser<'a, T>, text: &'a str) -> Result<T, ParseError> {
    parser.parse(Input::new(text)).complete()
}

pub fn parse_odata_uri_complete(uri: &str) -> Result<OdataUri<'_>, ParseError> {
    parse_odata_uri(uri).complete()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};
    use test_log::test;

    const DEEP_STACK: usize = 64 << 20;

    // Runs `f` on a thread with room for deep trees in debug builds, with the
    // stack budget raised to match.
    fn on_deep_stack<T: Send>(f: impl FnOnce(&ParseOptions) -> T + Send) -> T {
        let opts = ParseOptions::default().with_max_stack(DEEP_STACK - (4 << 20));
        thread::scope(|s| {
            thread::Builder::new()
                .stack_size(DEEP_STACK)
                .spawn_scoped(s, || f(&opts))
                .unwrap()
                .join()
                .unwrap()
        })
    }

    #[test]
    fn test_top() {
        let out = top(Input::new("$top=5"));
        assert!(out.remainder().at_end());
        assert_eq!(out.value().unwrap().digits.source(), "5");
    }

    #[test]
    fn test_filter_eq() {
        let f = parse_complete(filter, "$filter=Name eq 'Bob'").unwrap();
        let expr = &f.expr.0;
        assert_eq!(expr.operand.source(), "Name");
        let Some(ComparisonExpr::Eq(eq)) = &expr.comparison else {
            panic!("expected eq");
        };
        assert_eq!(eq.operand.source(), "'Bob'");
    }

    #[test]
    fn test_entity_set_key() {
        let path = parse_complete(resource_path, "Employees('1')").unwrap();
        let ResourcePath::EntitySet((name, Some(nav))) = &path else {
            panic!("expected an entity set: {path:?}");
        };
        assert_eq!(name.source(), "Employees");
        assert_eq!(nav.source(), "('1')");
    }

    #[test]
    fn test_nested_expand() {
        let e = parse_complete(expand, "$expand=Orders($select=Id,Amount)").unwrap();
        let select = e
            .items
            .items()
            .flat_map(|item| item.options())
            .find_map(|o| match o {
                ExpandOption::Select(s) => Some(s),
                _ => None,
            })
            .unwrap();
        let names: Vec<_> = select.items.items().map(|i| i.source()).collect();
        assert_eq!(names, ["Id", "Amount"]);
    }

    #[test]
    fn test_empty_filter() {
        let inp = Input::new("$filter=");
        let out = filter(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);
        assert!(matches!(
            parse_complete(filter, "$filter="),
            Err(ParseError::NoMatch { .. })
        ));
    }

    #[test]
    fn test_truncated_geo() {
        assert!(parse_complete(primitive_literal, "geography'SRID=0;Point(1 2)").is_err());
        assert!(parse_complete(primitive_literal, "geo'").is_err());
    }

    #[test]
    fn test_odata_uris() {
        for uri in [
            "http://host/service/",
            "http://host/service/People",
            "http://host/service/People('russellwhyte')/Friends?$select=FirstName&$top=2",
            "https://host:8080/svc/Airports('KSFO')/Location/Address",
            "http://host/service/People?$filter=contains(FirstName,'Sc') and Age ge 18&$orderby=LastName desc",
            "http://host/service/People?$expand=Trips($filter=Budget gt 1000;$select=Name)",
            "http://host/service/$metadata#People",
            "http://host/service/$metadata?$format=json#People('x')/Emails",
            "http://host/service/$batch",
            "http://host/service/$entity?$id=People('x')&$format=json",
            "http://host/service/$crossjoin(Products,Sales)?$filter=Products/ID eq Sales/ProductID",
            "http://host/service/GetNearestAirport(lat=33,lon=-118)",
            "http://host/service/People('x')/NS.GetFavoriteAirline()",
            "http://host/service/Products?$search=blue OR green&$count=true",
        ] {
            let out = parse_odata_uri(uri);
            assert!(out.remainder().at_end(), "{uri}: stopped at {:?}", out.remainder());
            assert_eq!(out.value().unwrap().source(), uri);
        }
    }

    #[test]
    fn test_service_root_split() {
        let uri = parse_odata_uri_complete("http://host/svc/People/$count").unwrap();
        assert_eq!(uri.service_root.source(), "http://host/svc/");
        assert_eq!(uri.relative.unwrap().source(), "People/$count");
    }

    #[test]
    fn test_incomplete() {
        let err = parse_odata_uri_complete("http://host/svc/People?$top=x").unwrap_err();
        let ParseError::Incomplete { consumed, .. } = err else {
            panic!("expected incomplete: {err}");
        };
        assert_eq!(consumed, "http://host/svc/People".len());
    }

    #[test]
    fn test_depth_limit() {
        let nested = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        let text = format!("http://host/svc/People?$filter={nested} eq 1");
        assert!(parse_odata_uri(&text).remainder().at_end());

        let opts = ParseOptions::default().with_max_depth(32);
        let out = parse_odata_uri_with(&text, &opts);
        assert!(!out.remainder().at_end());
        assert_eq!(out.remainder().depth(), 0);
    }

    #[test]
    fn test_long_paths_parse_in_linear_time() {
        let path = vec!["Seg"; 30].join("/");
        let filter_text = format!("$filter={path} eq 1");
        let orderby_text = format!("$orderby={path} desc,{path}");
        let resource_text = format!("People('a')/{path}");
        let calls = format!("People('a'){}/Name", "/NS.F(a=1)".repeat(30));

        let started = Instant::now();
        on_deep_stack(|opts| {
            let f = filter(Input::with_options(&filter_text, opts)).complete().unwrap();
            assert_eq!(f.expr.0.operand.source(), path);
            assert!(orderby(Input::with_options(&orderby_text, opts)).complete().is_ok());
            for text in [&resource_text, &calls] {
                let out = resource_path(Input::with_options(text, opts));
                assert!(out.remainder().at_end(), "stopped at {}", out.remainder().offset());
            }
        });
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    }

    #[test]
    fn test_unclosed_parens_fail_fast() {
        let unclosed = format!("$filter={}1 eq 1", "(".repeat(30));
        let unclosed_list = format!("$filter={}1,2", "(".repeat(30));
        let closed = format!("$filter={}1 eq 1{}", "(".repeat(30), ")".repeat(30));

        let started = Instant::now();
        on_deep_stack(|opts| {
            for text in [&unclosed, &unclosed_list] {
                let out = filter(Input::with_options(text, opts));
                assert!(!out.is_success());
                assert_eq!(out.remainder().offset(), 0);
            }
            assert!(filter(Input::with_options(&closed, opts)).complete().is_ok());
        });
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    }

    #[test]
    fn test_nesting_stays_within_thread_stack() {
        let expand = format!("$expand={}A{}", "A($expand=".repeat(1000), ")".repeat(1000));
        let parens = format!("$filter={}1{} eq 1", "(".repeat(5000), ")".repeat(5000));
        let texts: Vec<String> = [expand, parens]
            .iter()
            .map(|query| format!("http://host/svc/People?{query}"))
            .collect();

        // default budgets, then the stack budget alone
        let unbounded_depth = ParseOptions::default().with_max_depth(u32::MAX);
        let results = thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(move || {
                let mut results = Vec::new();
                for text in &texts {
                    for opts in [ParseOptions::default(), unbounded_depth] {
                        let out = parse_odata_uri_with(text, &opts);
                        results.push((out.remainder().at_end(), out.remainder().depth()));
                    }
                }
                results
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(results, vec![(false, 0); 4]);
    }
}
