//! JSON values inside URLs, as used for function parameters.

use crate::prelude::*;
use crate::{choice, node};

use super::expr::{root_expr, RootExpr};
use super::literals::one_to_nine;
use super::names::{
    complex_col_property, complex_property, entity_col_navigation_property,
    entity_navigation_property, namespace, primitive_col_property, primitive_property, term_name,
    ComplexColProperty, ComplexProperty, EntityColNavigationProperty, EntityNavigationProperty,
    Namespace, PrimitiveColProperty, PrimitiveProperty, TermName,
};
use super::punctuation::{at, bws, colon, comma, digit, dquote, hexdig, Bws};
use super::uri::{qchar_unescaped, UriChar};

choice! {
    pub enum ArrayOrObject<'a> {
        ComplexCol(ComplexColInUri<'a>),
        Complex(ComplexInUri<'a>),
        RootExprCol(RootExprCol<'a>),
        PrimitiveCol(PrimitiveColInUri<'a>),
    }
}

pub fn array_or_object<'a>(input: Input<'a>) -> Output<'a, ArrayOrObject<'a>> {
    rule("arrayOrObject", input, |i| {
        alt((
            complex_col_in_uri.map(ArrayOrObject::ComplexCol),
            complex_in_uri.map(ArrayOrObject::Complex),
            root_expr_col.map(ArrayOrObject::RootExprCol),
            primitive_col_in_uri.map(ArrayOrObject::PrimitiveCol),
        ))
        .parse(i)
    })
}

node! {
    pub struct ComplexColInUri<'a> {
        pub begin: BeginArray<'a>,
        pub items: Option<Delimited<ComplexInUri<'a>, ValueSeparator<'a>>>,
        pub end: EndArray<'a>,
    }
}

pub fn complex_col_in_uri<'a>(input: Input<'a>) -> Output<'a, ComplexColInUri<'a>> {
    rule("complexColInUri", input, |i| {
        seq((
            begin_array,
            sep_by(complex_in_uri, value_separator).opt(),
            end_array,
        ))
        .map(|(begin, items, end)| ComplexColInUri { begin, items, end })
        .parse(i)
    })
}

choice! {
    pub enum JsonMember<'a> {
        Annotation(Box<AnnotationInUri<'a>>),
        PrimitiveProperty(PrimitivePropertyInUri<'a>),
        ComplexProperty(Box<ComplexPropertyInUri<'a>>),
        CollectionProperty(Box<CollectionPropertyInUri<'a>>),
        NavigationProperty(Box<NavigationPropertyInUri<'a>>),
    }
}

fn json_member<'a>(input: Input<'a>) -> Output<'a, JsonMember<'a>> {
    alt((
        annotation_in_uri.map(|m| JsonMember::Annotation(Box::new(m))),
        primitive_property_in_uri.map(JsonMember::PrimitiveProperty),
        complex_property_in_uri.map(|m| JsonMember::ComplexProperty(Box::new(m))),
        collection_property_in_uri.map(|m| JsonMember::CollectionProperty(Box::new(m))),
        navigation_property_in_uri.map(|m| JsonMember::NavigationProperty(Box::new(m))),
    ))
    .parse(input)
}

node! {
    pub struct ComplexInUri<'a> {
        pub begin: BeginObject<'a>,
        pub members: Option<Delimited<JsonMember<'a>, ValueSeparator<'a>>>,
        pub end: EndObject<'a>,
    }
}

pub fn complex_in_uri<'a>(input: Input<'a>) -> Output<'a, ComplexInUri<'a>> {
    rule("complexInUri", input, |i| {
        seq((
            begin_object,
            sep_by(json_member, value_separator).opt(),
            end_object,
        ))
        .map(|(begin, members, end)| ComplexInUri {
            begin,
            members,
            end,
        })
        .parse(i)
    })
}

// `quotation-mark name quotation-mark name-separator value`
macro_rules! json_property {
    ($(#[$meta:meta])* $name:ident, $func:ident, $abnf:literal,
     $prop:ident, $prop_func:ident, $value:ident, $value_func:ident) => {
        node! {
            $(#[$meta])*
            pub struct $name<'a> {
                pub open_quote: Terminal<'a>,
                pub name: $prop<'a>,
                pub close_quote: Terminal<'a>,
                pub separator: NameSeparator<'a>,
                pub value: $value<'a>,
            }
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| {
                seq((quotation_mark, $prop_func, quotation_mark, name_separator, $value_func))
                    .map(|(open_quote, name, close_quote, separator, value)| $name {
                        open_quote,
                        name,
                        close_quote,
                        separator,
                        value,
                    })
                    .parse(i)
            })
        }
    };
}

json_property!(
    PrimitiveColPropertyInUri,
    primitive_col_property_in_uri,
    "collectionPropertyInUri",
    PrimitiveColProperty,
    primitive_col_property,
    PrimitiveColInUri,
    primitive_col_in_uri
);
json_property!(
    ComplexColPropertyInUri,
    complex_col_property_in_uri,
    "collectionPropertyInUri",
    ComplexColProperty,
    complex_col_property,
    ComplexColInUri,
    complex_col_in_uri
);
json_property!(
    ComplexPropertyInUri,
    complex_property_in_uri,
    "complexPropertyInUri",
    ComplexProperty,
    complex_property,
    ComplexInUri,
    complex_in_uri
);
json_property!(
    PrimitivePropertyInUri,
    primitive_property_in_uri,
    "primitivePropertyInUri",
    PrimitiveProperty,
    primitive_property,
    PrimitiveLiteralInJson,
    primitive_literal_in_json
);
json_property!(
    SingleNavPropInJson,
    single_nav_prop_in_json,
    "singleNavPropInJSON",
    EntityNavigationProperty,
    entity_navigation_property,
    RootExpr,
    root_expr
);
json_property!(
    CollectionNavPropInJson,
    collection_nav_prop_in_json,
    "collectionNavPropInJSON",
    EntityColNavigationProperty,
    entity_col_navigation_property,
    RootExprCol,
    root_expr_col
);

choice! {
    pub enum CollectionPropertyInUri<'a> {
        Primitive(PrimitiveColPropertyInUri<'a>),
        Complex(ComplexColPropertyInUri<'a>),
    }
}

pub fn collection_property_in_uri<'a>(input: Input<'a>) -> Output<'a, CollectionPropertyInUri<'a>> {
    rule("collectionPropertyInUri", input, |i| {
        alt((
            primitive_col_property_in_uri.map(CollectionPropertyInUri::Primitive),
            complex_col_property_in_uri.map(CollectionPropertyInUri::Complex),
        ))
        .parse(i)
    })
}

node! {
    pub struct PrimitiveColInUri<'a> {
        pub begin: BeginArray<'a>,
        pub items: Option<Delimited<PrimitiveLiteralInJson<'a>, ValueSeparator<'a>>>,
        pub end: EndArray<'a>,
    }
}

pub fn primitive_col_in_uri<'a>(input: Input<'a>) -> Output<'a, PrimitiveColInUri<'a>> {
    rule("primitiveColInUri", input, |i| {
        seq((
            begin_array,
            sep_by(primitive_literal_in_json, value_separator).opt(),
            end_array,
        ))
        .map(|(begin, items, end)| PrimitiveColInUri { begin, items, end })
        .parse(i)
    })
}

choice! {
    pub enum AnnotationValue<'a> {
        Complex(ComplexInUri<'a>),
        ComplexCol(ComplexColInUri<'a>),
        Primitive(PrimitiveLiteralInJson<'a>),
        PrimitiveCol(PrimitiveColInUri<'a>),
    }
}

node! {
    pub struct AnnotationInUri<'a> {
        pub open_quote: Terminal<'a>,
        pub at: Terminal<'a>,
        pub namespace: Namespace<'a>,
        pub dot: Terminal<'a>,
        pub term: TermName<'a>,
        pub close_quote: Terminal<'a>,
        pub separator: NameSeparator<'a>,
        pub value: AnnotationValue<'a>,
    }
}

pub fn annotation_in_uri<'a>(input: Input<'a>) -> Output<'a, AnnotationInUri<'a>> {
    rule("annotationInUri", input, |i| {
        seq((
            quotation_mark,
            at,
            namespace,
            literal("."),
            term_name,
            quotation_mark,
            name_separator,
            alt((
                complex_in_uri.map(AnnotationValue::Complex),
                complex_col_in_uri.map(AnnotationValue::ComplexCol),
                primitive_literal_in_json.map(AnnotationValue::Primitive),
                primitive_col_in_uri.map(AnnotationValue::PrimitiveCol),
            )),
        ))
        .map(
            |(open_quote, at, namespace, dot, term, close_quote, separator, value)| {
                AnnotationInUri {
                    open_quote,
                    at,
                    namespace,
                    dot,
                    term,
                    close_quote,
                    separator,
                    value,
                }
            },
        )
        .parse(i)
    })
}

choice! {
    pub enum NavigationPropertyInUri<'a> {
        Single(SingleNavPropInJson<'a>),
        Collection(CollectionNavPropInJson<'a>),
    }
}

pub fn navigation_property_in_uri<'a>(input: Input<'a>) -> Output<'a, NavigationPropertyInUri<'a>> {
    rule("navigationPropertyInUri", input, |i| {
        alt((
            single_nav_prop_in_json.map(NavigationPropertyInUri::Single),
            collection_nav_prop_in_json.map(NavigationPropertyInUri::Collection),
        ))
        .parse(i)
    })
}

node! {
    pub struct RootExprCol<'a> {
        pub begin: BeginArray<'a>,
        pub items: Option<Delimited<RootExpr<'a>, ValueSeparator<'a>>>,
        pub end: EndArray<'a>,
    }
}

pub fn root_expr_col<'a>(input: Input<'a>) -> Output<'a, RootExprCol<'a>> {
    rule("rootExprCol", input, |i| {
        seq((begin_array, sep_by(root_expr, value_separator).opt(), end_array))
            .map(|(begin, items, end)| RootExprCol { begin, items, end })
            .parse(i)
    })
}

// ---- JSON punctuation

node! {
    pub struct BeginObject<'a> {
        pub before: Bws<'a>,
        pub brace: Terminal<'a>,
        pub after: Bws<'a>,
    }
}

pub fn begin_object<'a>(input: Input<'a>) -> Output<'a, BeginObject<'a>> {
    rule("begin-object", input, |i| {
        seq((bws, keyword_ci(&["{", "%7B"]), bws))
            .map(|(before, brace, after)| BeginObject {
                before,
                brace,
                after,
            })
            .parse(i)
    })
}

node! {
    pub struct EndObject<'a> {
        pub before: Bws<'a>,
        pub brace: Terminal<'a>,
    }
}

pub fn end_object<'a>(input: Input<'a>) -> Output<'a, EndObject<'a>> {
    rule("end-object", input, |i| {
        seq((bws, keyword_ci(&["}", "%7D"])))
            .map(|(before, brace)| EndObject { before, brace })
            .parse(i)
    })
}

node! {
    pub struct BeginArray<'a> {
        pub before: Bws<'a>,
        pub bracket: Terminal<'a>,
        pub after: Bws<'a>,
    }
}

pub fn begin_array<'a>(input: Input<'a>) -> Output<'a, BeginArray<'a>> {
    rule("begin-array", input, |i| {
        seq((bws, keyword_ci(&["[", "%5B"]), bws))
            .map(|(before, bracket, after)| BeginArray {
                before,
                bracket,
                after,
            })
            .parse(i)
    })
}

node! {
    pub struct EndArray<'a> {
        pub before: Bws<'a>,
        pub bracket: Terminal<'a>,
    }
}

pub fn end_array<'a>(input: Input<'a>) -> Output<'a, EndArray<'a>> {
    rule("end-array", input, |i| {
        seq((bws, keyword_ci(&["]", "%5D"])))
            .map(|(before, bracket)| EndArray { before, bracket })
            .parse(i)
    })
}

pub fn quotation_mark<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("quotation-mark", input, |i| alt((dquote, literal("%22"))).parse(i))
}

node! {
    pub struct NameSeparator<'a> {
        pub before: Bws<'a>,
        pub colon: Terminal<'a>,
        pub after: Bws<'a>,
    }
}

pub fn name_separator<'a>(input: Input<'a>) -> Output<'a, NameSeparator<'a>> {
    rule("name-separator", input, |i| {
        seq((bws, colon, bws))
            .map(|(before, colon, after)| NameSeparator {
                before,
                colon,
                after,
            })
            .parse(i)
    })
}

node! {
    pub struct ValueSeparator<'a> {
        pub before: Bws<'a>,
        pub comma: Terminal<'a>,
        pub after: Bws<'a>,
    }
}

pub fn value_separator<'a>(input: Input<'a>) -> Output<'a, ValueSeparator<'a>> {
    rule("value-separator", input, |i| {
        seq((bws, comma, bws))
            .map(|(before, comma, after)| ValueSeparator {
                before,
                comma,
                after,
            })
            .parse(i)
    })
}

// ---- JSON primitives

choice! {
    pub enum PrimitiveLiteralInJson<'a> {
        String(StringInJson<'a>),
        Number(NumberInJson<'a>),
        /// `true`, `false` or `null`
        Keyword(Terminal<'a>),
    }
}

pub fn primitive_literal_in_json<'a>(input: Input<'a>) -> Output<'a, PrimitiveLiteralInJson<'a>> {
    rule("primitiveLiteralInJSON", input, |i| {
        alt((
            string_in_json.map(PrimitiveLiteralInJson::String),
            number_in_json.map(PrimitiveLiteralInJson::Number),
            keyword(&["true", "false", "null"]).map(PrimitiveLiteralInJson::Keyword),
        ))
        .parse(i)
    })
}

node! {
    pub struct StringInJson<'a> {
        pub open: Terminal<'a>,
        pub chars: Star<CharInJson<'a>>,
        pub close: Terminal<'a>,
    }
}

pub fn string_in_json<'a>(input: Input<'a>) -> Output<'a, StringInJson<'a>> {
    rule("stringInJSON", input, |i| {
        seq((quotation_mark, char_in_json.repeat::<0, UNBOUNDED>(), quotation_mark))
            .map(|(open, chars, close)| StringInJson { open, chars, close })
            .parse(i)
    })
}

choice! {
    pub enum EscapeSequence<'a> {
        Char(Terminal<'a>),
        Unicode((Terminal<'a>, Repeated<Terminal<'a>, 4, 4>)),
    }
}

node! {
    pub struct JsonEscape<'a> {
        pub escape: Terminal<'a>,
        pub sequence: EscapeSequence<'a>,
    }
}

choice! {
    pub enum CharInJson<'a> {
        Unescaped(UriChar<'a>),
        Special(Terminal<'a>),
        Escaped(JsonEscape<'a>),
    }
}

pub fn char_in_json<'a>(input: Input<'a>) -> Output<'a, CharInJson<'a>> {
    rule("charInJSON", input, |i| {
        alt((
            qchar_unescaped.map(CharInJson::Unescaped),
            qchar_json_special.map(CharInJson::Special),
            seq((
                escape,
                alt((
                    quotation_mark.map(EscapeSequence::Char),
                    escape.map(EscapeSequence::Char),
                    keyword_ci(&["/", "%2F"]).map(EscapeSequence::Char),
                    keyword(&["b", "f", "n", "r", "t"]).map(EscapeSequence::Char),
                    seq((literal("u"), hexdig.repeat::<4, 4>())).map(EscapeSequence::Unicode),
                )),
            ))
            .map(|(escape, sequence)| CharInJson::Escaped(JsonEscape { escape, sequence })),
        ))
        .parse(i)
    })
}

pub fn qchar_json_special<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("qchar-JSON-special", input, |i| {
        keyword(&[" ", ":", "{", "}", "[", "]"]).parse(i)
    })
}

pub fn escape<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("escape", input, |i| keyword_ci(&["\\", "%5C"]).parse(i))
}

node! {
    pub struct NumberInJson<'a> {
        pub minus: Option<Terminal<'a>>,
        pub int: Int<'a>,
        pub frac: Option<Frac<'a>>,
        pub exp: Option<Exp<'a>>,
    }
}

pub fn number_in_json<'a>(input: Input<'a>) -> Output<'a, NumberInJson<'a>> {
    rule("numberInJSON", input, |i| {
        seq((literal("-").opt(), int, frac.opt(), exp.opt()))
            .map(|(minus, int, frac, exp)| NumberInJson {
                minus,
                int,
                frac,
                exp,
            })
            .parse(i)
    })
}

choice! {
    pub enum Int<'a> {
        Zero(Terminal<'a>),
        NonZero((Terminal<'a>, Star<Terminal<'a>>)),
    }
}

pub fn int<'a>(input: Input<'a>) -> Output<'a, Int<'a>> {
    rule("int", input, |i| {
        alt((
            literal("0").map(Int::Zero),
            seq((one_to_nine, digit.repeat::<0, UNBOUNDED>())).map(Int::NonZero),
        ))
        .parse(i)
    })
}

node! {
    pub struct Frac<'a> {
        pub dot: Terminal<'a>,
        pub digits: Plus<Terminal<'a>>,
    }
}

pub fn frac<'a>(input: Input<'a>) -> Output<'a, Frac<'a>> {
    rule("frac", input, |i| {
        seq((literal("."), digit.repeat::<1, UNBOUNDED>()))
            .map(|(dot, digits)| Frac { dot, digits })
            .parse(i)
    })
}

node! {
    pub struct Exp<'a> {
        pub e: Terminal<'a>,
        pub sign: Option<Terminal<'a>>,
        pub digits: Plus<Terminal<'a>>,
    }
}

pub fn exp<'a>(input: Input<'a>) -> Output<'a, Exp<'a>> {
    rule("exp", input, |i| {
        seq((
            literal_ci("e"),
            keyword(&["-", "+"]).opt(),
            digit.repeat::<1, UNBOUNDED>(),
        ))
        .map(|(e, sign, digits)| Exp { e, sign, digits })
        .parse(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_array_or_object() {
        let out = array_or_object(Input::new("[1,\"two\", true ,null]"));
        assert!(matches!(out.value(), Some(ArrayOrObject::PrimitiveCol(_))));
        assert!(out.remainder().at_end());

        let s = r#"{"Street":"Main","Tags":["a"],"Geo":{"Lat":1.5},"@NS.Note":"x"}"#;
        let out = array_or_object(Input::new(s));
        let Some(ArrayOrObject::Complex(obj)) = out.value() else {
            panic!("expected an object: {:?}", out);
        };
        assert!(out.remainder().at_end());
        let members: Vec<_> = obj.members.as_ref().unwrap().items().collect();
        assert_eq!(members.len(), 4);
        assert!(matches!(members[0], JsonMember::PrimitiveProperty(_)));
        assert!(matches!(members[1], JsonMember::CollectionProperty(_)));
        assert!(matches!(members[2], JsonMember::ComplexProperty(_)));
        assert!(matches!(members[3], JsonMember::Annotation(_)));

        assert!(matches!(
            array_or_object(Input::new("[{}]")).value(),
            Some(ArrayOrObject::ComplexCol(_))
        ));
    }

    #[test]
    fn test_encoded_punctuation() {
        let out = complex_in_uri(Input::new("%7B%22A%22:1%7D"));
        assert!(out.remainder().at_end());
        assert!(primitive_col_in_uri(Input::new("%5B %5D")).remainder().at_end());
    }

    #[test]
    fn test_string_in_json() {
        let out = string_in_json(Input::new(r#""a\"b\n c""#));
        assert!(out.remainder().at_end());
        let chars = &out.value().unwrap().chars;
        assert!(matches!(chars[1], CharInJson::Escaped(_)));
        assert!(!string_in_json(Input::new(r#""a\x""#)).is_success());
    }

    #[test]
    fn test_number_in_json() {
        for s in ["0", "-0.5", "12e+3", "1E9"] {
            assert!(number_in_json(Input::new(s)).remainder().at_end(), "{s}");
        }
        // a leading zero ends the integer part
        assert_eq!(number_in_json(Input::new("012")).remainder().rest(), "12");
    }
}
