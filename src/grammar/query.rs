//! System and custom query options.

use crate::prelude::*;
use crate::{choice, node, rename};

use super::expr::{bool_common_expr, common_expr, BoolCommonExpr, CommonExpr};
use super::json::{array_or_object, quotation_mark, ArrayOrObject};
use super::literals::{boolean_value, one_to_nine};
use super::names::*;
use super::punctuation::{alpha, bws, close, comma, digit, eq, open, rws, semi, star, Bws, Rws};
use super::resource::{count, parameter_alias, parameter_name, r#ref, ParameterAlias, ParameterName};
use super::uri::{
    iri_in_query, other_delims, pct_encoded, qchar_no_amp, qchar_no_amp_dquote, qchar_no_amp_eq,
    qchar_no_amp_eq_at_dollar, unreserved, IriInQuery, UriChar,
};

node! {
    pub struct QueryOptions<'a>(pub Delimited<QueryOption<'a>, Terminal<'a>>);
}

pub fn query_options<'a>(input: Input<'a>) -> Output<'a, QueryOptions<'a>> {
    rule("queryOptions", input, |i| {
        sep_by(query_option, literal("&")).map(QueryOptions).parse(i)
    })
}

choice! {
    pub enum QueryOption<'a> {
        System(SystemQueryOption<'a>),
        AliasAndValue(AliasAndValue<'a>),
        NameAndValue(NameAndValue<'a>),
        Custom(CustomQueryOption<'a>),
    }
}

pub fn query_option<'a>(input: Input<'a>) -> Output<'a, QueryOption<'a>> {
    rule("queryOption", input, |i| {
        alt((
            system_query_option.map(QueryOption::System),
            alias_and_value.map(QueryOption::AliasAndValue),
            name_and_value.map(QueryOption::NameAndValue),
            custom_query_option.map(QueryOption::Custom),
        ))
        .parse(i)
    })
}

macro_rules! format_or_custom {
    ($list:ident, $list_func:ident, $list_abnf:literal, $item:ident, $item_func:ident, $item_abnf:literal) => {
        choice! {
            pub enum $item<'a> {
                Format(Format<'a>),
                Custom(CustomQueryOption<'a>),
            }
        }

        pub fn $item_func<'a>(input: Input<'a>) -> Output<'a, $item<'a>> {
            rule($item_abnf, input, |i| {
                alt((format.map($item::Format), custom_query_option.map($item::Custom))).parse(i)
            })
        }

        node! {
            pub struct $list<'a>(pub Delimited<$item<'a>, Terminal<'a>>);
        }

        pub fn $list_func<'a>(input: Input<'a>) -> Output<'a, $list<'a>> {
            rule($list_abnf, input, |i| {
                sep_by($item_func, literal("&")).map($list).parse(i)
            })
        }
    };
}

format_or_custom!(BatchOptions, batch_options, "batchOptions", BatchOption, batch_option, "batchOption");
format_or_custom!(
    MetadataOptions,
    metadata_options,
    "metadataOptions",
    MetadataOption,
    metadata_option,
    "metadataOption"
);

choice! {
    pub enum EntityIdOption<'a> {
        Format(Format<'a>),
        Custom(CustomQueryOption<'a>),
    }
}

pub fn entity_id_option<'a>(input: Input<'a>) -> Output<'a, EntityIdOption<'a>> {
    rule("entityIdOption", input, |i| {
        alt((
            format.map(EntityIdOption::Format),
            custom_query_option.map(EntityIdOption::Custom),
        ))
        .parse(i)
    })
}

node! {
    pub struct EntityOptions<'a> {
        pub before: Star<(EntityIdOption<'a>, Terminal<'a>)>,
        pub id: Id<'a>,
        pub after: Star<(Terminal<'a>, EntityIdOption<'a>)>,
    }
}

/// `id=...` also reads as a custom option, so options before the id are given
/// back until the id itself parses.
pub fn entity_options<'a>(input: Input<'a>) -> Output<'a, EntityOptions<'a>> {
    rule("entityOptions", input, |i| {
        star_then(
            seq((entity_id_option, literal("&"))),
            seq((
                id,
                seq((literal("&"), entity_id_option)).repeat::<0, UNBOUNDED>(),
            )),
        )
        .map(|(before, (id, after))| EntityOptions { before, id, after })
        .parse(i)
    })
}

choice! {
    pub enum EntityCastOption<'a> {
        Id(EntityIdOption<'a>),
        Expand(Expand<'a>),
        Select(Select<'a>),
    }
}

pub fn entity_cast_option<'a>(input: Input<'a>) -> Output<'a, EntityCastOption<'a>> {
    rule("entityCastOption", input, |i| {
        alt((
            entity_id_option.map(EntityCastOption::Id),
            expand.map(EntityCastOption::Expand),
            select.map(EntityCastOption::Select),
        ))
        .parse(i)
    })
}

node! {
    pub struct EntityCastOptions<'a> {
        pub before: Star<(EntityCastOption<'a>, Terminal<'a>)>,
        pub id: Id<'a>,
        pub after: Star<(Terminal<'a>, EntityCastOption<'a>)>,
    }
}

pub fn entity_cast_options<'a>(input: Input<'a>) -> Output<'a, EntityCastOptions<'a>> {
    rule("entityCastOptions", input, |i| {
        star_then(
            seq((entity_cast_option, literal("&"))),
            seq((
                id,
                seq((literal("&"), entity_cast_option)).repeat::<0, UNBOUNDED>(),
            )),
        )
        .map(|(before, (id, after))| EntityCastOptions { before, id, after })
        .parse(i)
    })
}

node! {
    pub struct Id<'a> {
        pub keyword: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub iri: IriInQuery<'a>,
    }
}

pub fn id<'a>(input: Input<'a>) -> Output<'a, Id<'a>> {
    rule("id", input, |i| {
        seq((keyword_ci(&["$id", "id"]), eq, iri_in_query))
            .map(|(keyword, eq, iri)| Id { keyword, eq, iri })
            .parse(i)
    })
}

choice! {
    pub enum SystemQueryOption<'a> {
        Compute(Compute<'a>),
        Deltatoken(Deltatoken<'a>),
        Expand(Expand<'a>),
        Filter(Filter<'a>),
        Format(Format<'a>),
        Id(Id<'a>),
        Inlinecount(Inlinecount<'a>),
        Orderby(Orderby<'a>),
        Schemaversion(Schemaversion<'a>),
        Search(Search<'a>),
        Select(Select<'a>),
        Skip(Skip<'a>),
        Skiptoken(Skiptoken<'a>),
        Top(Top<'a>),
        Index(Index<'a>),
    }
}

pub fn system_query_option<'a>(input: Input<'a>) -> Output<'a, SystemQueryOption<'a>> {
    use SystemQueryOption as S;
    rule("systemQueryOption", input, |i| {
        alt((
            compute.map(S::Compute),
            deltatoken.map(S::Deltatoken),
            expand.map(S::Expand),
            filter.map(S::Filter),
            format.map(S::Format),
            id.map(S::Id),
            inlinecount.map(S::Inlinecount),
            orderby.map(S::Orderby),
            schemaversion.map(S::Schemaversion),
            search.map(S::Search),
            select.map(S::Select),
            skip.map(S::Skip),
            skiptoken.map(S::Skiptoken),
            top.map(S::Top),
            index.map(S::Index),
        ))
        .parse(i)
    })
}

// ---- $compute

node! {
    pub struct Compute<'a> {
        pub keyword: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub items: Delimited<ComputeItem<'a>, Terminal<'a>>,
    }
}

pub fn compute<'a>(input: Input<'a>) -> Output<'a, Compute<'a>> {
    rule("compute", input, |i| {
        seq((
            keyword_ci(&["$compute", "compute"]),
            eq,
            sep_by(compute_item, comma),
        ))
        .map(|(keyword, eq, items)| Compute { keyword, eq, items })
        .parse(i)
    })
}

node! {
    pub struct ComputeItem<'a> {
        pub expr: CommonExpr<'a>,
        pub before: Rws<'a>,
        pub as_keyword: Terminal<'a>,
        pub after: Rws<'a>,
        pub property: ComputedProperty<'a>,
    }
}

pub fn compute_item<'a>(input: Input<'a>) -> Output<'a, ComputeItem<'a>> {
    rule("computeItem", input, |i| {
        seq((common_expr, rws, literal_ci("as"), rws, computed_property))
            .map(|(expr, before, as_keyword, after, property)| ComputeItem {
                expr,
                before,
                as_keyword,
                after,
                property,
            })
            .parse(i)
    })
}

rename!(
    ComputedProperty,
    computed_property,
    "computedProperty",
    OdataIdentifier,
    odata_identifier
);

// ---- $expand

node! {
    pub struct Expand<'a> {
        pub keyword: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub items: Delimited<ExpandItem<'a>, Terminal<'a>>,
    }
}

pub fn expand<'a>(input: Input<'a>) -> Output<'a, Expand<'a>> {
    rule("expand", input, |i| {
        seq((
            keyword_ci(&["$expand", "expand"]),
            eq,
            sep_by(expand_item, comma),
        ))
        .map(|(keyword, eq, items)| Expand { keyword, eq, items })
        .parse(i)
    })
}

choice! {
    pub enum StarOption<'a> {
        Ref(Terminal<'a>),
        Levels((Terminal<'a>, Levels<'a>, Terminal<'a>)),
    }
}

/// `OPEN option *( SEMI option ) CLOSE`
pub type OptionList<'a, T> = (Terminal<'a>, Delimited<T, Terminal<'a>>, Terminal<'a>);

choice! {
    pub enum ExpandPathOptions<'a> {
        Ref((Terminal<'a>, Option<OptionList<'a, ExpandRefOption<'a>>>)),
        Count((Terminal<'a>, Option<OptionList<'a, ExpandCountOption<'a>>>)),
        Options(OptionList<'a, ExpandOption<'a>>),
    }
}

choice! {
    pub enum ExpandItem<'a> {
        Star((Terminal<'a>, Option<StarOption<'a>>)),
        Value(Terminal<'a>),
        Path((ExpandPath<'a>, Option<ExpandPathOptions<'a>>)),
    }
}

impl<'a> ExpandItem<'a> {
    /// The options in parentheses after the path, if any.
    pub fn options(&self) -> impl Iterator<Item = &ExpandOption<'a>> {
        let list = match self {
            Self::Path((_, Some(ExpandPathOptions::Options((_, list, _))))) => Some(list),
            _ => None,
        };
        list.into_iter().flat_map(|l| l.items())
    }
}

pub fn expand_item<'a>(input: Input<'a>) -> Output<'a, ExpandItem<'a>> {
    use ExpandPathOptions as O;
    rule("expandItem", input, |i| {
        alt((
            seq((
                star,
                alt((
                    r#ref.map(StarOption::Ref),
                    seq((open, levels, close)).map(StarOption::Levels),
                ))
                .opt(),
            ))
            .map(ExpandItem::Star),
            literal("$value").map(ExpandItem::Value),
            seq((
                expand_path,
                alt((
                    seq((r#ref, seq((open, sep_by(expand_ref_option, semi), close)).opt()))
                        .map(O::Ref),
                    seq((count, seq((open, sep_by(expand_count_option, semi), close)).opt()))
                        .map(O::Count),
                    seq((open, sep_by(expand_option, semi), close)).map(O::Options),
                ))
                .opt(),
            ))
            .map(ExpandItem::Path),
        ))
        .parse(i)
    })
}

choice! {
    pub enum StructuredTypeName<'a> {
        Entity(QualifiedEntityTypeName<'a>),
        Complex(QualifiedComplexTypeName<'a>),
    }
}

fn structured_type_name<'a>(input: Input<'a>) -> Output<'a, StructuredTypeName<'a>> {
    alt((
        qualified_entity_type_name.map(StructuredTypeName::Entity),
        qualified_complex_type_name.map(StructuredTypeName::Complex),
    ))
    .parse(input)
}

choice! {
    pub enum StructuredProperty<'a> {
        Complex(ComplexProperty<'a>),
        ComplexCol(ComplexColProperty<'a>),
    }
}

fn structured_property<'a>(input: Input<'a>) -> Output<'a, StructuredProperty<'a>> {
    alt((
        complex_property.map(StructuredProperty::Complex),
        complex_col_property.map(StructuredProperty::ComplexCol),
    ))
    .parse(input)
}

node! {
    /// `( complexProperty / complexColProperty ) "/" [ qualifiedComplexTypeName "/" ]`
    pub struct ExpandPathSegment<'a> {
        pub property: StructuredProperty<'a>,
        pub slash: Terminal<'a>,
        pub type_cast: Option<(QualifiedComplexTypeName<'a>, Terminal<'a>)>,
    }
}

fn expand_path_segment<'a>(input: Input<'a>) -> Output<'a, ExpandPathSegment<'a>> {
    seq((
        structured_property,
        literal("/"),
        seq((qualified_complex_type_name, literal("/"))).opt(),
    ))
    .map(|(property, slash, type_cast)| ExpandPathSegment {
        property,
        slash,
        type_cast,
    })
    .parse(input)
}

choice! {
    pub enum ExpandTarget<'a> {
        Star(Terminal<'a>),
        Navigation((NavigationProperty<'a>, Option<(Terminal<'a>, QualifiedEntityTypeName<'a>)>)),
        Stream(StreamProperty<'a>),
    }
}

node! {
    pub struct ExpandPath<'a> {
        pub type_cast: Option<(StructuredTypeName<'a>, Terminal<'a>)>,
        pub segments: Star<ExpandPathSegment<'a>>,
        pub target: ExpandTarget<'a>,
    }
}

/// Leading complex segments are given back when the target cannot follow
/// them, as in `Orders/NS.LargeOrder`. A bare name is a navigation property
/// rather than a stream property.
pub fn expand_path<'a>(input: Input<'a>) -> Output<'a, ExpandPath<'a>> {
    rule("expandPath", input, |i| {
        seq((
            seq((structured_type_name, literal("/"))).opt(),
            star_then(
                expand_path_segment,
                alt((
                    star.map(ExpandTarget::Star),
                    seq((
                        navigation_property,
                        seq((literal("/"), qualified_entity_type_name)).opt(),
                    ))
                    .map(ExpandTarget::Navigation),
                    stream_property.map(ExpandTarget::Stream),
                )),
            ),
        ))
        .map(|(type_cast, (segments, target))| ExpandPath {
            type_cast,
            segments,
            target,
        })
        .parse(i)
    })
}

choice! {
    pub enum ExpandCountOption<'a> {
        Filter(Filter<'a>),
        Search(Search<'a>),
    }
}

pub fn expand_count_option<'a>(input: Input<'a>) -> Output<'a, ExpandCountOption<'a>> {
    rule("expandCountOption", input, |i| {
        alt((
            filter.map(ExpandCountOption::Filter),
            search.map(ExpandCountOption::Search),
        ))
        .parse(i)
    })
}

choice! {
    pub enum ExpandRefOption<'a> {
        Count(ExpandCountOption<'a>),
        Orderby(Orderby<'a>),
        Skip(Skip<'a>),
        Top(Top<'a>),
        Inlinecount(Inlinecount<'a>),
    }
}

pub fn expand_ref_option<'a>(input: Input<'a>) -> Output<'a, ExpandRefOption<'a>> {
    use ExpandRefOption as R;
    rule("expandRefOption", input, |i| {
        alt((
            expand_count_option.map(R::Count),
            orderby.map(R::Orderby),
            skip.map(R::Skip),
            top.map(R::Top),
            inlinecount.map(R::Inlinecount),
        ))
        .parse(i)
    })
}

choice! {
    pub enum ExpandOption<'a> {
        Ref(ExpandRefOption<'a>),
        Select(Box<Select<'a>>),
        Expand(Box<Expand<'a>>),
        Compute(Compute<'a>),
        Levels(Levels<'a>),
        AliasAndValue(AliasAndValue<'a>),
    }
}

pub fn expand_option<'a>(input: Input<'a>) -> Output<'a, ExpandOption<'a>> {
    use ExpandOption as E;
    rule("expandOption", input, |i| {
        alt((
            expand_ref_option.map(E::Ref),
            select.map(|s| E::Select(Box::new(s))),
            expand.map(|e| E::Expand(Box::new(e))),
            compute.map(E::Compute),
            levels.map(E::Levels),
            alias_and_value.map(E::AliasAndValue),
        ))
        .parse(i)
    })
}

choice! {
    pub enum LevelsValue<'a> {
        Count((Terminal<'a>, Star<Terminal<'a>>)),
        Max(Terminal<'a>),
    }
}

node! {
    pub struct Levels<'a> {
        pub keyword: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub value: LevelsValue<'a>,
    }
}

pub fn levels<'a>(input: Input<'a>) -> Output<'a, Levels<'a>> {
    rule("levels", input, |i| {
        seq((
            keyword_ci(&["$levels", "levels"]),
            eq,
            alt((
                seq((one_to_nine, digit.repeat::<0, UNBOUNDED>())).map(LevelsValue::Count),
                literal_ci("max").map(LevelsValue::Max),
            )),
        ))
        .map(|(keyword, eq, value)| Levels { keyword, eq, value })
        .parse(i)
    })
}

// ---- $filter, $orderby and paging

node! {
    pub struct Filter<'a> {
        pub keyword: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub expr: BoolCommonExpr<'a>,
    }
}

pub fn filter<'a>(input: Input<'a>) -> Output<'a, Filter<'a>> {
    rule("filter", input, |i| {
        seq((keyword_ci(&["$filter", "filter"]), eq, bool_common_expr))
            .map(|(keyword, eq, expr)| Filter { keyword, eq, expr })
            .parse(i)
    })
}

node! {
    pub struct Orderby<'a> {
        pub keyword: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub items: Delimited<OrderbyItem<'a>, Terminal<'a>>,
    }
}

pub fn orderby<'a>(input: Input<'a>) -> Output<'a, Orderby<'a>> {
    rule("orderby", input, |i| {
        seq((
            keyword_ci(&["$orderby", "orderby"]),
            eq,
            sep_by(orderby_item, comma),
        ))
        .map(|(keyword, eq, items)| Orderby { keyword, eq, items })
        .parse(i)
    })
}

node! {
    pub struct OrderbyItem<'a> {
        pub expr: CommonExpr<'a>,
        pub direction: Option<(Rws<'a>, Terminal<'a>)>,
    }
}

impl<'a> OrderbyItem<'a> {
    pub fn is_descending(&self) -> bool {
        self.direction.as_ref().map_or(false, |(_, d)| d.is("desc"))
    }
}

pub fn orderby_item<'a>(input: Input<'a>) -> Output<'a, OrderbyItem<'a>> {
    rule("orderbyItem", input, |i| {
        seq((common_expr, seq((rws, keyword_ci(&["asc", "desc"]))).opt()))
            .map(|(expr, direction)| OrderbyItem { expr, direction })
            .parse(i)
    })
}

macro_rules! digits_option {
    ($name:ident, $func:ident, $abnf:literal, $keywords:expr) => {
        node! {
            pub struct $name<'a> {
                pub keyword: Terminal<'a>,
                pub eq: Terminal<'a>,
                pub digits: Plus<Terminal<'a>>,
            }
        }

        impl<'a> $name<'a> {
            /// The value, or `None` if it does not fit a `u64`.
            pub fn value(&self) -> Option<u64> {
                self.digits.source().parse().ok()
            }
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| {
                seq((keyword_ci($keywords), eq, digit.repeat::<1, UNBOUNDED>()))
                    .map(|(keyword, eq, digits)| $name { keyword, eq, digits })
                    .parse(i)
            })
        }
    };
}

digits_option!(Skip, skip, "skip", &["$skip", "skip"]);
digits_option!(Top, top, "top", &["$top", "top"]);
digits_option!(Index, index, "index", &["$index", "index"]);

choice! {
    pub enum FormatValue<'a> {
        Named(Terminal<'a>),
        MediaType((Plus<UriChar<'a>>, Terminal<'a>, Plus<UriChar<'a>>)),
    }
}

node! {
    pub struct Format<'a> {
        pub keyword: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub value: FormatValue<'a>,
    }
}

// a path character other than "&", which separates query options
fn media_type_char<'a>(input: Input<'a>) -> Output<'a, UriChar<'a>> {
    alt((
        unreserved.map(UriChar::Plain),
        pct_encoded.map(UriChar::Encoded),
        other_delims.map(UriChar::Plain),
        keyword(&["$", "'", "=", ":", "@"]).map(UriChar::Plain),
    ))
    .parse(input)
}

pub fn format<'a>(input: Input<'a>) -> Output<'a, Format<'a>> {
    rule("format", input, |i| {
        seq((
            keyword_ci(&["$format", "format"]),
            eq,
            longest((
                keyword_ci(&["atom", "json", "xml"]).map(FormatValue::Named),
                seq((
                    media_type_char.repeat::<1, UNBOUNDED>(),
                    literal("/"),
                    media_type_char.repeat::<1, UNBOUNDED>(),
                ))
                .map(FormatValue::MediaType),
            )),
        ))
        .map(|(keyword, eq, value)| Format { keyword, eq, value })
        .parse(i)
    })
}

node! {
    pub struct Inlinecount<'a> {
        pub keyword: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub value: Terminal<'a>,
    }
}

pub fn inlinecount<'a>(input: Input<'a>) -> Output<'a, Inlinecount<'a>> {
    rule("inlinecount", input, |i| {
        seq((keyword_ci(&["$count", "count"]), eq, boolean_value))
            .map(|(keyword, eq, value)| Inlinecount { keyword, eq, value })
            .parse(i)
    })
}

choice! {
    pub enum SchemaversionValue<'a> {
        Star(Terminal<'a>),
        Version(Plus<Terminal<'a>>),
    }
}

node! {
    pub struct Schemaversion<'a> {
        pub keyword: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub value: SchemaversionValue<'a>,
    }
}

pub fn schemaversion<'a>(input: Input<'a>) -> Output<'a, Schemaversion<'a>> {
    rule("schemaversion", input, |i| {
        seq((
            keyword_ci(&["$schemaversion", "schemaversion"]),
            eq,
            alt((
                star.map(SchemaversionValue::Star),
                unreserved
                    .repeat::<1, UNBOUNDED>()
                    .map(SchemaversionValue::Version),
            )),
        ))
        .map(|(keyword, eq, value)| Schemaversion { keyword, eq, value })
        .parse(i)
    })
}

// ---- $search

node! {
    pub struct Search<'a> {
        pub keyword: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub bws: Bws<'a>,
        pub expr: SearchExpr<'a>,
    }
}

pub fn search<'a>(input: Input<'a>) -> Output<'a, Search<'a>> {
    rule("search", input, |i| {
        seq((keyword_ci(&["$search", "search"]), eq, bws, search_expr))
            .map(|(keyword, eq, bws, expr)| Search {
                keyword,
                eq,
                bws,
                expr,
            })
            .parse(i)
    })
}

node! {
    pub struct SearchParenExpr<'a> {
        pub open: Terminal<'a>,
        pub bws1: Bws<'a>,
        pub expr: SearchExpr<'a>,
        pub bws2: Bws<'a>,
        pub close: Terminal<'a>,
    }
}

choice! {
    pub enum SearchOperand<'a> {
        Paren(Box<SearchParenExpr<'a>>),
        Term(SearchTerm<'a>),
    }
}

choice! {
    pub enum SearchTail<'a> {
        Or(SearchOrExpr<'a>),
        And(SearchAndExpr<'a>),
    }
}

node! {
    pub struct SearchExpr<'a> {
        pub operand: SearchOperand<'a>,
        pub tail: Option<SearchTail<'a>>,
    }
}

pub fn search_expr<'a>(input: Input<'a>) -> Output<'a, SearchExpr<'a>> {
    rule("searchExpr", input, |i| {
        seq((
            alt((
                seq((open, bws, search_expr, bws, close)).map(|(open, bws1, expr, bws2, close)| {
                    SearchOperand::Paren(Box::new(SearchParenExpr {
                        open,
                        bws1,
                        expr,
                        bws2,
                        close,
                    }))
                }),
                search_term.map(SearchOperand::Term),
            )),
            alt((
                search_or_expr.map(SearchTail::Or),
                search_and_expr.map(SearchTail::And),
            ))
            .opt(),
        ))
        .map(|(operand, tail)| SearchExpr { operand, tail })
        .parse(i)
    })
}

node! {
    pub struct SearchOrExpr<'a> {
        pub before: Rws<'a>,
        pub or: Terminal<'a>,
        pub after: Rws<'a>,
        pub expr: Box<SearchExpr<'a>>,
    }
}

pub fn search_or_expr<'a>(input: Input<'a>) -> Output<'a, SearchOrExpr<'a>> {
    rule("searchOrExpr", input, |i| {
        seq((rws, literal("OR"), rws, search_expr))
            .map(|(before, or, after, expr)| SearchOrExpr {
                before,
                or,
                after,
                expr: Box::new(expr),
            })
            .parse(i)
    })
}

node! {
    pub struct SearchAndExpr<'a> {
        pub before: Rws<'a>,
        pub and: Option<(Terminal<'a>, Rws<'a>)>,
        pub expr: Box<SearchExpr<'a>>,
    }
}

pub fn search_and_expr<'a>(input: Input<'a>) -> Output<'a, SearchAndExpr<'a>> {
    rule("searchAndExpr", input, |i| {
        seq((rws, seq((literal("AND"), rws)).opt(), search_expr))
            .map(|(before, and, expr)| SearchAndExpr {
                before,
                and,
                expr: Box::new(expr),
            })
            .parse(i)
    })
}

choice! {
    pub enum SearchTermValue<'a> {
        Phrase(SearchPhrase<'a>),
        Word(SearchWord<'a>),
    }
}

node! {
    pub struct SearchTerm<'a> {
        pub not: Option<(Terminal<'a>, Rws<'a>)>,
        pub term: SearchTermValue<'a>,
    }
}

pub fn search_term<'a>(input: Input<'a>) -> Output<'a, SearchTerm<'a>> {
    rule("searchTerm", input, |i| {
        seq((
            seq((literal("NOT"), rws)).opt(),
            alt((
                search_phrase.map(SearchTermValue::Phrase),
                search_word.map(SearchTermValue::Word),
            )),
        ))
        .map(|(not, term)| SearchTerm { not, term })
        .parse(i)
    })
}

node! {
    pub struct SearchPhrase<'a> {
        pub open: Terminal<'a>,
        pub chars: Plus<UriChar<'a>>,
        pub close: Terminal<'a>,
    }
}

pub fn search_phrase<'a>(input: Input<'a>) -> Output<'a, SearchPhrase<'a>> {
    rule("searchPhrase", input, |i| {
        seq((
            quotation_mark,
            qchar_no_amp_dquote.repeat::<1, UNBOUNDED>(),
            quotation_mark,
        ))
        .map(|(open, chars, close)| SearchPhrase { open, chars, close })
        .parse(i)
    })
}

node! {
    pub struct SearchWord<'a>(pub Plus<UriChar<'a>>);
}

pub fn search_word<'a>(input: Input<'a>) -> Output<'a, SearchWord<'a>> {
    rule("searchWord", input, |i| {
        alt((
            alpha.map(UriChar::Plain),
            digit.map(UriChar::Plain),
            comma.map(UriChar::Plain),
            literal(".").map(UriChar::Plain),
            pct_encoded.map(UriChar::Encoded),
        ))
        .repeat::<1, UNBOUNDED>()
        .map(SearchWord)
        .parse(i)
    })
}

// ---- $select

node! {
    pub struct Select<'a> {
        pub keyword: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub items: Delimited<SelectItem<'a>, Terminal<'a>>,
    }
}

pub fn select<'a>(input: Input<'a>) -> Output<'a, Select<'a>> {
    rule("select", input, |i| {
        seq((
            keyword_ci(&["$select", "select"]),
            eq,
            sep_by(select_item, comma),
        ))
        .map(|(keyword, eq, items)| Select { keyword, eq, items })
        .parse(i)
    })
}

choice! {
    pub enum SelectMember<'a> {
        Property(SelectProperty<'a>),
        Action(QualifiedActionName<'a>),
        Function(QualifiedFunctionName<'a>),
    }
}

choice! {
    pub enum SelectItem<'a> {
        Star(Terminal<'a>),
        AllOperations(AllOperationsInSchema<'a>),
        Member((Option<(StructuredTypeName<'a>, Terminal<'a>)>, SelectMember<'a>)),
    }
}

pub fn select_item<'a>(input: Input<'a>) -> Output<'a, SelectItem<'a>> {
    rule("selectItem", input, |i| {
        alt((
            star.map(SelectItem::Star),
            all_operations_in_schema.map(SelectItem::AllOperations),
            seq((
                seq((structured_type_name, literal("/"))).opt(),
                longest((
                    select_property.map(SelectMember::Property),
                    qualified_action_name.map(SelectMember::Action),
                    qualified_function_name.map(SelectMember::Function),
                )),
            ))
            .map(SelectItem::Member),
        ))
        .parse(i)
    })
}

choice! {
    pub enum SelectPathTail<'a> {
        Options(OptionList<'a, SelectOption<'a>>),
        Property((Terminal<'a>, Box<SelectProperty<'a>>)),
    }
}

choice! {
    pub enum SelectProperty<'a> {
        Primitive(PrimitiveProperty<'a>),
        PrimitiveCol((PrimitiveColProperty<'a>, Option<OptionList<'a, SelectOptionPc<'a>>>)),
        Navigation(NavigationProperty<'a>),
        Path((SelectPath<'a>, Option<SelectPathTail<'a>>)),
    }
}

pub fn select_property<'a>(input: Input<'a>) -> Output<'a, SelectProperty<'a>> {
    use SelectProperty as P;
    rule("selectProperty", input, |i| {
        longest((
            primitive_property.map(P::Primitive),
            seq((
                primitive_col_property,
                seq((open, sep_by(select_option_pc, semi), close)).opt(),
            ))
            .map(P::PrimitiveCol),
            navigation_property.map(P::Navigation),
            seq((
                select_path,
                alt((
                    seq((open, sep_by(select_option, semi), close)).map(SelectPathTail::Options),
                    seq((literal("/"), select_property.map(Box::new)))
                        .map(SelectPathTail::Property),
                ))
                .opt(),
            ))
            .map(P::Path),
        ))
        .parse(i)
    })
}

node! {
    pub struct SelectPath<'a> {
        pub property: StructuredProperty<'a>,
        pub type_cast: Option<(Terminal<'a>, QualifiedComplexTypeName<'a>)>,
    }
}

pub fn select_path<'a>(input: Input<'a>) -> Output<'a, SelectPath<'a>> {
    rule("selectPath", input, |i| {
        seq((
            structured_property,
            seq((literal("/"), qualified_complex_type_name)).opt(),
        ))
        .map(|(property, type_cast)| SelectPath {
            property,
            type_cast,
        })
        .parse(i)
    })
}

choice! {
    pub enum SelectOptionPc<'a> {
        Filter(Filter<'a>),
        Search(Search<'a>),
        Inlinecount(Inlinecount<'a>),
        Orderby(Orderby<'a>),
        Skip(Skip<'a>),
        Top(Top<'a>),
    }
}

pub fn select_option_pc<'a>(input: Input<'a>) -> Output<'a, SelectOptionPc<'a>> {
    use SelectOptionPc as S;
    rule("selectOptionPC", input, |i| {
        alt((
            filter.map(S::Filter),
            search.map(S::Search),
            inlinecount.map(S::Inlinecount),
            orderby.map(S::Orderby),
            skip.map(S::Skip),
            top.map(S::Top),
        ))
        .parse(i)
    })
}

choice! {
    pub enum SelectOption<'a> {
        Pc(SelectOptionPc<'a>),
        Compute(Compute<'a>),
        Select(Box<Select<'a>>),
        Expand(Box<Expand<'a>>),
        AliasAndValue(AliasAndValue<'a>),
    }
}

pub fn select_option<'a>(input: Input<'a>) -> Output<'a, SelectOption<'a>> {
    use SelectOption as S;
    rule("selectOption", input, |i| {
        alt((
            select_option_pc.map(S::Pc),
            compute.map(S::Compute),
            select.map(|s| S::Select(Box::new(s))),
            expand.map(|e| S::Expand(Box::new(e))),
            alias_and_value.map(S::AliasAndValue),
        ))
        .parse(i)
    })
}

node! {
    pub struct AllOperationsInSchema<'a> {
        pub namespace: Namespace<'a>,
        pub dot: Terminal<'a>,
        pub star: Terminal<'a>,
    }
}

pub fn all_operations_in_schema<'a>(input: Input<'a>) -> Output<'a, AllOperationsInSchema<'a>> {
    rule("allOperationsInSchema", input, |i| {
        seq((namespace, literal("."), star))
            .map(|(namespace, dot, star)| AllOperationsInSchema {
                namespace,
                dot,
                star,
            })
            .parse(i)
    })
}

node! {
    pub struct QualifiedFunctionName<'a> {
        pub namespace: Namespace<'a>,
        pub dot: Terminal<'a>,
        pub function: Function<'a>,
        pub parameters: Option<(Terminal<'a>, ParameterNames<'a>, Terminal<'a>)>,
    }
}

pub fn qualified_function_name<'a>(input: Input<'a>) -> Output<'a, QualifiedFunctionName<'a>> {
    rule("qualifiedFunctionName", input, |i| {
        seq((
            namespace,
            literal("."),
            function,
            seq((open, parameter_names, close)).opt(),
        ))
        .map(|(namespace, dot, function, parameters)| QualifiedFunctionName {
            namespace,
            dot,
            function,
            parameters,
        })
        .parse(i)
    })
}

node! {
    pub struct ParameterNames<'a>(pub Delimited<ParameterName<'a>, Terminal<'a>>);
}

pub fn parameter_names<'a>(input: Input<'a>) -> Output<'a, ParameterNames<'a>> {
    rule("parameterNames", input, |i| {
        sep_by(parameter_name, comma).map(ParameterNames).parse(i)
    })
}

// ---- tokens, aliases and custom options

macro_rules! token_option {
    ($name:ident, $func:ident, $abnf:literal, $keyword:literal) => {
        node! {
            pub struct $name<'a> {
                pub keyword: Terminal<'a>,
                pub eq: Terminal<'a>,
                pub token: Plus<UriChar<'a>>,
            }
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| {
                seq((literal_ci($keyword), eq, qchar_no_amp.repeat::<1, UNBOUNDED>()))
                    .map(|(keyword, eq, token)| $name { keyword, eq, token })
                    .parse(i)
            })
        }
    };
}

token_option!(Deltatoken, deltatoken, "deltatoken", "$deltatoken");
token_option!(Skiptoken, skiptoken, "skiptoken", "$skiptoken");

node! {
    pub struct AliasAndValue<'a> {
        pub alias: ParameterAlias<'a>,
        pub eq: Terminal<'a>,
        pub value: ParameterValue<'a>,
    }
}

pub fn alias_and_value<'a>(input: Input<'a>) -> Output<'a, AliasAndValue<'a>> {
    rule("aliasAndValue", input, |i| {
        seq((parameter_alias, eq, parameter_value))
            .map(|(alias, eq, value)| AliasAndValue { alias, eq, value })
            .parse(i)
    })
}

node! {
    pub struct NameAndValue<'a> {
        pub name: ParameterName<'a>,
        pub eq: Terminal<'a>,
        pub value: ParameterValue<'a>,
    }
}

pub fn name_and_value<'a>(input: Input<'a>) -> Output<'a, NameAndValue<'a>> {
    rule("nameAndValue", input, |i| {
        seq((parameter_name, eq, parameter_value))
            .map(|(name, eq, value)| NameAndValue { name, eq, value })
            .parse(i)
    })
}

choice! {
    pub enum ParameterValue<'a> {
        ArrayOrObject(ArrayOrObject<'a>),
        Expr(CommonExpr<'a>),
    }
}

pub fn parameter_value<'a>(input: Input<'a>) -> Output<'a, ParameterValue<'a>> {
    rule("parameterValue", input, |i| {
        alt((
            array_or_object.map(ParameterValue::ArrayOrObject),
            common_expr.map(ParameterValue::Expr),
        ))
        .parse(i)
    })
}

node! {
    pub struct CustomQueryOption<'a> {
        pub name: CustomName<'a>,
        pub value: Option<(Terminal<'a>, CustomValue<'a>)>,
    }
}

pub fn custom_query_option<'a>(input: Input<'a>) -> Output<'a, CustomQueryOption<'a>> {
    rule("customQueryOption", input, |i| {
        seq((custom_name, seq((eq, custom_value)).opt()))
            .map(|(name, value)| CustomQueryOption { name, value })
            .parse(i)
    })
}

node! {
    pub struct CustomName<'a> {
        pub first: UriChar<'a>,
        pub rest: Star<UriChar<'a>>,
    }
}

pub fn custom_name<'a>(input: Input<'a>) -> Output<'a, CustomName<'a>> {
    rule("customName", input, |i| {
        seq((
            qchar_no_amp_eq_at_dollar,
            qchar_no_amp_eq.repeat::<0, UNBOUNDED>(),
        ))
        .map(|(first, rest)| CustomName { first, rest })
        .parse(i)
    })
}

node! {
    pub struct CustomValue<'a>(pub Star<UriChar<'a>>);
}

pub fn custom_value<'a>(input: Input<'a>) -> Output<'a, CustomValue<'a>> {
    rule("customValue", input, |i| {
        qchar_no_amp
            .repeat::<0, UNBOUNDED>()
            .map(CustomValue)
            .parse(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::expr::{ComparisonExpr, Operand};
    use crate::grammar::literals::PrimitiveLiteral;
    use test_log::test;

    fn options(s: &str) -> Vec<QueryOption> {
        let out = query_options(Input::new(s));
        assert!(out.remainder().at_end(), "{s}: stopped at {:?}", out.remainder());
        out.into_value().unwrap().0.items().cloned().collect()
    }

    #[test]
    fn test_top() {
        let out = top(Input::new("$top=5"));
        assert!(out.remainder().at_end());
        let top = out.value().unwrap();
        assert_eq!(top.digits.source(), "5");
        assert_eq!(top.value(), Some(5));

        let opts = options("$top=5");
        assert!(matches!(opts.as_slice(), [QueryOption::System(SystemQueryOption::Top(_))]));
    }

    #[test]
    fn test_filter() {
        let out = filter(Input::new("$filter=Name eq 'Bob'"));
        assert!(out.remainder().at_end());
        let expr = &out.value().unwrap().expr.0;
        assert!(matches!(&expr.operand, Operand::FirstMember(m) if m.source() == "Name"));
        let Some(ComparisonExpr::Eq(eq)) = &expr.comparison else {
            panic!("expected eq: {:?}", expr.comparison);
        };
        let Operand::Literal(lit) = &eq.operand.operand else {
            panic!("expected a literal");
        };
        let PrimitiveLiteral::String(s) = &**lit else {
            panic!("expected a string: {lit:?}");
        };
        assert_eq!(s.source(), "'Bob'");
    }

    #[test]
    fn test_empty_filter_fails() {
        let inp = Input::new("$filter=");
        let out = filter(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);

        let out = query_options(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);
    }

    #[test]
    fn test_expand_select() {
        let out = expand(Input::new("$expand=Orders($select=Id,Amount)"));
        assert!(out.remainder().at_end());
        let expand = out.value().unwrap();
        assert_eq!(expand.items.len(), 1);
        let item = expand.items.items().next().unwrap();
        let ExpandItem::Path((path, _)) = item else {
            panic!("expected a path: {item:?}");
        };
        assert_eq!(path.source(), "Orders");
        let opts: Vec<_> = item.options().collect();
        assert_eq!(opts.len(), 1);
        let ExpandOption::Select(select) = opts[0] else {
            panic!("expected a select: {:?}", opts[0]);
        };
        let names: Vec<_> = select.items.items().map(|s| s.source()).collect();
        assert_eq!(names, ["Id", "Amount"]);
    }

    #[test]
    fn test_expand_forms() {
        for s in [
            "$expand=*",
            "$expand=*/$ref",
            "$expand=*($levels=2)",
            "$expand=Friends/$ref,Trips/$count($filter=Cost gt 10)",
            "$expand=Friends($levels=max;$expand=Trips($top=1))",
            "$expand=Address/Country",
        ] {
            let out = expand(Input::new(s));
            assert!(out.remainder().at_end(), "{s}: stopped at {:?}", out.remainder());
        }

        let out = expand_path(Input::new("Orders/NS.LargeOrder"));
        assert!(out.remainder().at_end());
        let path = out.value().unwrap();
        assert!(path.segments.is_empty());
        assert!(matches!(path.target, ExpandTarget::Navigation((_, Some(_)))));

        let path = expand_path(Input::new("Address/Country")).into_value().unwrap();
        assert_eq!(path.segments.len(), 1);
    }

    #[test]
    fn test_select_forms() {
        let out = select(Input::new("$select=Name,NS.*,Address/City,NS.Fn(a),Tags($top=2)"));
        assert!(out.remainder().at_end());
        let items: Vec<_> = out.value().unwrap().items.items().cloned().collect();
        assert_eq!(items.len(), 5);
        assert!(matches!(items[1], SelectItem::AllOperations(_)));
        assert!(matches!(items[3], SelectItem::Member((None, SelectMember::Function(_)))));
    }

    #[test]
    fn test_orderby() {
        let out = orderby(Input::new("$orderby=Name desc,Age"));
        assert!(out.remainder().at_end());
        let items: Vec<_> = out.value().unwrap().items.items().map(|i| i.is_descending()).collect();
        assert_eq!(items, [true, false]);
    }

    #[test]
    fn test_search() {
        for s in [
            "$search=blue",
            "$search=blue OR green",
            "$search=blue AND NOT green",
            "$search=(blue OR red) green",
            "$search=\"blue%20green\"",
        ] {
            let out = search(Input::new(s));
            assert!(out.remainder().at_end(), "{s}: stopped at {:?}", out.remainder());
        }
        let out = search(Input::new("$search=a OR b")).into_value().unwrap();
        assert!(matches!(out.expr.tail, Some(SearchTail::Or(_))));
    }

    #[test]
    fn test_mixed_options() {
        let opts = options(
            "$filter=Price lt 10&$format=application/json;odata.metadata=none&@p=5&x=y&debug",
        );
        assert_eq!(opts.len(), 5);
        assert!(matches!(opts[1], QueryOption::System(SystemQueryOption::Format(_))));
        assert!(matches!(opts[2], QueryOption::AliasAndValue(_)));
        assert!(matches!(opts[3], QueryOption::NameAndValue(_)));
        assert!(matches!(opts[4], QueryOption::Custom(_)));

        let opts = options("$skip=10&$skiptoken=abc&$count=true&$compute=Price mul 2 as Total");
        assert!(matches!(opts[1], QueryOption::System(SystemQueryOption::Skiptoken(_))));
        assert!(matches!(opts[3], QueryOption::System(SystemQueryOption::Compute(_))));
    }

    #[test]
    fn test_entity_options() {
        let out = entity_options(Input::new("id=People('x')&$format=json"));
        assert!(out.remainder().at_end());
        let opts = out.value().unwrap();
        assert!(opts.before.is_empty());
        assert_eq!(opts.after.len(), 1);

        let out = entity_options(Input::new("$format=json&$id=People('x')"));
        assert_eq!(out.value().map(|o| o.before.len()), Some(1));
    }
}
