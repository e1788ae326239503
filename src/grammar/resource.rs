//! Service root and resource path.

use crate::prelude::*;
use crate::{choice, node, rename};

use super::context::{context, Context};
use super::literals::{primitive_literal, PrimitiveLiteral};
use super::names::*;
use super::punctuation::{at, close, comma, digit, eq, open};
use super::query::{
    batch_options, entity_cast_options, entity_options, metadata_options, query_options,
    BatchOptions, EntityCastOptions, EntityOptions, MetadataOptions, QueryOptions,
};
use super::uri::{host, pchar, port, segment_nz, Host, Port, SegmentNz, UriChar};

node! {
    pub struct OdataUri<'a> {
        pub service_root: ServiceRoot<'a>,
        pub relative: Option<OdataRelativeUri<'a>>,
    }
}

/// The service root keeps as many `segment/` pairs as still let the relative
/// part read furthest, so `http://host/svc/People/$count` ends the root at
/// `svc/`.
pub fn odata_uri<'a>(input: Input<'a>) -> Output<'a, OdataUri<'a>> {
    rule("odataUri", input, |i| {
        seq((
            service_root_prefix,
            star_then(seq((segment_nz, literal("/"))), odata_relative_uri.opt()),
        ))
        .map(
            |((scheme, separator, host, port, slash), (segments, relative))| OdataUri {
                service_root: ServiceRoot {
                    scheme,
                    separator,
                    host,
                    port,
                    slash,
                    segments,
                },
                relative,
            },
        )
        .parse(i)
    })
}

node! {
    pub struct ServiceRoot<'a> {
        pub scheme: Terminal<'a>,
        pub separator: Terminal<'a>,
        pub host: Host<'a>,
        pub port: Option<(Terminal<'a>, Port<'a>)>,
        pub slash: Terminal<'a>,
        pub segments: Star<(SegmentNz<'a>, Terminal<'a>)>,
    }
}

type ServiceRootPrefix<'a> = (
    Terminal<'a>,
    Terminal<'a>,
    Host<'a>,
    Option<(Terminal<'a>, Port<'a>)>,
    Terminal<'a>,
);

fn service_root_prefix<'a>(input: Input<'a>) -> Output<'a, ServiceRootPrefix<'a>> {
    seq((
        keyword_ci(&["https", "http"]),
        literal("://"),
        host,
        seq((literal(":"), port)).opt(),
        literal("/"),
    ))
    .parse(input)
}

pub fn service_root<'a>(input: Input<'a>) -> Output<'a, ServiceRoot<'a>> {
    rule("serviceRoot", input, |i| {
        seq((
            service_root_prefix,
            seq((segment_nz, literal("/"))).repeat::<0, UNBOUNDED>(),
        ))
        .map(
            |((scheme, separator, host, port, slash), segments)| ServiceRoot {
                scheme,
                separator,
                host,
                port,
                slash,
                segments,
            },
        )
        .parse(i)
    })
}

node! {
    pub struct EntityCastUri<'a> {
        pub entity: Terminal<'a>,
        pub slash: Terminal<'a>,
        pub type_name: QualifiedEntityTypeName<'a>,
        pub question: Terminal<'a>,
        pub options: EntityCastOptions<'a>,
    }
}

choice! {
    pub enum OdataRelativeUri<'a> {
        Batch((Terminal<'a>, Option<(Terminal<'a>, BatchOptions<'a>)>)),
        Entity((Terminal<'a>, Terminal<'a>, EntityOptions<'a>)),
        EntityCast(EntityCastUri<'a>),
        Metadata((Terminal<'a>, Option<(Terminal<'a>, MetadataOptions<'a>)>, Option<Context<'a>>)),
        Resource((ResourcePath<'a>, Option<(Terminal<'a>, QueryOptions<'a>)>)),
    }
}

pub fn odata_relative_uri<'a>(input: Input<'a>) -> Output<'a, OdataRelativeUri<'a>> {
    use OdataRelativeUri as R;
    rule("odataRelativeUri", input, |i| {
        alt((
            seq((literal("$batch"), seq((literal("?"), batch_options)).opt())).map(R::Batch),
            seq((literal("$entity"), literal("?"), entity_options)).map(R::Entity),
            seq((
                literal("$entity"),
                literal("/"),
                qualified_entity_type_name,
                literal("?"),
                entity_cast_options,
            ))
            .map(|(entity, slash, type_name, question, options)| {
                R::EntityCast(EntityCastUri {
                    entity,
                    slash,
                    type_name,
                    question,
                    options,
                })
            }),
            seq((
                literal("$metadata"),
                seq((literal("?"), metadata_options)).opt(),
                context.opt(),
            ))
            .map(R::Metadata),
            seq((resource_path, seq((literal("?"), query_options)).opt())).map(R::Resource),
        ))
        .parse(i)
    })
}

/// `[ "/" type ] [ rest ]`. A cast competes with reading `rest` straight away
/// and the reading that continues furthest wins; ties keep the cast.
///
/// A cast directly followed by `(` is settled first: `/NS.Func(a=1)` is a bound
/// function call whenever `rest` reads it past the name, and only otherwise the
/// cast `NS.Func` followed by a key. Each reading of the text after the cast is
/// then made at most once.
pub(crate) fn type_cast_then<'a, C, R>(
    input: Input<'a>,
    cast: fn(Input<'a>) -> Output<'a, C>,
    rest: fn(Input<'a>) -> Output<'a, R>,
) -> Output<'a, (Option<(Terminal<'a>, C)>, Option<R>)> {
    let with_cast = seq((literal("/"), cast)).parse(input);
    let mut furthest = with_cast.furthest();
    let Some((type_cast, after)) = with_cast.into_parts() else {
        return rest.opt().map(|r| (None, r)).parse(input).reach(furthest);
    };

    let plain = rest.parse(input);
    furthest = furthest.max(plain.furthest());
    let plain_end = plain.is_success().then(|| plain.remainder().offset());
    if plain_end > Some(after.offset()) && followed_by(open).parse(after).is_success() {
        return plain.map(|r| (None, Some(r))).reach(furthest);
    }

    let cast_reading = rest.opt().parse(after);
    furthest = furthest.max(cast_reading.furthest());
    if plain_end > Some(cast_reading.remainder().offset()) {
        plain.map(|r| (None, Some(r))).reach(furthest)
    } else {
        cast_reading.map(|r| (Some(type_cast), r)).reach(furthest)
    }
}

// ---- resource path

choice! {
    pub enum ResourcePath<'a> {
        EntitySet((EntitySetName<'a>, Option<CollectionNavigation<'a>>)),
        Singleton((SingletonEntity<'a>, Option<SingleNavigation<'a>>)),
        ActionImport(ActionImportCall<'a>),
        EntityColFunctionImport((EntityColFunctionImportCall<'a>, Option<CollectionNavigation<'a>>)),
        EntityFunctionImport((EntityFunctionImportCall<'a>, Option<SingleNavigation<'a>>)),
        ComplexColFunctionImport((ComplexColFunctionImportCall<'a>, Option<ComplexColPath<'a>>)),
        ComplexFunctionImport((ComplexFunctionImportCall<'a>, Option<ComplexPath<'a>>)),
        PrimitiveColFunctionImport((PrimitiveColFunctionImportCall<'a>, Option<PrimitiveColPath<'a>>)),
        PrimitiveFunctionImport((PrimitiveFunctionImportCall<'a>, Option<PrimitivePath<'a>>)),
        FunctionImportNoParens(FunctionImportCallNoParens<'a>),
        Crossjoin(Crossjoin<'a>),
        All((Terminal<'a>, Option<(Terminal<'a>, QualifiedEntityTypeName<'a>)>)),
    }
}

/// Entity sets, singletons and imports are all bare identifiers here, so the
/// reading that continues furthest wins; ties keep the entity set.
pub fn resource_path<'a>(input: Input<'a>) -> Output<'a, ResourcePath<'a>> {
    use ResourcePath as R;
    rule("resourcePath", input, |i| {
        longest((
            seq((entity_set_name, collection_navigation.opt())).map(R::EntitySet),
            seq((singleton_entity, single_navigation.opt())).map(R::Singleton),
            action_import_call.map(R::ActionImport),
            seq((entity_col_function_import_call, collection_navigation.opt()))
                .map(R::EntityColFunctionImport),
            seq((entity_function_import_call, single_navigation.opt()))
                .map(R::EntityFunctionImport),
            seq((complex_col_function_import_call, complex_col_path.opt()))
                .map(R::ComplexColFunctionImport),
            seq((complex_function_import_call, complex_path.opt())).map(R::ComplexFunctionImport),
            seq((primitive_col_function_import_call, primitive_col_path.opt()))
                .map(R::PrimitiveColFunctionImport),
            seq((primitive_function_import_call, primitive_path.opt()))
                .map(R::PrimitiveFunctionImport),
            function_import_call_no_parens.map(R::FunctionImportNoParens),
            crossjoin.map(R::Crossjoin),
            seq((
                literal("$all"),
                seq((literal("/"), qualified_entity_type_name)).opt(),
            ))
            .map(R::All),
        ))
        .parse(i)
    })
}

node! {
    pub struct CollectionNavigation<'a> {
        pub type_cast: Option<(Terminal<'a>, QualifiedEntityTypeName<'a>)>,
        pub path: Option<CollectionNavPath<'a>>,
    }
}

pub fn collection_navigation<'a>(input: Input<'a>) -> Output<'a, CollectionNavigation<'a>> {
    rule("collectionNavigation", input, |i| {
        type_cast_then(i, qualified_entity_type_name, collection_nav_path)
            .map(|(type_cast, path)| CollectionNavigation { type_cast, path })
    })
}

choice! {
    pub enum CollectionNavPath<'a> {
        FilterInPath((FilterInPath<'a>, Option<Box<CollectionNavigation<'a>>>)),
        Each((Terminal<'a>, Option<BoundOperation<'a>>)),
        Count(Terminal<'a>),
        Ref(Terminal<'a>),
        BoundOperation(BoundOperation<'a>),
        Key((KeyPredicate<'a>, Option<Box<SingleNavigation<'a>>>)),
    }
}

/// The key predicate goes last: its key-as-segment form reads any `/segment`,
/// including `/$count` and `/NS.Action`.
pub fn collection_nav_path<'a>(input: Input<'a>) -> Output<'a, CollectionNavPath<'a>> {
    use CollectionNavPath as C;
    rule("collectionNavPath", input, |i| {
        alt((
            seq((filter_in_path, collection_navigation.map(Box::new).opt())).map(C::FilterInPath),
            seq((each, bound_operation.opt())).map(C::Each),
            count.map(C::Count),
            r#ref.map(C::Ref),
            bound_operation.map(C::BoundOperation),
            seq((key_predicate, single_navigation.map(Box::new).opt())).map(C::Key),
        ))
        .parse(i)
    })
}

// ---- keys

choice! {
    pub enum KeyPredicate<'a> {
        Simple(SimpleKey<'a>),
        Compound(CompoundKey<'a>),
        Path(KeyPathSegments<'a>),
    }
}

pub fn key_predicate<'a>(input: Input<'a>) -> Output<'a, KeyPredicate<'a>> {
    rule("keyPredicate", input, |i| {
        alt((
            simple_key.map(KeyPredicate::Simple),
            compound_key.map(KeyPredicate::Compound),
            key_path_segments.map(KeyPredicate::Path),
        ))
        .parse(i)
    })
}

choice! {
    pub enum KeyValue<'a> {
        Alias(ParameterAlias<'a>),
        Value(KeyPropertyValue<'a>),
    }
}

fn key_value<'a>(input: Input<'a>) -> Output<'a, KeyValue<'a>> {
    alt((
        parameter_alias.map(KeyValue::Alias),
        key_property_value.map(KeyValue::Value),
    ))
    .parse(input)
}

node! {
    pub struct SimpleKey<'a> {
        pub open: Terminal<'a>,
        pub value: KeyValue<'a>,
        pub close: Terminal<'a>,
    }
}

pub fn simple_key<'a>(input: Input<'a>) -> Output<'a, SimpleKey<'a>> {
    rule("simpleKey", input, |i| {
        seq((open, key_value, close))
            .map(|(open, value, close)| SimpleKey { open, value, close })
            .parse(i)
    })
}

node! {
    pub struct CompoundKey<'a> {
        pub open: Terminal<'a>,
        pub pairs: Delimited<KeyValuePair<'a>, Terminal<'a>>,
        pub close: Terminal<'a>,
    }
}

pub fn compound_key<'a>(input: Input<'a>) -> Output<'a, CompoundKey<'a>> {
    rule("compoundKey", input, |i| {
        seq((open, sep_by(key_value_pair, comma), close))
            .map(|(open, pairs, close)| CompoundKey { open, pairs, close })
            .parse(i)
    })
}

choice! {
    pub enum KeyName<'a> {
        Property(PrimitiveKeyProperty<'a>),
        Alias(KeyPropertyAlias<'a>),
    }
}

node! {
    pub struct KeyValuePair<'a> {
        pub key: KeyName<'a>,
        pub eq: Terminal<'a>,
        pub value: KeyValue<'a>,
    }
}

pub fn key_value_pair<'a>(input: Input<'a>) -> Output<'a, KeyValuePair<'a>> {
    rule("keyValuePair", input, |i| {
        seq((
            alt((
                primitive_key_property.map(KeyName::Property),
                key_property_alias.map(KeyName::Alias),
            )),
            eq,
            key_value,
        ))
        .map(|(key, eq, value)| KeyValuePair { key, eq, value })
        .parse(i)
    })
}

rename!(
    KeyPropertyValue,
    key_property_value,
    "keyPropertyValue",
    PrimitiveLiteral,
    primitive_literal
);
rename!(
    KeyPropertyAlias,
    key_property_alias,
    "keyPropertyAlias",
    OdataIdentifier,
    odata_identifier
);

node! {
    pub struct KeyPathSegments<'a>(pub Plus<(Terminal<'a>, KeyPathLiteral<'a>)>);
}

pub fn key_path_segments<'a>(input: Input<'a>) -> Output<'a, KeyPathSegments<'a>> {
    rule("keyPathSegments", input, |i| {
        seq((literal("/"), key_path_literal))
            .repeat::<1, UNBOUNDED>()
            .map(KeyPathSegments)
            .parse(i)
    })
}

node! {
    pub struct KeyPathLiteral<'a>(pub Star<UriChar<'a>>);
}

pub fn key_path_literal<'a>(input: Input<'a>) -> Output<'a, KeyPathLiteral<'a>> {
    rule("keyPathLiteral", input, |i| {
        pchar.repeat::<0, UNBOUNDED>().map(KeyPathLiteral).parse(i)
    })
}

// ---- single-valued navigation and properties

choice! {
    pub enum SingleNavigationPath<'a> {
        BoundOperation(Box<BoundOperation<'a>>),
        Ref(Terminal<'a>),
        Value(Terminal<'a>),
        Property((Terminal<'a>, Box<PropertyPath<'a>>)),
    }
}

fn single_navigation_path<'a>(input: Input<'a>) -> Output<'a, SingleNavigationPath<'a>> {
    use SingleNavigationPath as S;
    alt((
        bound_operation.map(|b| S::BoundOperation(Box::new(b))),
        r#ref.map(S::Ref),
        value.map(S::Value),
        seq((literal("/"), property_path.map(Box::new))).map(S::Property),
    ))
    .parse(input)
}

node! {
    pub struct SingleNavigation<'a> {
        pub type_cast: Option<(Terminal<'a>, QualifiedEntityTypeName<'a>)>,
        pub path: Option<SingleNavigationPath<'a>>,
    }
}

pub fn single_navigation<'a>(input: Input<'a>) -> Output<'a, SingleNavigation<'a>> {
    rule("singleNavigation", input, |i| {
        type_cast_then(i, qualified_entity_type_name, single_navigation_path)
            .map(|(type_cast, path)| SingleNavigation { type_cast, path })
    })
}

choice! {
    pub enum PropertyPath<'a> {
        Primitive((PrimitiveProperty<'a>, Option<Box<PrimitivePath<'a>>>)),
        Complex((ComplexProperty<'a>, Option<Box<ComplexPath<'a>>>)),
        EntityNavigation((EntityNavigationProperty<'a>, Option<Box<SingleNavigation<'a>>>)),
        EntityColNavigation((EntityColNavigationProperty<'a>, Option<Box<CollectionNavigation<'a>>>)),
    }
}

impl<'a> PropertyPath<'a> {
    /// The property name that starts the path.
    pub fn property(&self) -> &OdataIdentifier<'a> {
        match self {
            Self::Primitive((PrimitiveProperty::Key(p), _)) => &p.0,
            Self::Primitive((PrimitiveProperty::NonKey(p), _)) => &p.0,
            Self::Complex((p, _)) => &p.0,
            Self::EntityNavigation((p, _)) => &p.0,
            Self::EntityColNavigation((p, _)) => &p.0,
        }
    }
}

/// The property kinds are indistinguishable by name, so the name is read once
/// and what follows it decides the kind. A bare name is a primitive property.
pub fn property_path<'a>(input: Input<'a>) -> Output<'a, PropertyPath<'a>> {
    use PropertyPath as P;
    rule("propertyPath", input, |i| {
        seq((odata_identifier, nav_tail.opt()))
            .map(|(name, tail)| match tail {
                None => P::Primitive((PrimitiveProperty::Key(PrimitiveKeyProperty(name)), None)),
                Some(NavTail::Primitive(path)) => P::Primitive((
                    PrimitiveProperty::Key(PrimitiveKeyProperty(name)),
                    Some(Box::new(path)),
                )),
                Some(NavTail::Complex(path)) => {
                    P::Complex((ComplexProperty(name), Some(Box::new(path))))
                }
                Some(NavTail::Single(nav)) => {
                    P::EntityNavigation((EntityNavigationProperty(name), Some(Box::new(nav))))
                }
                Some(NavTail::Collection(nav)) => P::EntityColNavigation((
                    EntityColNavigationProperty(name),
                    Some(Box::new(nav)),
                )),
            })
            .parse(i)
    })
}

// What follows a property name or the parameters of a bound function.
enum NavTail<'a> {
    Primitive(PrimitivePath<'a>),
    Complex(ComplexPath<'a>),
    Single(SingleNavigation<'a>),
    Collection(CollectionNavigation<'a>),
}

// "/" namespace "." identifier
fn slash_qualified<'a>(input: Input<'a>) -> Output<'a, ()> {
    seq((literal("/"), namespace, literal("."), odata_identifier))
        .map(|_| ())
        .parse(input)
}

fn nonempty_collection_navigation<'a>(input: Input<'a>) -> Output<'a, NavTail<'a>> {
    collection_navigation
        .map_opt(|nav| {
            (nav.type_cast.is_some() || nav.path.is_some()).then_some(NavTail::Collection(nav))
        })
        .parse(input)
}

/// The next few characters select the one continuation that can apply, so the
/// rest of a path is parsed once per segment rather than once per property kind.
/// Where two readings remain, at most one of them recurses.
fn nav_tail<'a>(input: Input<'a>) -> Output<'a, NavTail<'a>> {
    use NavTail as T;
    let collection_marker = || alt((count, each, literal("/$filter")));
    alt((
        when(open, nonempty_collection_navigation),
        when(value, primitive_path.map(T::Primitive)),
        when(r#ref, single_navigation.map(T::Single)),
        when(collection_marker(), nonempty_collection_navigation),
        when(
            seq((slash_qualified, open)),
            alt((
                bound_operation
                    .map_opt(|op| {
                        (!matches!(op.call, BoundCall::Action(_)))
                            .then_some(T::Primitive(PrimitivePath::BoundOperation(op)))
                    }),
                nonempty_collection_navigation,
            )),
        ),
        when(seq((slash_qualified, collection_marker())), nonempty_collection_navigation),
        when(
            seq((slash_qualified, alt((r#ref, value)))),
            single_navigation.map(T::Single),
        ),
        when(seq((slash_qualified, literal("/"))), complex_path.map(T::Complex)),
        when(slash_qualified, primitive_path.map(T::Primitive)),
        when(
            seq((literal("/"), odata_identifier)),
            longest((complex_path.map(T::Complex), nonempty_collection_navigation)),
        ),
        when(literal("/"), nonempty_collection_navigation),
    ))
    .parse(input)
}

choice! {
    pub enum PrimitiveColPath<'a> {
        Count(Terminal<'a>),
        BoundOperation(BoundOperation<'a>),
        OrdinalIndex(OrdinalIndex<'a>),
    }
}

pub fn primitive_col_path<'a>(input: Input<'a>) -> Output<'a, PrimitiveColPath<'a>> {
    rule("primitiveColPath", input, |i| {
        alt((
            count.map(PrimitiveColPath::Count),
            bound_operation.map(PrimitiveColPath::BoundOperation),
            ordinal_index.map(PrimitiveColPath::OrdinalIndex),
        ))
        .parse(i)
    })
}

choice! {
    pub enum PrimitivePath<'a> {
        Value(Terminal<'a>),
        BoundOperation(BoundOperation<'a>),
    }
}

pub fn primitive_path<'a>(input: Input<'a>) -> Output<'a, PrimitivePath<'a>> {
    rule("primitivePath", input, |i| {
        alt((
            value.map(PrimitivePath::Value),
            bound_operation.map(PrimitivePath::BoundOperation),
        ))
        .parse(i)
    })
}

choice! {
    pub enum ComplexColPathTail<'a> {
        Count(Terminal<'a>),
        BoundOperation(BoundOperation<'a>),
    }
}

fn complex_col_path_tail<'a>(input: Input<'a>) -> Output<'a, ComplexColPathTail<'a>> {
    alt((
        count.map(ComplexColPathTail::Count),
        bound_operation.map(ComplexColPathTail::BoundOperation),
    ))
    .parse(input)
}

choice! {
    pub enum ComplexColPath<'a> {
        OrdinalIndex(OrdinalIndex<'a>),
        Cast((Option<(Terminal<'a>, QualifiedComplexTypeName<'a>)>, Option<ComplexColPathTail<'a>>)),
    }
}

pub fn complex_col_path<'a>(input: Input<'a>) -> Output<'a, ComplexColPath<'a>> {
    rule("complexColPath", input, |i| {
        ordinal_index
            .map(ComplexColPath::OrdinalIndex)
            .or(|i: Input<'a>| {
                type_cast_then(i, qualified_complex_type_name, complex_col_path_tail)
                    .map(ComplexColPath::Cast)
            })
            .parse(i)
    })
}

choice! {
    pub enum ComplexPathTail<'a> {
        BoundOperation(Box<BoundOperation<'a>>),
        Property((Terminal<'a>, Box<PropertyPath<'a>>)),
    }
}

fn complex_path_tail<'a>(input: Input<'a>) -> Output<'a, ComplexPathTail<'a>> {
    alt((
        bound_operation.map(|b| ComplexPathTail::BoundOperation(Box::new(b))),
        seq((literal("/"), property_path.map(Box::new))).map(ComplexPathTail::Property),
    ))
    .parse(input)
}

node! {
    pub struct ComplexPath<'a> {
        pub type_cast: Option<(Terminal<'a>, QualifiedComplexTypeName<'a>)>,
        pub path: Option<ComplexPathTail<'a>>,
    }
}

pub fn complex_path<'a>(input: Input<'a>) -> Output<'a, ComplexPath<'a>> {
    rule("complexPath", input, |i| {
        type_cast_then(i, qualified_complex_type_name, complex_path_tail)
            .map(|(type_cast, path)| ComplexPath { type_cast, path })
    })
}

node! {
    pub struct FilterInPath<'a> {
        pub filter: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub alias: ParameterAlias<'a>,
    }
}

pub fn filter_in_path<'a>(input: Input<'a>) -> Output<'a, FilterInPath<'a>> {
    rule("filterInPath", input, |i| {
        seq((literal("/$filter"), eq, parameter_alias))
            .map(|(filter, eq, alias)| FilterInPath { filter, eq, alias })
            .parse(i)
    })
}

pub fn each<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("each", input, |i| literal("/$each").parse(i))
}

pub fn count<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("count", input, |i| literal("/$count").parse(i))
}

pub fn r#ref<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("ref", input, |i| literal("/$ref").parse(i))
}

pub fn value<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("value", input, |i| literal("/$value").parse(i))
}

node! {
    pub struct OrdinalIndex<'a> {
        pub slash: Terminal<'a>,
        pub digits: Plus<Terminal<'a>>,
    }
}

pub fn ordinal_index<'a>(input: Input<'a>) -> Output<'a, OrdinalIndex<'a>> {
    rule("ordinalIndex", input, |i| {
        seq((literal("/"), digit.repeat::<1, UNBOUNDED>()))
            .map(|(slash, digits)| OrdinalIndex { slash, digits })
            .parse(i)
    })
}

// ---- bound operations

choice! {
    pub enum BoundCall<'a> {
        Action(BoundActionCall<'a>),
        EntityCol((BoundEntityColFunctionCall<'a>, Option<Box<CollectionNavigation<'a>>>)),
        Entity((BoundEntityFunctionCall<'a>, Option<Box<SingleNavigation<'a>>>)),
        Complex((BoundComplexFunctionCall<'a>, Option<Box<ComplexPath<'a>>>)),
        Primitive((BoundPrimitiveFunctionCall<'a>, Option<Box<PrimitivePath<'a>>>)),
    }
}

node! {
    pub struct BoundOperation<'a> {
        pub slash: Terminal<'a>,
        pub call: BoundCall<'a>,
    }
}

/// `/NS.Name` is an action; with parameters it is a function whose kind follows
/// from the path after the parameters, a collection of entities when nothing
/// follows.
pub fn bound_operation<'a>(input: Input<'a>) -> Output<'a, BoundOperation<'a>> {
    rule("boundOperation", input, |i| {
        seq((
            literal("/"),
            namespace,
            literal("."),
            odata_identifier,
            seq((function_parameters, nav_tail.opt())).opt(),
        ))
        .map(|(slash, namespace, dot, name, call)| {
            let call = match call {
                None => BoundCall::Action(BoundActionCall {
                    namespace,
                    dot,
                    action: Action(name),
                }),
                Some((params, tail)) => bound_function_call(namespace, dot, name, params, tail),
            };
            BoundOperation { slash, call }
        })
        .parse(i)
    })
}

fn bound_function_call<'a>(
    namespace: Namespace<'a>,
    dot: Terminal<'a>,
    name: OdataIdentifier<'a>,
    params: FunctionParameters<'a>,
    tail: Option<NavTail<'a>>,
) -> BoundCall<'a> {
    let nav = match tail {
        None => None,
        Some(NavTail::Collection(nav)) => Some(Box::new(nav)),
        Some(NavTail::Single(nav)) => {
            let call = BoundEntityFunctionCall {
                namespace,
                dot,
                function: EntityFunction(name),
                params,
            };
            return BoundCall::Entity((call, Some(Box::new(nav))));
        }
        Some(NavTail::Complex(path)) => {
            let call = BoundComplexFunctionCall {
                namespace,
                dot,
                function: ComplexFunction(name),
                params,
            };
            return BoundCall::Complex((call, Some(Box::new(path))));
        }
        Some(NavTail::Primitive(path)) => {
            let call = BoundPrimitiveFunctionCall {
                namespace,
                dot,
                function: PrimitiveFunction(name),
                params,
            };
            return BoundCall::Primitive((call, Some(Box::new(path))));
        }
    };
    let call = BoundEntityColFunctionCall {
        namespace,
        dot,
        function: EntityColFunction(name),
        params,
    };
    BoundCall::EntityCol((call, nav))
}

rename!(ActionImportCall, action_import_call, "actionImportCall", ActionImport, action_import);

node! {
    pub struct BoundActionCall<'a> {
        pub namespace: Namespace<'a>,
        pub dot: Terminal<'a>,
        pub action: Action<'a>,
    }
}

pub fn bound_action_call<'a>(input: Input<'a>) -> Output<'a, BoundActionCall<'a>> {
    rule("boundActionCall", input, |i| {
        seq((namespace, literal("."), action))
            .map(|(namespace, dot, action)| BoundActionCall {
                namespace,
                dot,
                action,
            })
            .parse(i)
    })
}

macro_rules! bound_function_call {
    ($name:ident, $func:ident, $abnf:literal, $function:ident, $function_func:ident) => {
        node! {
            pub struct $name<'a> {
                pub namespace: Namespace<'a>,
                pub dot: Terminal<'a>,
                pub function: $function<'a>,
                pub params: FunctionParameters<'a>,
            }
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| {
                seq((namespace, literal("."), $function_func, function_parameters))
                    .map(|(namespace, dot, function, params)| $name {
                        namespace,
                        dot,
                        function,
                        params,
                    })
                    .parse(i)
            })
        }
    };
}

bound_function_call!(
    BoundEntityFunctionCall,
    bound_entity_function_call,
    "boundEntityFunctionCall",
    EntityFunction,
    entity_function
);
bound_function_call!(
    BoundEntityColFunctionCall,
    bound_entity_col_function_call,
    "boundEntityColFunctionCall",
    EntityColFunction,
    entity_col_function
);
bound_function_call!(
    BoundComplexFunctionCall,
    bound_complex_function_call,
    "boundComplexFunctionCall",
    ComplexFunction,
    complex_function
);
bound_function_call!(
    BoundComplexColFunctionCall,
    bound_complex_col_function_call,
    "boundComplexColFunctionCall",
    ComplexColFunction,
    complex_col_function
);
bound_function_call!(
    BoundPrimitiveFunctionCall,
    bound_primitive_function_call,
    "boundPrimitiveFunctionCall",
    PrimitiveFunction,
    primitive_function
);
bound_function_call!(
    BoundPrimitiveColFunctionCall,
    bound_primitive_col_function_call,
    "boundPrimitiveColFunctionCall",
    PrimitiveColFunction,
    primitive_col_function
);

node! {
    pub struct BoundFunctionCallNoParens<'a> {
        pub namespace: Namespace<'a>,
        pub dot: Terminal<'a>,
        pub function: Function<'a>,
    }
}

pub fn bound_function_call_no_parens<'a>(input: Input<'a>) -> Output<'a, BoundFunctionCallNoParens<'a>> {
    rule("boundFunctionCallNoParens", input, |i| {
        seq((namespace, literal("."), function))
            .map(|(namespace, dot, function)| BoundFunctionCallNoParens {
                namespace,
                dot,
                function,
            })
            .parse(i)
    })
}

// ---- function imports

macro_rules! function_import_call {
    ($name:ident, $func:ident, $abnf:literal, $import:ident, $import_func:ident) => {
        node! {
            pub struct $name<'a> {
                pub import: $import<'a>,
                pub params: FunctionParameters<'a>,
            }
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| {
                seq(($import_func, function_parameters))
                    .map(|(import, params)| $name { import, params })
                    .parse(i)
            })
        }
    };
}

function_import_call!(
    EntityFunctionImportCall,
    entity_function_import_call,
    "entityFunctionImportCall",
    EntityFunctionImport,
    entity_function_import
);
function_import_call!(
    EntityColFunctionImportCall,
    entity_col_function_import_call,
    "entityColFunctionImportCall",
    EntityColFunctionImport,
    entity_col_function_import
);
function_import_call!(
    ComplexFunctionImportCall,
    complex_function_import_call,
    "complexFunctionImportCall",
    ComplexFunctionImport,
    complex_function_import
);
function_import_call!(
    ComplexColFunctionImportCall,
    complex_col_function_import_call,
    "complexColFunctionImportCall",
    ComplexColFunctionImport,
    complex_col_function_import
);
function_import_call!(
    PrimitiveFunctionImportCall,
    primitive_function_import_call,
    "primitiveFunctionImportCall",
    PrimitiveFunctionImport,
    primitive_function_import
);
function_import_call!(
    PrimitiveColFunctionImportCall,
    primitive_col_function_import_call,
    "primitiveColFunctionImportCall",
    PrimitiveColFunctionImport,
    primitive_col_function_import
);

choice! {
    pub enum FunctionImportCallNoParens<'a> {
        Entity(EntityFunctionImport<'a>),
        EntityCol(EntityColFunctionImport<'a>),
        Complex(ComplexFunctionImport<'a>),
        ComplexCol(ComplexColFunctionImport<'a>),
        Primitive(PrimitiveFunctionImport<'a>),
        PrimitiveCol(PrimitiveColFunctionImport<'a>),
    }
}

pub fn function_import_call_no_parens<'a>(input: Input<'a>) -> Output<'a, FunctionImportCallNoParens<'a>> {
    use FunctionImportCallNoParens as F;
    rule("functionImportCallNoParens", input, |i| {
        alt((
            entity_function_import.map(F::Entity),
            entity_col_function_import.map(F::EntityCol),
            complex_function_import.map(F::Complex),
            complex_col_function_import.map(F::ComplexCol),
            primitive_function_import.map(F::Primitive),
            primitive_col_function_import.map(F::PrimitiveCol),
        ))
        .parse(i)
    })
}

node! {
    pub struct FunctionParameters<'a> {
        pub open: Terminal<'a>,
        pub params: Option<Delimited<FunctionParameter<'a>, Terminal<'a>>>,
        pub close: Terminal<'a>,
    }
}

pub fn function_parameters<'a>(input: Input<'a>) -> Output<'a, FunctionParameters<'a>> {
    rule("functionParameters", input, |i| {
        seq((open, sep_by(function_parameter, comma).opt(), close))
            .map(|(open, params, close)| FunctionParameters {
                open,
                params,
                close,
            })
            .parse(i)
    })
}

choice! {
    pub enum FunctionParameterValue<'a> {
        Alias(ParameterAlias<'a>),
        Literal(PrimitiveLiteral<'a>),
    }
}

node! {
    pub struct FunctionParameter<'a> {
        pub name: ParameterName<'a>,
        pub eq: Terminal<'a>,
        pub value: FunctionParameterValue<'a>,
    }
}

pub fn function_parameter<'a>(input: Input<'a>) -> Output<'a, FunctionParameter<'a>> {
    rule("functionParameter", input, |i| {
        seq((
            parameter_name,
            eq,
            alt((
                parameter_alias.map(FunctionParameterValue::Alias),
                primitive_literal.map(FunctionParameterValue::Literal),
            )),
        ))
        .map(|(name, eq, value)| FunctionParameter { name, eq, value })
        .parse(i)
    })
}

rename!(ParameterName, parameter_name, "parameterName", OdataIdentifier, odata_identifier);

node! {
    pub struct ParameterAlias<'a> {
        pub at: Terminal<'a>,
        pub name: OdataIdentifier<'a>,
    }
}

pub fn parameter_alias<'a>(input: Input<'a>) -> Output<'a, ParameterAlias<'a>> {
    rule("parameterAlias", input, |i| {
        seq((at, odata_identifier))
            .map(|(at, name)| ParameterAlias { at, name })
            .parse(i)
    })
}

node! {
    pub struct Crossjoin<'a> {
        pub keyword: Terminal<'a>,
        pub open: Terminal<'a>,
        pub sets: Delimited<EntitySetName<'a>, Terminal<'a>>,
        pub close: Terminal<'a>,
    }
}

pub fn crossjoin<'a>(input: Input<'a>) -> Output<'a, Crossjoin<'a>> {
    rule("crossjoin", input, |i| {
        seq((literal("$crossjoin"), open, sep_by(entity_set_name, comma), close))
            .map(|(keyword, open, sets, close)| Crossjoin {
                keyword,
                open,
                sets,
                close,
            })
            .parse(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn path(s: &str) -> ResourcePath {
        let out = resource_path(Input::new(s));
        assert!(out.remainder().at_end(), "{s}: stopped at {:?}", out.remainder());
        out.into_value().unwrap()
    }

    #[test]
    fn test_entity_set_key() {
        let ResourcePath::EntitySet((name, Some(nav))) = path("Employees('1')") else {
            panic!("expected an entity set");
        };
        assert_eq!(name.source(), "Employees");
        assert!(nav.type_cast.is_none());
        let Some(CollectionNavPath::Key((KeyPredicate::Simple(key), _))) = &nav.path else {
            panic!("expected a simple key: {:?}", nav.path);
        };
        assert!(matches!(key.value, KeyValue::Value(_)));
        assert_eq!(key.value.source(), "'1'");
    }

    #[test]
    fn test_keys() {
        let out = key_predicate(Input::new("(OrderID=1,ProductID=@p)"));
        let Some(KeyPredicate::Compound(key)) = out.value() else {
            panic!("expected a compound key");
        };
        assert_eq!(key.pairs.len(), 2);
        assert!(matches!(key.pairs.items().nth(1).map(|p| &p.value), Some(KeyValue::Alias(_))));

        let out = key_predicate(Input::new("/1/2"));
        assert!(matches!(out.value(), Some(KeyPredicate::Path(p)) if p.0.len() == 2));
    }

    #[test]
    fn test_navigation() {
        for s in [
            "People('russell')/Friends('scott')/FirstName",
            "People('russell')/Friends/$count",
            "People/$ref",
            "People('x')/Photo/$value",
            "People/NS.Manager('y')/DirectReports",
            "People('x')/Trips/NS.GetInvolvedPeople()",
            "People/$filter=@f/$each/NS.Promote",
            "Airports('KSFO')/Location/Address",
            "Me/Emails/1",
        ] {
            assert_eq!(path(s).source(), s);
        }

        let ResourcePath::EntitySet((_, Some(nav))) = path("People/$count") else {
            panic!()
        };
        assert!(matches!(nav.path, Some(CollectionNavPath::Count(_))));
    }

    #[test]
    fn test_bound_function_over_cast() {
        let ResourcePath::EntitySet((_, Some(nav))) = path("People/NS.Fn()") else {
            panic!()
        };
        assert!(nav.type_cast.is_none());
        assert!(matches!(nav.path, Some(CollectionNavPath::BoundOperation(_))));

        let ResourcePath::EntitySet((_, Some(nav))) = path("People/NS.Fn(a=1)/Name") else {
            panic!()
        };
        assert!(nav.type_cast.is_none());
        let Some(CollectionNavPath::BoundOperation(op)) = &nav.path else { panic!() };
        assert!(matches!(op.call, BoundCall::Complex((_, Some(_)))));

        // a key is not a parameter list
        let ResourcePath::EntitySet((_, Some(nav))) = path("People/NS.Manager('y')/Name") else {
            panic!()
        };
        assert!(nav.type_cast.is_some());
        assert!(matches!(nav.path, Some(CollectionNavPath::Key((_, Some(_))))));
    }

    #[test]
    fn test_property_kinds() {
        let kind = |s: &'static str| {
            let out = property_path(Input::new(s));
            assert!(out.remainder().at_end(), "{s}: stopped at {:?}", out.remainder());
            out.into_value().unwrap()
        };
        assert!(matches!(kind("Name"), PropertyPath::Primitive((_, None))));
        assert!(matches!(kind("Photo/$value"), PropertyPath::Primitive((_, Some(_)))));
        assert!(matches!(kind("Address/City"), PropertyPath::Complex((_, Some(_)))));
        assert!(matches!(kind("Friends/$ref"), PropertyPath::EntityNavigation((_, Some(_)))));
        assert!(matches!(kind("Friends(1)"), PropertyPath::EntityColNavigation((_, Some(_)))));
        assert!(matches!(kind("Friends/$count"), PropertyPath::EntityColNavigation((_, Some(_)))));

        let PropertyPath::Primitive((_, Some(p))) = kind("Emails/NS.Top(n=1)/$count") else {
            panic!()
        };
        let PrimitivePath::BoundOperation(op) = &*p else { panic!() };
        assert!(matches!(op.call, BoundCall::EntityCol((_, Some(_)))));
        assert_eq!(kind("Friends(1)/Name").property().source(), "Friends");
    }

    #[test]
    fn test_imports_and_specials() {
        assert!(matches!(path("GetNearestAirport(lat=33,lon=-118)"), ResourcePath::EntitySet(_)));
        assert!(matches!(path("$crossjoin(Products,Sales)"), ResourcePath::Crossjoin(c) if c.sets.len() == 2));
        assert!(matches!(path("$all/NS.Person"), ResourcePath::All((_, Some(_)))));
    }

    #[test]
    fn test_odata_uri() {
        let s = "https://services.example.org/V4/TripPin/People/$count";
        let out = odata_uri(Input::new(s));
        assert!(out.remainder().at_end());
        let uri = out.value().unwrap();
        assert_eq!(uri.service_root.source(), "https://services.example.org/V4/TripPin/");
        assert_eq!(uri.service_root.segments.len(), 2);
        assert_eq!(uri.source(), s);

        let s = "http://host:8080/svc/$metadata";
        let uri = odata_uri(Input::new(s)).into_value().unwrap();
        assert!(matches!(uri.relative, Some(OdataRelativeUri::Metadata(_))));
        assert!(uri.service_root.port.is_some());

        let s = "http://host/$batch";
        assert!(odata_uri(Input::new(s)).remainder().at_end());

        let s = "http://host/svc/$entity?$id=People('x')";
        let uri = odata_uri(Input::new(s)).into_value().unwrap();
        assert!(matches!(uri.relative, Some(OdataRelativeUri::Entity(_))));

        // root only
        let s = "http://host/";
        let uri = odata_uri(Input::new(s)).into_value().unwrap();
        assert!(uri.relative.is_none());

        let inp = Input::new("ftp://host/");
        assert_eq!(odata_uri(inp).remainder(), inp);
    }
}
