//! Names and identifiers.

use crate::prelude::*;
use crate::{choice, node, rename};

use super::punctuation::{close, open};

node! {
    /// A simple identifier: a leading character and at most 127 more.
    pub struct OdataIdentifier<'a> {
        pub leading: Terminal<'a>,
        pub rest: Repeated<Terminal<'a>, 0, 127>,
    }
}

pub fn odata_identifier<'a>(input: Input<'a>) -> Output<'a, OdataIdentifier<'a>> {
    rule("odataIdentifier", input, |i| {
        seq((
            identifier_leading_character,
            identifier_character.repeat::<0, 127>(),
        ))
        .map(|(leading, rest)| OdataIdentifier { leading, rest })
        .parse(i)
    })
}

/// Letters from any script, or `_`.
pub fn identifier_leading_character<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("identifierLeadingCharacter", input, |i| {
        char_class(|c: char| c == '_' || c.is_alphabetic()).parse(i)
    })
}

/// Letters and digits from any script, or `_`.
pub fn identifier_character<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("identifierCharacter", input, |i| {
        char_class(|c: char| c == '_' || c.is_alphanumeric()).parse(i)
    })
}

rename!(NamespacePart, namespace_part, "namespacePart", OdataIdentifier, odata_identifier);

node! {
    /// Dotted namespace. It never takes the last dotted part of the text, which
    /// belongs to the qualified name that follows.
    pub struct Namespace<'a> {
        pub first: NamespacePart<'a>,
        pub rest: Star<(Terminal<'a>, NamespacePart<'a>)>,
    }
}

pub fn namespace<'a>(input: Input<'a>) -> Output<'a, Namespace<'a>> {
    rule("namespace", input, |i| {
        seq((
            namespace_part,
            seq((literal("."), namespace_part, followed_by(literal("."))))
                .map(|(dot, part, ())| (dot, part))
                .repeat::<0, UNBOUNDED>(),
        ))
        .map(|(first, rest)| Namespace { first, rest })
        .parse(i)
    })
}

rename!(EntitySetName, entity_set_name, "entitySetName", OdataIdentifier, odata_identifier);
rename!(SingletonEntity, singleton_entity, "singletonEntity", OdataIdentifier, odata_identifier);
rename!(EntityTypeName, entity_type_name, "entityTypeName", OdataIdentifier, odata_identifier);
rename!(ComplexTypeName, complex_type_name, "complexTypeName", OdataIdentifier, odata_identifier);
rename!(
    TypeDefinitionName,
    type_definition_name,
    "typeDefinitionName",
    OdataIdentifier,
    odata_identifier
);
rename!(
    EnumerationTypeName,
    enumeration_type_name,
    "enumerationTypeName",
    OdataIdentifier,
    odata_identifier
);
rename!(
    EnumerationMember,
    enumeration_member,
    "enumerationMember",
    OdataIdentifier,
    odata_identifier
);
rename!(TermName, term_name, "termName", OdataIdentifier, odata_identifier);

macro_rules! qualified_name {
    ($name:ident, $func:ident, $abnf:literal, $part:ident, $part_func:ident) => {
        node! {
            pub struct $name<'a> {
                pub namespace: Namespace<'a>,
                pub dot: Terminal<'a>,
                pub name: $part<'a>,
            }
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| {
                seq((namespace, literal("."), $part_func))
                    .map(|(namespace, dot, name)| $name { namespace, dot, name })
                    .parse(i)
            })
        }
    };
}

qualified_name!(
    QualifiedEntityTypeName,
    qualified_entity_type_name,
    "qualifiedEntityTypeName",
    EntityTypeName,
    entity_type_name
);
qualified_name!(
    QualifiedComplexTypeName,
    qualified_complex_type_name,
    "qualifiedComplexTypeName",
    ComplexTypeName,
    complex_type_name
);
qualified_name!(
    QualifiedTypeDefinitionName,
    qualified_type_definition_name,
    "qualifiedTypeDefinitionName",
    TypeDefinitionName,
    type_definition_name
);
qualified_name!(
    QualifiedEnumTypeName,
    qualified_enum_type_name,
    "qualifiedEnumTypeName",
    EnumerationTypeName,
    enumeration_type_name
);
qualified_name!(
    QualifiedActionName,
    qualified_action_name,
    "qualifiedActionName",
    Action,
    action
);

choice! {
    pub enum SingleQualifiedTypeName<'a> {
        Primitive(PrimitiveTypeName<'a>),
        Entity(QualifiedEntityTypeName<'a>),
        Complex(QualifiedComplexTypeName<'a>),
        TypeDefinition(QualifiedTypeDefinitionName<'a>),
        Enum(QualifiedEnumTypeName<'a>),
    }
}

/// Every qualified form also reads `Edm.String`, so the primitive reading comes
/// first and the longest reading wins.
pub fn single_qualified_type_name<'a>(input: Input<'a>) -> Output<'a, SingleQualifiedTypeName<'a>> {
    rule("singleQualifiedTypeName", input, |i| {
        longest((
            primitive_type_name.map(SingleQualifiedTypeName::Primitive),
            qualified_entity_type_name.map(SingleQualifiedTypeName::Entity),
            qualified_complex_type_name.map(SingleQualifiedTypeName::Complex),
            qualified_type_definition_name.map(SingleQualifiedTypeName::TypeDefinition),
            qualified_enum_type_name.map(SingleQualifiedTypeName::Enum),
        ))
        .parse(i)
    })
}

node! {
    pub struct CollectionTypeName<'a> {
        pub collection: Terminal<'a>,
        pub open: Terminal<'a>,
        pub name: SingleQualifiedTypeName<'a>,
        pub close: Terminal<'a>,
    }
}

choice! {
    pub enum QualifiedTypeName<'a> {
        Single(SingleQualifiedTypeName<'a>),
        Collection(CollectionTypeName<'a>),
    }
}

pub fn qualified_type_name<'a>(input: Input<'a>) -> Output<'a, QualifiedTypeName<'a>> {
    rule("qualifiedTypeName", input, |i| {
        alt((
            single_qualified_type_name.map(QualifiedTypeName::Single),
            seq((literal("Collection"), open, single_qualified_type_name, close)).map(
                |(collection, open, name, close)| {
                    QualifiedTypeName::Collection(CollectionTypeName {
                        collection,
                        open,
                        name,
                        close,
                    })
                },
            ),
        ))
        .parse(i)
    })
}

choice! {
    pub enum PrimitiveTypeSuffix<'a> {
        Named(Terminal<'a>),
        Spatial((Terminal<'a>, Option<Terminal<'a>>)),
    }
}

node! {
    pub struct PrimitiveTypeName<'a> {
        pub edm: Terminal<'a>,
        pub name: PrimitiveTypeSuffix<'a>,
    }
}

pub fn primitive_type_name<'a>(input: Input<'a>) -> Output<'a, PrimitiveTypeName<'a>> {
    rule("primitiveTypeName", input, |i| {
        seq((
            literal("Edm."),
            alt((
                keyword(&[
                    "Binary",
                    "Boolean",
                    "Byte",
                    "DateTimeOffset",
                    "Date",
                    "Decimal",
                    "Double",
                    "Duration",
                    "Guid",
                    "Int16",
                    "Int32",
                    "Int64",
                    "SByte",
                    "Single",
                    "Stream",
                    "String",
                    "TimeOfDay",
                ])
                .map(PrimitiveTypeSuffix::Named),
                seq((abstract_spatial_type_name, concrete_spatial_type_name.opt()))
                    .map(PrimitiveTypeSuffix::Spatial),
            )),
        ))
        .map(|(edm, name)| PrimitiveTypeName { edm, name })
        .parse(i)
    })
}

pub fn abstract_spatial_type_name<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("abstractSpatialTypeName", input, |i| {
        keyword(&["Geography", "Geometry"]).parse(i)
    })
}

pub fn concrete_spatial_type_name<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("concreteSpatialTypeName", input, |i| {
        keyword(&[
            "Collection",
            "LineString",
            "MultiLineString",
            "MultiPoint",
            "MultiPolygon",
            "Point",
            "Polygon",
        ])
        .parse(i)
    })
}

// ---- properties

choice! {
    pub enum PrimitiveProperty<'a> {
        Key(PrimitiveKeyProperty<'a>),
        NonKey(PrimitiveNonKeyProperty<'a>),
    }
}

pub fn primitive_property<'a>(input: Input<'a>) -> Output<'a, PrimitiveProperty<'a>> {
    rule("primitiveProperty", input, |i| {
        alt((
            primitive_key_property.map(PrimitiveProperty::Key),
            primitive_non_key_property.map(PrimitiveProperty::NonKey),
        ))
        .parse(i)
    })
}

rename!(
    PrimitiveKeyProperty,
    primitive_key_property,
    "primitiveKeyProperty",
    OdataIdentifier,
    odata_identifier
);
rename!(
    PrimitiveNonKeyProperty,
    primitive_non_key_property,
    "primitiveNonKeyProperty",
    OdataIdentifier,
    odata_identifier
);
rename!(
    PrimitiveColProperty,
    primitive_col_property,
    "primitiveColProperty",
    OdataIdentifier,
    odata_identifier
);
rename!(ComplexProperty, complex_property, "complexProperty", OdataIdentifier, odata_identifier);
rename!(
    ComplexColProperty,
    complex_col_property,
    "complexColProperty",
    OdataIdentifier,
    odata_identifier
);
rename!(StreamProperty, stream_property, "streamProperty", OdataIdentifier, odata_identifier);

choice! {
    pub enum NavigationProperty<'a> {
        Entity(EntityNavigationProperty<'a>),
        EntityCol(EntityColNavigationProperty<'a>),
    }
}

pub fn navigation_property<'a>(input: Input<'a>) -> Output<'a, NavigationProperty<'a>> {
    rule("navigationProperty", input, |i| {
        alt((
            entity_navigation_property.map(NavigationProperty::Entity),
            entity_col_navigation_property.map(NavigationProperty::EntityCol),
        ))
        .parse(i)
    })
}

rename!(
    EntityNavigationProperty,
    entity_navigation_property,
    "entityNavigationProperty",
    OdataIdentifier,
    odata_identifier
);
rename!(
    EntityColNavigationProperty,
    entity_col_navigation_property,
    "entityColNavigationProperty",
    OdataIdentifier,
    odata_identifier
);

// ---- operations

rename!(Action, action, "action", OdataIdentifier, odata_identifier);
rename!(ActionImport, action_import, "actionImport", OdataIdentifier, odata_identifier);

choice! {
    pub enum Function<'a> {
        Entity(EntityFunction<'a>),
        EntityCol(EntityColFunction<'a>),
        Complex(ComplexFunction<'a>),
        ComplexCol(ComplexColFunction<'a>),
        Primitive(PrimitiveFunction<'a>),
        PrimitiveCol(PrimitiveColFunction<'a>),
    }
}

pub fn function<'a>(input: Input<'a>) -> Output<'a, Function<'a>> {
    rule("function", input, |i| {
        alt((
            entity_function.map(Function::Entity),
            entity_col_function.map(Function::EntityCol),
            complex_function.map(Function::Complex),
            complex_col_function.map(Function::ComplexCol),
            primitive_function.map(Function::Primitive),
            primitive_col_function.map(Function::PrimitiveCol),
        ))
        .parse(i)
    })
}

rename!(EntityFunction, entity_function, "entityFunction", OdataIdentifier, odata_identifier);
rename!(
    EntityColFunction,
    entity_col_function,
    "entityColFunction",
    OdataIdentifier,
    odata_identifier
);
rename!(ComplexFunction, complex_function, "complexFunction", OdataIdentifier, odata_identifier);
rename!(
    ComplexColFunction,
    complex_col_function,
    "complexColFunction",
    OdataIdentifier,
    odata_identifier
);
rename!(
    PrimitiveFunction,
    primitive_function,
    "primitiveFunction",
    OdataIdentifier,
    odata_identifier
);
rename!(
    PrimitiveColFunction,
    primitive_col_function,
    "primitiveColFunction",
    OdataIdentifier,
    odata_identifier
);

rename!(
    EntityFunctionImport,
    entity_function_import,
    "entityFunctionImport",
    OdataIdentifier,
    odata_identifier
);
rename!(
    EntityColFunctionImport,
    entity_col_function_import,
    "entityColFunctionImport",
    OdataIdentifier,
    odata_identifier
);
rename!(
    ComplexFunctionImport,
    complex_function_import,
    "complexFunctionImport",
    OdataIdentifier,
    odata_identifier
);
rename!(
    ComplexColFunctionImport,
    complex_col_function_import,
    "complexColFunctionImport",
    OdataIdentifier,
    odata_identifier
);
rename!(
    PrimitiveFunctionImport,
    primitive_function_import,
    "primitiveFunctionImport",
    OdataIdentifier,
    odata_identifier
);
rename!(
    PrimitiveColFunctionImport,
    primitive_col_function_import,
    "primitiveColFunctionImport",
    OdataIdentifier,
    odata_identifier
);

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_identifier() {
        let out = odata_identifier(Input::new("_Name1 eq"));
        assert_eq!(out.value().map(|n| n.source()).as_deref(), Some("_Name1"));
        assert_eq!(out.remainder().rest(), " eq");
        assert!(odata_identifier(Input::new("Größe")).remainder().at_end());
        assert!(!odata_identifier(Input::new("1abc")).is_success());

        // leading character plus at most 127 more
        let long = "a".repeat(200);
        let out = odata_identifier(Input::new(&long));
        assert_eq!(out.remainder().offset(), 128);
        assert_eq!(out.value().map(|n| n.rest.len()), Some(127));
    }

    #[test]
    fn test_namespace_leaves_last_part() {
        let out = namespace(Input::new("Org.OData.Core.Type"));
        assert_eq!(out.value().map(|n| n.source()).as_deref(), Some("Org.OData.Core"));
        assert_eq!(out.remainder().rest(), ".Type");

        let out = qualified_entity_type_name(Input::new("Org.OData.Core.Type"));
        let name = out.value().unwrap();
        assert_eq!(name.namespace.rest.len(), 2);
        assert_eq!(name.name.source(), "Type");

        let out = qualified_entity_type_name(Input::new("Alias.Type/x"));
        assert_eq!(out.remainder().rest(), "/x");
        assert!(!qualified_entity_type_name(Input::new("Type")).is_success());
    }

    #[test]
    fn test_primitive_type_name() {
        for s in ["Edm.Date", "Edm.DateTimeOffset", "Edm.GeographyPoint", "Edm.Geometry"] {
            let out = single_qualified_type_name(Input::new(s));
            assert!(matches!(out.value(), Some(SingleQualifiedTypeName::Primitive(_))), "{s}");
            assert!(out.remainder().at_end(), "{s}");
        }
        let out = single_qualified_type_name(Input::new("Edm.StringList"));
        assert!(matches!(out.value(), Some(SingleQualifiedTypeName::Entity(_))));
        assert!(out.remainder().at_end());
        // case sensitive
        assert!(!primitive_type_name(Input::new("edm.String")).is_success());
    }

    #[test]
    fn test_collection_type_name() {
        let out = qualified_type_name(Input::new("Collection(NS.Item)"));
        assert!(matches!(out.value(), Some(QualifiedTypeName::Collection(_))));
        assert!(out.remainder().at_end());
        let out = qualified_type_name(Input::new("NS.Item"));
        assert!(matches!(out.value(), Some(QualifiedTypeName::Single(_))));
    }
}
