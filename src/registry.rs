//! Rules looked up by their ABNF name.
//!
//! Handy for tools and tests that pick a rule at run time. The parsers are the
//! same functions as in [`crate::grammar`]; the registry only erases the node
//! type.

use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;

use crate::combo::alt;
use crate::cst::Node;
use crate::cursor::Input;
use crate::error::ParseError;
use crate::grammar::*;
use crate::output::Output;
use crate::parser::Parser;
use crate::LOG_TARGET;

/// A rule with its node type erased.
pub type RuleFn = for<'a> fn(Input<'a>) -> Output<'a, Box<dyn Node + 'a>>;

fn boxed<'a, T: Node + 'a>(node: T) -> Box<dyn Node + 'a> {
    Box::new(node)
}

// the JSON section defines this rule twice, once per element kind
fn collection_property_in_uri<'a>(input: Input<'a>) -> Output<'a, Box<dyn Node + 'a>> {
    alt((
        primitive_col_property_in_uri.map(boxed),
        complex_col_property_in_uri.map(boxed),
    ))
    .parse(input)
}

macro_rules! rules {
    ($($name:literal => $func:path,)*) => {{
        let mut map: HashMap<&'static str, RuleFn> = HashMap::new();
        $({
            fn erased<'a>(input: Input<'a>) -> Output<'a, Box<dyn Node + 'a>> {
                $func(input).map(boxed)
            }
            map.insert($name, erased as RuleFn);
        })*
        map
    }};
}

static RULES: Lazy<HashMap<&'static str, RuleFn>> = Lazy::new(|| {
    let mut map = rules! {
        // punctuation
        "ALPHA" => alpha,
        "DIGIT" => digit,
        "HEXDIG" => hexdig,
        "A-to-F" => a_to_f,
        "DQUOTE" => dquote,
        "SP" => sp,
        "HTAB" => htab,
        "VCHAR" => vchar,
        "obs-text" => obs_text,
        "RWS" => rws,
        "BWS" => bws,
        "AT" => at,
        "COLON" => colon,
        "COMMA" => comma,
        "EQ" => eq,
        "SIGN" => sign,
        "SEMI" => semi,
        "STAR" => star,
        "SQUOTE" => squote,
        "OPEN" => open,
        "CLOSE" => close,
        // uri
        "pct-encoded" => pct_encoded,
        "pct-encoded-no-SQUOTE" => pct_encoded_no_squote,
        "pct-encoded-unescaped" => pct_encoded_unescaped,
        "unreserved" => unreserved,
        "sub-delims" => sub_delims,
        "other-delims" => other_delims,
        "pchar" => pchar,
        "pchar-no-SQUOTE" => pchar_no_squote,
        "qchar-no-AMP" => qchar_no_amp,
        "qchar-no-AMP-EQ" => qchar_no_amp_eq,
        "qchar-no-AMP-EQ-AT-DOLLAR" => qchar_no_amp_eq_at_dollar,
        "qchar-unescaped" => qchar_unescaped,
        "qchar-no-AMP-DQUOTE" => qchar_no_amp_dquote,
        "URI" => uri,
        "hier-part" => hier_part,
        "scheme" => scheme,
        "authority" => authority,
        "userinfo" => userinfo,
        "host" => host,
        "port" => port,
        "IP-literal" => ip_literal,
        "IPvFuture" => ipv_future,
        "IPv6address" => ipv6address,
        "h16" => h16,
        "ls32" => ls32,
        "IPv4address" => ipv4address,
        "dec-octet" => dec_octet,
        "reg-name" => reg_name,
        "path-abempty" => path_abempty,
        "path-absolute" => path_absolute,
        "path-rootless" => path_rootless,
        "segment" => segment,
        "segment-nz" => segment_nz,
        "query" => query,
        "fragment" => fragment,
        "IRI-in-header" => iri_in_header,
        "IRI-in-query" => iri_in_query,
        // names
        "odataIdentifier" => odata_identifier,
        "identifierLeadingCharacter" => identifier_leading_character,
        "identifierCharacter" => identifier_character,
        "namespacePart" => namespace_part,
        "namespace" => namespace,
        "entitySetName" => entity_set_name,
        "singletonEntity" => singleton_entity,
        "entityTypeName" => entity_type_name,
        "complexTypeName" => complex_type_name,
        "typeDefinitionName" => type_definition_name,
        "enumerationTypeName" => enumeration_type_name,
        "enumerationMember" => enumeration_member,
        "termName" => term_name,
        "qualifiedEntityTypeName" => qualified_entity_type_name,
        "qualifiedComplexTypeName" => qualified_complex_type_name,
        "qualifiedTypeDefinitionName" => qualified_type_definition_name,
        "qualifiedEnumTypeName" => qualified_enum_type_name,
        "qualifiedActionName" => qualified_action_name,
        "singleQualifiedTypeName" => single_qualified_type_name,
        "qualifiedTypeName" => qualified_type_name,
        "primitiveTypeName" => primitive_type_name,
        "abstractSpatialTypeName" => abstract_spatial_type_name,
        "concreteSpatialTypeName" => concrete_spatial_type_name,
        "primitiveProperty" => primitive_property,
        "primitiveKeyProperty" => primitive_key_property,
        "primitiveNonKeyProperty" => primitive_non_key_property,
        "primitiveColProperty" => primitive_col_property,
        "complexProperty" => complex_property,
        "complexColProperty" => complex_col_property,
        "streamProperty" => stream_property,
        "navigationProperty" => navigation_property,
        "entityNavigationProperty" => entity_navigation_property,
        "entityColNavigationProperty" => entity_col_navigation_property,
        "action" => action,
        "actionImport" => action_import,
        "function" => function,
        "entityFunction" => entity_function,
        "entityColFunction" => entity_col_function,
        "complexFunction" => complex_function,
        "complexColFunction" => complex_col_function,
        "primitiveFunction" => primitive_function,
        "primitiveColFunction" => primitive_col_function,
        "entityFunctionImport" => entity_function_import,
        "entityColFunctionImport" => entity_col_function_import,
        "complexFunctionImport" => complex_function_import,
        "complexColFunctionImport" => complex_col_function_import,
        "primitiveFunctionImport" => primitive_function_import,
        "primitiveColFunctionImport" => primitive_col_function_import,
        // literals
        "primitiveLiteral" => primitive_literal,
        "primitiveValue" => primitive_value,
        "nullValue" => null_value,
        "binary" => binary,
        "binaryValue" => binary_value,
        "base64b16" => base64b16,
        "base64b8" => base64b8,
        "base64char" => base64char,
        "booleanValue" => boolean_value,
        "decimalValue" => decimal_value,
        "doubleValue" => double_value,
        "singleValue" => single_value,
        "nanInfinity" => nan_infinity,
        "guidValue" => guid_value,
        "byteValue" => byte_value,
        "sbyteValue" => sbyte_value,
        "int16Value" => int16_value,
        "int32Value" => int32_value,
        "int64Value" => int64_value,
        "SQUOTE-in-string" => squote_in_string,
        "string" => string,
        "dateValue" => date_value,
        "dateTimeOffsetValue" => date_time_offset_value,
        "duration" => duration,
        "durationValue" => duration_value,
        "timeOfDayValue" => time_of_day_value,
        "oneToNine" => one_to_nine,
        "zeroToFiftyNine" => zero_to_fifty_nine,
        "minute" => minute,
        "second" => second,
        "year" => year,
        "month" => month,
        "day" => day,
        "hour" => hour,
        "fractionalSeconds" => fractional_seconds,
        "enum" => enum_literal,
        "enumValue" => enum_value,
        "singleEnumValue" => single_enum_value,
        "enumMemberValue" => enum_member_value,
        // geo
        "geographyPrefix" => geography_prefix,
        "geometryPrefix" => geometry_prefix,
        "geographyCollection" => geography_collection,
        "geographyLineString" => geography_line_string,
        "geographyMultiLineString" => geography_multi_line_string,
        "geographyMultiPoint" => geography_multi_point,
        "geographyMultiPolygon" => geography_multi_polygon,
        "geographyPoint" => geography_point,
        "geographyPolygon" => geography_polygon,
        "geometryCollection" => geometry_collection,
        "geometryLineString" => geometry_line_string,
        "geometryMultiLineString" => geometry_multi_line_string,
        "geometryMultiPoint" => geometry_multi_point,
        "geometryMultiPolygon" => geometry_multi_polygon,
        "geometryPoint" => geometry_point,
        "geometryPolygon" => geometry_polygon,
        "fullCollectionLiteral" => full_collection_literal,
        "fullLineStringLiteral" => full_line_string_literal,
        "fullMultiLineStringLiteral" => full_multi_line_string_literal,
        "fullMultiPointLiteral" => full_multi_point_literal,
        "fullMultiPolygonLiteral" => full_multi_polygon_literal,
        "fullPointLiteral" => full_point_literal,
        "fullPolygonLiteral" => full_polygon_literal,
        "sridLiteral" => srid_literal,
        "collectionLiteral" => collection_literal,
        "geoLiteral" => geo_literal,
        "lineStringLiteral" => line_string_literal,
        "lineStringData" => line_string_data,
        "multiLineStringLiteral" => multi_line_string_literal,
        "multiPointLiteral" => multi_point_literal,
        "multiPolygonLiteral" => multi_polygon_literal,
        "pointLiteral" => point_literal,
        "pointData" => point_data,
        "positionLiteral" => position_literal,
        "polygonLiteral" => polygon_literal,
        "polygonData" => polygon_data,
        "ringLiteral" => ring_literal,
        // json
        "arrayOrObject" => array_or_object,
        "complexColInUri" => complex_col_in_uri,
        "complexInUri" => complex_in_uri,
        "complexPropertyInUri" => complex_property_in_uri,
        "primitivePropertyInUri" => primitive_property_in_uri,
        "singleNavPropInJSON" => single_nav_prop_in_json,
        "collectionNavPropInJSON" => collection_nav_prop_in_json,
        "primitiveColInUri" => primitive_col_in_uri,
        "annotationInUri" => annotation_in_uri,
        "navigationPropertyInUri" => navigation_property_in_uri,
        "rootExprCol" => root_expr_col,
        "begin-object" => begin_object,
        "end-object" => end_object,
        "begin-array" => begin_array,
        "end-array" => end_array,
        "quotation-mark" => quotation_mark,
        "name-separator" => name_separator,
        "value-separator" => value_separator,
        "primitiveLiteralInJSON" => primitive_literal_in_json,
        "stringInJSON" => string_in_json,
        "charInJSON" => char_in_json,
        "qchar-JSON-special" => qchar_json_special,
        "escape" => escape,
        "numberInJSON" => number_in_json,
        "int" => int,
        "frac" => frac,
        "exp" => exp,
        // expr
        "commonExpr" => common_expr,
        "boolCommonExpr" => bool_common_expr,
        "andExpr" => and_expr,
        "orExpr" => or_expr,
        "eqExpr" => eq_expr,
        "neExpr" => ne_expr,
        "ltExpr" => lt_expr,
        "leExpr" => le_expr,
        "gtExpr" => gt_expr,
        "geExpr" => ge_expr,
        "inExpr" => in_expr,
        "hasExpr" => has_expr,
        "addExpr" => add_expr,
        "subExpr" => sub_expr,
        "mulExpr" => mul_expr,
        "divExpr" => div_expr,
        "divbyExpr" => divby_expr,
        "modExpr" => mod_expr,
        "negateExpr" => negate_expr,
        "notExpr" => not_expr,
        "isofExpr" => isof_expr,
        "castExpr" => cast_expr,
        "parenExpr" => paren_expr,
        "listExpr" => list_expr,
        "rootExpr" => root_expr,
        "firstMemberExpr" => first_member_expr,
        "memberExpr" => member_expr,
        "propertyPathExpr" => property_path_expr,
        "annotationExpr" => annotation_expr,
        "annotation" => annotation,
        "annotationQualifier" => annotation_qualifier,
        "inscopeVariableExpr" => inscope_variable_expr,
        "implicitVariableExpr" => implicit_variable_expr,
        "lambdaVariableExpr" => lambda_variable_expr,
        "collectionNavigationExpr" => collection_navigation_expr,
        "singleNavigationExpr" => single_navigation_expr,
        "complexColPathExpr" => complex_col_path_expr,
        "collectionPathExpr" => collection_path_expr,
        "complexPathExpr" => complex_path_expr,
        "primitivePathExpr" => primitive_path_expr,
        "boundFunctionExpr" => bound_function_expr,
        "functionExpr" => function_expr,
        "functionExprParameters" => function_expr_parameters,
        "functionExprParameter" => function_expr_parameter,
        "anyExpr" => any_expr,
        "allExpr" => all_expr,
        "lambdaPredicateExpr" => lambda_predicate_expr,
        "concatMethodCallExpr" => concat_method_call_expr,
        "containsMethodCallExpr" => contains_method_call_expr,
        "endsWithMethodCallExpr" => ends_with_method_call_expr,
        "indexOfMethodCallExpr" => index_of_method_call_expr,
        "lengthMethodCallExpr" => length_method_call_expr,
        "startsWithMethodCallExpr" => starts_with_method_call_expr,
        "substringMethodCallExpr" => substring_method_call_expr,
        "toLowerMethodCallExpr" => to_lower_method_call_expr,
        "toUpperMethodCallExpr" => to_upper_method_call_expr,
        "trimMethodCallExpr" => trim_method_call_expr,
        "yearMethodCallExpr" => year_method_call_expr,
        "monthMethodCallExpr" => month_method_call_expr,
        "dayMethodCallExpr" => day_method_call_expr,
        "hourMethodCallExpr" => hour_method_call_expr,
        "minuteMethodCallExpr" => minute_method_call_expr,
        "secondMethodCallExpr" => second_method_call_expr,
        "fractionalsecondsMethodCallExpr" => fractionalseconds_method_call_expr,
        "totalsecondsMethodCallExpr" => totalseconds_method_call_expr,
        "dateMethodCallExpr" => date_method_call_expr,
        "timeMethodCallExpr" => time_method_call_expr,
        "totalOffsetMinutesMethodCallExpr" => total_offset_minutes_method_call_expr,
        "minDateTimeMethodCallExpr" => min_date_time_method_call_expr,
        "maxDateTimeMethodCallExpr" => max_date_time_method_call_expr,
        "nowMethodCallExpr" => now_method_call_expr,
        "roundMethodCallExpr" => round_method_call_expr,
        "floorMethodCallExpr" => floor_method_call_expr,
        "ceilingMethodCallExpr" => ceiling_method_call_expr,
        "distanceMethodCallExpr" => distance_method_call_expr,
        "geoLengthMethodCallExpr" => geo_length_method_call_expr,
        "intersectsMethodCallExpr" => intersects_method_call_expr,
        "hasSubsetMethodCallExpr" => has_subset_method_call_expr,
        "hasSubsequenceMethodCallExpr" => has_subsequence_method_call_expr,
        "methodCallExpr" => method_call_expr,
        "boolMethodCallExpr" => bool_method_call_expr,
        // resource
        "odataUri" => odata_uri,
        "serviceRoot" => service_root,
        "odataRelativeUri" => odata_relative_uri,
        "resourcePath" => resource_path,
        "collectionNavigation" => collection_navigation,
        "collectionNavPath" => collection_nav_path,
        "keyPredicate" => key_predicate,
        "simpleKey" => simple_key,
        "compoundKey" => compound_key,
        "keyValuePair" => key_value_pair,
        "keyPropertyValue" => key_property_value,
        "keyPropertyAlias" => key_property_alias,
        "keyPathSegments" => key_path_segments,
        "keyPathLiteral" => key_path_literal,
        "singleNavigation" => single_navigation,
        "propertyPath" => property_path,
        "primitiveColPath" => primitive_col_path,
        "primitivePath" => primitive_path,
        "complexColPath" => complex_col_path,
        "complexPath" => complex_path,
        "filterInPath" => filter_in_path,
        "each" => each,
        "count" => count,
        "ref" => r#ref,
        "value" => value,
        "ordinalIndex" => ordinal_index,
        "boundOperation" => bound_operation,
        "actionImportCall" => action_import_call,
        "boundActionCall" => bound_action_call,
        "boundEntityFunctionCall" => bound_entity_function_call,
        "boundEntityColFunctionCall" => bound_entity_col_function_call,
        "boundComplexFunctionCall" => bound_complex_function_call,
        "boundComplexColFunctionCall" => bound_complex_col_function_call,
        "boundPrimitiveFunctionCall" => bound_primitive_function_call,
        "boundPrimitiveColFunctionCall" => bound_primitive_col_function_call,
        "boundFunctionCallNoParens" => bound_function_call_no_parens,
        "entityFunctionImportCall" => entity_function_import_call,
        "entityColFunctionImportCall" => entity_col_function_import_call,
        "complexFunctionImportCall" => complex_function_import_call,
        "complexColFunctionImportCall" => complex_col_function_import_call,
        "primitiveFunctionImportCall" => primitive_function_import_call,
        "primitiveColFunctionImportCall" => primitive_col_function_import_call,
        "functionImportCallNoParens" => function_import_call_no_parens,
        "functionParameters" => function_parameters,
        "functionParameter" => function_parameter,
        "parameterName" => parameter_name,
        "parameterAlias" => parameter_alias,
        "crossjoin" => crossjoin,
        // query
        "queryOptions" => query_options,
        "queryOption" => query_option,
        "batchOptions" => batch_options,
        "batchOption" => batch_option,
        "metadataOptions" => metadata_options,
        "metadataOption" => metadata_option,
        "entityIdOption" => entity_id_option,
        "entityOptions" => entity_options,
        "entityCastOption" => entity_cast_option,
        "entityCastOptions" => entity_cast_options,
        "id" => id,
        "systemQueryOption" => system_query_option,
        "compute" => compute,
        "computeItem" => compute_item,
        "computedProperty" => computed_property,
        "expand" => expand,
        "expandItem" => expand_item,
        "expandPath" => expand_path,
        "expandCountOption" => expand_count_option,
        "expandRefOption" => expand_ref_option,
        "expandOption" => expand_option,
        "levels" => levels,
        "filter" => filter,
        "orderby" => orderby,
        "orderbyItem" => orderby_item,
        "skip" => skip,
        "top" => top,
        "index" => index,
        "format" => format,
        "inlinecount" => inlinecount,
        "schemaversion" => schemaversion,
        "search" => search,
        "searchExpr" => search_expr,
        "searchOrExpr" => search_or_expr,
        "searchAndExpr" => search_and_expr,
        "searchTerm" => search_term,
        "searchPhrase" => search_phrase,
        "searchWord" => search_word,
        "select" => select,
        "selectItem" => select_item,
        "selectProperty" => select_property,
        "selectPath" => select_path,
        "selectOptionPC" => select_option_pc,
        "selectOption" => select_option,
        "allOperationsInSchema" => all_operations_in_schema,
        "qualifiedFunctionName" => qualified_function_name,
        "parameterNames" => parameter_names,
        "deltatoken" => deltatoken,
        "skiptoken" => skiptoken,
        "aliasAndValue" => alias_and_value,
        "nameAndValue" => name_and_value,
        "parameterValue" => parameter_value,
        "customQueryOption" => custom_query_option,
        "customName" => custom_name,
        "customValue" => custom_value,
        // context
        "context" => context,
        "contextFragment" => context_fragment,
        "entitySet" => entity_set,
        "containmentNavigation" => containment_navigation,
        "navigation" => navigation,
        "selectList" => select_list,
        "selectListItem" => select_list_item,
        "selectListProperty" => select_list_property,
        "contextPropertyPath" => context_property_path,
    };
    map.insert("collectionPropertyInUri", collection_property_in_uri as RuleFn);
    map
});

pub fn lookup(name: &str) -> Option<RuleFn> {
    RULES.get(name).copied()
}

/// Runs the rule called `name` (as spelled in the ABNF, e.g. `keyPredicate`).
pub fn parse_rule<'a>(name: &str, input: Input<'a>) -> Result<Output<'a, Box<dyn Node + 'a>>, ParseError> {
    match lookup(name) {
        Some(rule) => Ok(rule(input)),
        None => {
            debug!(target: LOG_TARGET, "no rule named '{name}'");
            Err(ParseError::UnknownRule(name.to_string()))
        }
    }
}

/// Every registered rule name, sorted.
pub fn rule_names() -> Vec<&'static str> {
    let mut names: Vec<_> = RULES.keys().copied().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_parse_rule() {
        let out = parse_rule("top", Input::new("$top=5")).unwrap();
        assert!(out.remainder().at_end());
        assert_eq!(out.value().unwrap().source(), "$top=5");

        let out = parse_rule("keyPredicate", Input::new("(OrderID=1)x")).unwrap();
        assert_eq!(out.remainder().rest(), "x");

        assert_eq!(
            parse_rule("noSuchRule", Input::new("")).unwrap_err(),
            ParseError::UnknownRule("noSuchRule".to_string())
        );
    }

    #[test]
    fn test_rule_names() {
        let names = rule_names();
        for name in ["odataUri", "commonExpr", "context", "RWS", "IPv6address", "collectionPropertyInUri"] {
            assert!(names.binary_search(&name).is_ok(), "{name} missing");
        }
        assert!(names.len() > 300);
    }

    #[test]
    fn test_every_rule_is_lossless() {
        let samples = [
            "",
            "$top=5",
            "People('x')/Friends",
            "Price add 2 gt 10",
            "geography'SRID=0;Point(1 2)'",
            "{\"a\":[1,2]}",
        ];
        for name in rule_names() {
            for text in samples {
                let inp = Input::new(text);
                let out = parse_rule(name, inp).unwrap();
                match out.value() {
                    Some(node) => assert_eq!(
                        node.source(),
                        inp.span_to(&out.remainder()),
                        "{name} on {text:?}"
                    ),
                    None => assert_eq!(out.remainder(), inp, "{name} on {text:?}"),
                }
            }
        }
    }
}
