//! Geography and geometry literals.

use crate::prelude::*;
use crate::{choice, node};

use super::literals::{double_value, DoubleValue};
use super::punctuation::{close, comma, digit, eq, open, semi, sp, squote};

pub fn geography_prefix<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("geographyPrefix", input, |i| literal_ci("geography").parse(i))
}

pub fn geometry_prefix<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("geometryPrefix", input, |i| literal_ci("geometry").parse(i))
}

// `prefix SQUOTE full-literal SQUOTE`
macro_rules! quoted_geo {
    ($name:ident, $func:ident, $abnf:literal, $prefix:ident, $full:ident, $full_func:ident) => {
        node! {
            pub struct $name<'a> {
                pub prefix: Terminal<'a>,
                pub open: Terminal<'a>,
                pub literal: $full<'a>,
                pub close: Terminal<'a>,
            }
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| {
                seq(($prefix, squote, $full_func, squote))
                    .map(|(prefix, open, literal, close)| $name {
                        prefix,
                        open,
                        literal,
                        close,
                    })
                    .parse(i)
            })
        }
    };
}

quoted_geo!(
    GeographyCollection,
    geography_collection,
    "geographyCollection",
    geography_prefix,
    FullCollectionLiteral,
    full_collection_literal
);
quoted_geo!(
    GeographyLineString,
    geography_line_string,
    "geographyLineString",
    geography_prefix,
    FullLineStringLiteral,
    full_line_string_literal
);
quoted_geo!(
    GeographyMultiLineString,
    geography_multi_line_string,
    "geographyMultiLineString",
    geography_prefix,
    FullMultiLineStringLiteral,
    full_multi_line_string_literal
);
quoted_geo!(
    GeographyMultiPoint,
    geography_multi_point,
    "geographyMultiPoint",
    geography_prefix,
    FullMultiPointLiteral,
    full_multi_point_literal
);
quoted_geo!(
    GeographyMultiPolygon,
    geography_multi_polygon,
    "geographyMultiPolygon",
    geography_prefix,
    FullMultiPolygonLiteral,
    full_multi_polygon_literal
);
quoted_geo!(
    GeographyPoint,
    geography_point,
    "geographyPoint",
    geography_prefix,
    FullPointLiteral,
    full_point_literal
);
quoted_geo!(
    GeographyPolygon,
    geography_polygon,
    "geographyPolygon",
    geography_prefix,
    FullPolygonLiteral,
    full_polygon_literal
);
quoted_geo!(
    GeometryCollection,
    geometry_collection,
    "geometryCollection",
    geometry_prefix,
    FullCollectionLiteral,
    full_collection_literal
);
quoted_geo!(
    GeometryLineString,
    geometry_line_string,
    "geometryLineString",
    geometry_prefix,
    FullLineStringLiteral,
    full_line_string_literal
);
quoted_geo!(
    GeometryMultiLineString,
    geometry_multi_line_string,
    "geometryMultiLineString",
    geometry_prefix,
    FullMultiLineStringLiteral,
    full_multi_line_string_literal
);
quoted_geo!(
    GeometryMultiPoint,
    geometry_multi_point,
    "geometryMultiPoint",
    geometry_prefix,
    FullMultiPointLiteral,
    full_multi_point_literal
);
quoted_geo!(
    GeometryMultiPolygon,
    geometry_multi_polygon,
    "geometryMultiPolygon",
    geometry_prefix,
    FullMultiPolygonLiteral,
    full_multi_polygon_literal
);
quoted_geo!(
    GeometryPoint,
    geometry_point,
    "geometryPoint",
    geometry_prefix,
    FullPointLiteral,
    full_point_literal
);
quoted_geo!(
    GeometryPolygon,
    geometry_polygon,
    "geometryPolygon",
    geometry_prefix,
    FullPolygonLiteral,
    full_polygon_literal
);

// `sridLiteral literal`
macro_rules! full_geo {
    ($name:ident, $func:ident, $abnf:literal, $inner:ident, $inner_func:ident) => {
        node! {
            pub struct $name<'a> {
                pub srid: SridLiteral<'a>,
                pub literal: $inner<'a>,
            }
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| {
                seq((srid_literal, $inner_func))
                    .map(|(srid, literal)| $name { srid, literal })
                    .parse(i)
            })
        }
    };
}

full_geo!(
    FullCollectionLiteral,
    full_collection_literal,
    "fullCollectionLiteral",
    CollectionLiteral,
    collection_literal
);
full_geo!(
    FullLineStringLiteral,
    full_line_string_literal,
    "fullLineStringLiteral",
    LineStringLiteral,
    line_string_literal
);
full_geo!(
    FullMultiLineStringLiteral,
    full_multi_line_string_literal,
    "fullMultiLineStringLiteral",
    MultiLineStringLiteral,
    multi_line_string_literal
);
full_geo!(
    FullMultiPointLiteral,
    full_multi_point_literal,
    "fullMultiPointLiteral",
    MultiPointLiteral,
    multi_point_literal
);
full_geo!(
    FullMultiPolygonLiteral,
    full_multi_polygon_literal,
    "fullMultiPolygonLiteral",
    MultiPolygonLiteral,
    multi_polygon_literal
);
full_geo!(
    FullPointLiteral,
    full_point_literal,
    "fullPointLiteral",
    PointLiteral,
    point_literal
);
full_geo!(
    FullPolygonLiteral,
    full_polygon_literal,
    "fullPolygonLiteral",
    PolygonLiteral,
    polygon_literal
);

node! {
    pub struct SridLiteral<'a> {
        pub srid: Terminal<'a>,
        pub eq: Terminal<'a>,
        pub digits: Repeated<Terminal<'a>, 1, 5>,
        pub semi: Terminal<'a>,
    }
}

pub fn srid_literal<'a>(input: Input<'a>) -> Output<'a, SridLiteral<'a>> {
    rule("sridLiteral", input, |i| {
        seq((literal_ci("SRID"), eq, digit.repeat::<1, 5>(), semi))
            .map(|(srid, eq, digits, semi)| SridLiteral {
                srid,
                eq,
                digits,
                semi,
            })
            .parse(i)
    })
}

node! {
    pub struct CollectionLiteral<'a> {
        pub open: Terminal<'a>,
        pub items: Delimited<GeoLiteral<'a>, Terminal<'a>>,
        pub close: Terminal<'a>,
    }
}

pub fn collection_literal<'a>(input: Input<'a>) -> Output<'a, CollectionLiteral<'a>> {
    rule("collectionLiteral", input, |i| {
        seq((literal_ci("Collection("), sep_by(geo_literal, comma), close))
            .map(|(open, items, close)| CollectionLiteral { open, items, close })
            .parse(i)
    })
}

choice! {
    pub enum GeoLiteral<'a> {
        Collection(Box<CollectionLiteral<'a>>),
        LineString(LineStringLiteral<'a>),
        MultiPoint(MultiPointLiteral<'a>),
        MultiLineString(MultiLineStringLiteral<'a>),
        MultiPolygon(MultiPolygonLiteral<'a>),
        Point(PointLiteral<'a>),
        Polygon(PolygonLiteral<'a>),
    }
}

pub fn geo_literal<'a>(input: Input<'a>) -> Output<'a, GeoLiteral<'a>> {
    rule("geoLiteral", input, |i| {
        alt((
            collection_literal.map(|c| GeoLiteral::Collection(Box::new(c))),
            line_string_literal.map(GeoLiteral::LineString),
            multi_point_literal.map(GeoLiteral::MultiPoint),
            multi_line_string_literal.map(GeoLiteral::MultiLineString),
            multi_polygon_literal.map(GeoLiteral::MultiPolygon),
            point_literal.map(GeoLiteral::Point),
            polygon_literal.map(GeoLiteral::Polygon),
        ))
        .parse(i)
    })
}

node! {
    pub struct LineStringLiteral<'a> {
        pub keyword: Terminal<'a>,
        pub data: LineStringData<'a>,
    }
}

pub fn line_string_literal<'a>(input: Input<'a>) -> Output<'a, LineStringLiteral<'a>> {
    rule("lineStringLiteral", input, |i| {
        seq((literal_ci("LineString"), line_string_data))
            .map(|(keyword, data)| LineStringLiteral { keyword, data })
            .parse(i)
    })
}

node! {
    /// At least two positions.
    pub struct LineStringData<'a> {
        pub open: Terminal<'a>,
        pub first: PositionLiteral<'a>,
        pub rest: Plus<(Terminal<'a>, PositionLiteral<'a>)>,
        pub close: Terminal<'a>,
    }
}

pub fn line_string_data<'a>(input: Input<'a>) -> Output<'a, LineStringData<'a>> {
    rule("lineStringData", input, |i| {
        seq((
            open,
            position_literal,
            seq((comma, position_literal)).repeat::<1, UNBOUNDED>(),
            close,
        ))
        .map(|(open, first, rest, close)| LineStringData {
            open,
            first,
            rest,
            close,
        })
        .parse(i)
    })
}

node! {
    pub struct MultiLineStringLiteral<'a> {
        pub open: Terminal<'a>,
        pub items: Option<Delimited<LineStringData<'a>, Terminal<'a>>>,
        pub close: Terminal<'a>,
    }
}

pub fn multi_line_string_literal<'a>(input: Input<'a>) -> Output<'a, MultiLineStringLiteral<'a>> {
    rule("multiLineStringLiteral", input, |i| {
        seq((
            literal_ci("MultiLineString("),
            sep_by(line_string_data, comma).opt(),
            close,
        ))
        .map(|(open, items, close)| MultiLineStringLiteral { open, items, close })
        .parse(i)
    })
}

node! {
    pub struct MultiPointLiteral<'a> {
        pub open: Terminal<'a>,
        pub items: Option<Delimited<PointData<'a>, Terminal<'a>>>,
        pub close: Terminal<'a>,
    }
}

pub fn multi_point_literal<'a>(input: Input<'a>) -> Output<'a, MultiPointLiteral<'a>> {
    rule("multiPointLiteral", input, |i| {
        seq((literal_ci("MultiPoint("), sep_by(point_data, comma).opt(), close))
            .map(|(open, items, close)| MultiPointLiteral { open, items, close })
            .parse(i)
    })
}

node! {
    pub struct MultiPolygonLiteral<'a> {
        pub open: Terminal<'a>,
        pub items: Option<Delimited<PolygonData<'a>, Terminal<'a>>>,
        pub close: Terminal<'a>,
    }
}

pub fn multi_polygon_literal<'a>(input: Input<'a>) -> Output<'a, MultiPolygonLiteral<'a>> {
    rule("multiPolygonLiteral", input, |i| {
        seq((literal_ci("MultiPolygon("), sep_by(polygon_data, comma).opt(), close))
            .map(|(open, items, close)| MultiPolygonLiteral { open, items, close })
            .parse(i)
    })
}

node! {
    pub struct PointLiteral<'a> {
        pub keyword: Terminal<'a>,
        pub data: PointData<'a>,
    }
}

pub fn point_literal<'a>(input: Input<'a>) -> Output<'a, PointLiteral<'a>> {
    rule("pointLiteral", input, |i| {
        seq((literal_ci("Point"), point_data))
            .map(|(keyword, data)| PointLiteral { keyword, data })
            .parse(i)
    })
}

node! {
    pub struct PointData<'a> {
        pub open: Terminal<'a>,
        pub position: PositionLiteral<'a>,
        pub close: Terminal<'a>,
    }
}

pub fn point_data<'a>(input: Input<'a>) -> Output<'a, PointData<'a>> {
    rule("pointData", input, |i| {
        seq((open, position_literal, close))
            .map(|(open, position, close)| PointData {
                open,
                position,
                close,
            })
            .parse(i)
    })
}

node! {
    pub struct PositionLiteral<'a> {
        pub longitude: DoubleValue<'a>,
        pub sp: Terminal<'a>,
        pub latitude: DoubleValue<'a>,
    }
}

pub fn position_literal<'a>(input: Input<'a>) -> Output<'a, PositionLiteral<'a>> {
    rule("positionLiteral", input, |i| {
        seq((double_value, sp, double_value))
            .map(|(longitude, sp, latitude)| PositionLiteral {
                longitude,
                sp,
                latitude,
            })
            .parse(i)
    })
}

node! {
    pub struct PolygonLiteral<'a> {
        pub keyword: Terminal<'a>,
        pub data: PolygonData<'a>,
    }
}

pub fn polygon_literal<'a>(input: Input<'a>) -> Output<'a, PolygonLiteral<'a>> {
    rule("polygonLiteral", input, |i| {
        seq((literal_ci("Polygon"), polygon_data))
            .map(|(keyword, data)| PolygonLiteral { keyword, data })
            .parse(i)
    })
}

node! {
    pub struct PolygonData<'a> {
        pub open: Terminal<'a>,
        pub rings: Delimited<RingLiteral<'a>, Terminal<'a>>,
        pub close: Terminal<'a>,
    }
}

pub fn polygon_data<'a>(input: Input<'a>) -> Output<'a, PolygonData<'a>> {
    rule("polygonData", input, |i| {
        seq((open, sep_by(ring_literal, comma), close))
            .map(|(open, rings, close)| PolygonData { open, rings, close })
            .parse(i)
    })
}

node! {
    /// The first and last positions are meant to coincide; that is not checked.
    pub struct RingLiteral<'a> {
        pub open: Terminal<'a>,
        pub positions: Delimited<PositionLiteral<'a>, Terminal<'a>>,
        pub close: Terminal<'a>,
    }
}

pub fn ring_literal<'a>(input: Input<'a>) -> Output<'a, RingLiteral<'a>> {
    rule("ringLiteral", input, |i| {
        seq((open, sep_by(position_literal, comma), close))
            .map(|(open, positions, close)| RingLiteral {
                open,
                positions,
                close,
            })
            .parse(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_geography_point() {
        let s = "geography'SRID=0;Point(142.1 64.1)'";
        let out = geography_point(Input::new(s));
        let p = out.value().unwrap();
        assert_eq!(p.source(), s);
        assert_eq!(p.literal.literal.data.position.longitude.source(), "142.1");
        assert_eq!(p.literal.literal.data.position.latitude.source(), "64.1");
    }

    #[test]
    fn test_truncated_literals_fail() {
        for s in ["geo'", "geography'", "geography'SRID=0;Point(142.1 64.1)", "geography'SRID=0;Point(1)'"] {
            let inp = Input::new(s);
            let out = geography_point(inp);
            assert!(!out.is_success(), "{s}");
            assert_eq!(out.remainder(), inp);
        }
    }

    #[test]
    fn test_collection_nests() {
        let s = "SRID=4326;Collection(Point(1 2),Collection(LineString(1 1,2 2)))";
        let out = full_collection_literal(Input::new(s));
        assert!(out.remainder().at_end());
        let c = out.value().unwrap();
        assert_eq!(c.literal.items.len(), 2);
        assert!(matches!(c.literal.items.first, GeoLiteral::Point(_)));
        assert!(matches!(c.literal.items.rest[0].1, GeoLiteral::Collection(_)));
    }

    #[test]
    fn test_shapes() {
        assert!(line_string_data(Input::new("(1 1)")).value().is_none());
        assert!(multi_point_literal(Input::new("MultiPoint()")).remainder().at_end());
        let out = polygon_literal(Input::new("Polygon((0 0,1 0,1 1,0 0),(0 0,0 1,0 0))"));
        assert_eq!(out.value().map(|p| p.data.rings.len()), Some(2));
        assert!(srid_literal(Input::new("srid=123456;")).value().is_none());
    }
}
