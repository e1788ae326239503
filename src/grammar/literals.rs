//! Literal data values.

use crate::prelude::*;
use crate::{choice, node, rename};

use super::geo::*;
use super::names::{enumeration_member, qualified_enum_type_name, EnumerationMember, QualifiedEnumTypeName};
use super::punctuation::{alpha, comma, digit, hexdig, sign, squote};
use super::uri::{pchar_no_squote, UriChar};

choice! {
    /// A literal in a URL. Several literal kinds read overlapping text (`1` is
    /// a decimal and a byte, `2012-01-01` starts with a decimal), so the longest
    /// reading wins and ties keep the order of declaration.
    pub enum PrimitiveLiteral<'a> {
        Null(Terminal<'a>),
        Boolean(Terminal<'a>),
        Guid(GuidValue<'a>),
        Date(DateValue<'a>),
        DateTimeOffset(DateTimeOffsetValue<'a>),
        TimeOfDay(TimeOfDayValue<'a>),
        Decimal(DecimalValue<'a>),
        Double(DoubleValue<'a>),
        Single(SingleValue<'a>),
        SByte(SbyteValue<'a>),
        Byte(ByteValue<'a>),
        Int16(Int16Value<'a>),
        Int32(Int32Value<'a>),
        Int64(Int64Value<'a>),
        String(StringLiteral<'a>),
        Duration(Duration<'a>),
        Enum(EnumLiteral<'a>),
        Binary(Binary<'a>),
        GeographyCollection(GeographyCollection<'a>),
        GeographyLineString(GeographyLineString<'a>),
        GeographyMultiLineString(GeographyMultiLineString<'a>),
        GeographyMultiPoint(GeographyMultiPoint<'a>),
        GeographyMultiPolygon(GeographyMultiPolygon<'a>),
        GeographyPoint(GeographyPoint<'a>),
        GeographyPolygon(GeographyPolygon<'a>),
        GeometryCollection(GeometryCollection<'a>),
        GeometryLineString(GeometryLineString<'a>),
        GeometryMultiLineString(GeometryMultiLineString<'a>),
        GeometryMultiPoint(GeometryMultiPoint<'a>),
        GeometryMultiPolygon(GeometryMultiPolygon<'a>),
        GeometryPoint(GeometryPoint<'a>),
        GeometryPolygon(GeometryPolygon<'a>),
    }
}

pub fn primitive_literal<'a>(input: Input<'a>) -> Output<'a, PrimitiveLiteral<'a>> {
    use PrimitiveLiteral as L;
    rule("primitiveLiteral", input, |i| {
        longest((
            longest((
                null_value.map(L::Null),
                boolean_value.map(L::Boolean),
                guid_value.map(L::Guid),
                date_value.map(L::Date),
                date_time_offset_value.map(L::DateTimeOffset),
                time_of_day_value.map(L::TimeOfDay),
                decimal_value.map(L::Decimal),
                double_value.map(L::Double),
                single_value.map(L::Single),
                sbyte_value.map(L::SByte),
                byte_value.map(L::Byte),
                int16_value.map(L::Int16),
                int32_value.map(L::Int32),
                int64_value.map(L::Int64),
                string.map(L::String),
                duration.map(L::Duration),
            )),
            enum_literal.map(L::Enum),
            binary.map(L::Binary),
            longest((
                geography_collection.map(L::GeographyCollection),
                geography_line_string.map(L::GeographyLineString),
                geography_multi_line_string.map(L::GeographyMultiLineString),
                geography_multi_point.map(L::GeographyMultiPoint),
                geography_multi_polygon.map(L::GeographyMultiPolygon),
                geography_point.map(L::GeographyPoint),
                geography_polygon.map(L::GeographyPolygon),
            )),
            longest((
                geometry_collection.map(L::GeometryCollection),
                geometry_line_string.map(L::GeometryLineString),
                geometry_multi_line_string.map(L::GeometryMultiLineString),
                geometry_multi_point.map(L::GeometryMultiPoint),
                geometry_multi_polygon.map(L::GeometryMultiPolygon),
                geometry_point.map(L::GeometryPoint),
                geometry_polygon.map(L::GeometryPolygon),
            )),
        ))
        .parse(i)
    })
}

choice! {
    /// A literal in a message body or a CSDL default value.
    pub enum PrimitiveValue<'a> {
        Boolean(Terminal<'a>),
        Guid(GuidValue<'a>),
        Duration(DurationValue<'a>),
        Date(DateValue<'a>),
        DateTimeOffset(DateTimeOffsetValue<'a>),
        TimeOfDay(TimeOfDayValue<'a>),
        Enum(EnumValue<'a>),
        Collection(FullCollectionLiteral<'a>),
        LineString(FullLineStringLiteral<'a>),
        MultiPoint(FullMultiPointLiteral<'a>),
        MultiLineString(FullMultiLineStringLiteral<'a>),
        MultiPolygon(FullMultiPolygonLiteral<'a>),
        Point(FullPointLiteral<'a>),
        Polygon(FullPolygonLiteral<'a>),
        Decimal(DecimalValue<'a>),
        Double(DoubleValue<'a>),
        Single(SingleValue<'a>),
        SByte(SbyteValue<'a>),
        Byte(ByteValue<'a>),
        Int16(Int16Value<'a>),
        Int32(Int32Value<'a>),
        Int64(Int64Value<'a>),
        Binary(BinaryValue<'a>),
    }
}

pub fn primitive_value<'a>(input: Input<'a>) -> Output<'a, PrimitiveValue<'a>> {
    use PrimitiveValue as V;
    rule("primitiveValue", input, |i| {
        longest((
            longest((
                boolean_value.map(V::Boolean),
                guid_value.map(V::Guid),
                duration_value.map(V::Duration),
                date_value.map(V::Date),
                date_time_offset_value.map(V::DateTimeOffset),
                time_of_day_value.map(V::TimeOfDay),
                enum_value.map(V::Enum),
                full_collection_literal.map(V::Collection),
                full_line_string_literal.map(V::LineString),
                full_multi_point_literal.map(V::MultiPoint),
                full_multi_line_string_literal.map(V::MultiLineString),
                full_multi_polygon_literal.map(V::MultiPolygon),
                full_point_literal.map(V::Point),
                full_polygon_literal.map(V::Polygon),
            )),
            longest((
                decimal_value.map(V::Decimal),
                double_value.map(V::Double),
                single_value.map(V::Single),
                sbyte_value.map(V::SByte),
                byte_value.map(V::Byte),
                int16_value.map(V::Int16),
                int32_value.map(V::Int32),
                int64_value.map(V::Int64),
                binary_value.map(V::Binary),
            )),
        ))
        .parse(i)
    })
}

pub fn null_value<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("nullValue", input, |i| literal("null").parse(i))
}

// ---- binary

node! {
    pub struct Binary<'a> {
        pub prefix: Terminal<'a>,
        pub open: Terminal<'a>,
        pub value: BinaryValue<'a>,
        pub close: Terminal<'a>,
    }
}

pub fn binary<'a>(input: Input<'a>) -> Output<'a, Binary<'a>> {
    rule("binary", input, |i| {
        seq((literal_ci("binary"), squote, binary_value, squote))
            .map(|(prefix, open, value, close)| Binary {
                prefix,
                open,
                value,
                close,
            })
            .parse(i)
    })
}

choice! {
    pub enum Base64Tail<'a> {
        B16(Base64b16<'a>),
        B8(Base64b8<'a>),
    }
}

node! {
    /// base64url text: whole quads, then an optional partial quad.
    pub struct BinaryValue<'a> {
        pub quads: Star<Repeated<Terminal<'a>, 4, 4>>,
        pub tail: Option<Base64Tail<'a>>,
    }
}

pub fn binary_value<'a>(input: Input<'a>) -> Output<'a, BinaryValue<'a>> {
    rule("binaryValue", input, |i| {
        seq((
            base64char.repeat::<4, 4>().repeat::<0, UNBOUNDED>(),
            alt((base64b16.map(Base64Tail::B16), base64b8.map(Base64Tail::B8))).opt(),
        ))
        .map(|(quads, tail)| BinaryValue { quads, tail })
        .parse(i)
    })
}

node! {
    pub struct Base64b16<'a> {
        pub chars: Repeated<Terminal<'a>, 2, 2>,
        pub last: Terminal<'a>,
        pub pad: Option<Terminal<'a>>,
    }
}

pub fn base64b16<'a>(input: Input<'a>) -> Output<'a, Base64b16<'a>> {
    rule("base64b16", input, |i| {
        seq((
            base64char.repeat::<2, 2>(),
            keyword(&[
                "A", "E", "I", "M", "Q", "U", "Y", "c", "g", "k", "o", "s", "w", "0", "4", "8",
            ]),
            literal("=").opt(),
        ))
        .map(|(chars, last, pad)| Base64b16 { chars, last, pad })
        .parse(i)
    })
}

node! {
    pub struct Base64b8<'a> {
        pub char: Terminal<'a>,
        pub last: Terminal<'a>,
        pub pad: Option<Terminal<'a>>,
    }
}

pub fn base64b8<'a>(input: Input<'a>) -> Output<'a, Base64b8<'a>> {
    rule("base64b8", input, |i| {
        seq((base64char, keyword(&["A", "Q", "g", "w"]), literal("==").opt()))
            .map(|(char, last, pad)| Base64b8 { char, last, pad })
            .parse(i)
    })
}

pub fn base64char<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("base64char", input, |i| {
        alt((alpha, digit, keyword(&["-", "_"]))).parse(i)
    })
}

// ---- numbers

pub fn boolean_value<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("booleanValue", input, |i| keyword_ci(&["true", "false"]).parse(i))
}

node! {
    pub struct Exponent<'a> {
        pub e: Terminal<'a>,
        pub sign: Option<Terminal<'a>>,
        pub digits: Plus<Terminal<'a>>,
    }
}

node! {
    pub struct DecimalNumber<'a> {
        pub sign: Option<Terminal<'a>>,
        pub int: Plus<Terminal<'a>>,
        pub frac: Option<(Terminal<'a>, Plus<Terminal<'a>>)>,
        pub exp: Option<Exponent<'a>>,
    }
}

choice! {
    pub enum DecimalValue<'a> {
        Number(DecimalNumber<'a>),
        NanInfinity(Terminal<'a>),
    }
}

fn digits<'a>(input: Input<'a>) -> Output<'a, Plus<Terminal<'a>>> {
    digit.repeat::<1, UNBOUNDED>().parse(input)
}

pub fn decimal_value<'a>(input: Input<'a>) -> Output<'a, DecimalValue<'a>> {
    rule("decimalValue", input, |i| {
        alt((
            seq((
                sign.opt(),
                digits,
                seq((literal("."), digits)).opt(),
                seq((literal_ci("e"), sign.opt(), digits))
                    .map(|(e, sign, digits)| Exponent { e, sign, digits })
                    .opt(),
            ))
            .map(|(sign, int, frac, exp)| {
                DecimalValue::Number(DecimalNumber {
                    sign,
                    int,
                    frac,
                    exp,
                })
            }),
            nan_infinity.map(DecimalValue::NanInfinity),
        ))
        .parse(i)
    })
}

rename!(DoubleValue, double_value, "doubleValue", DecimalValue, decimal_value);
rename!(SingleValue, single_value, "singleValue", DecimalValue, decimal_value);

pub fn nan_infinity<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("nanInfinity", input, |i| keyword(&["NaN", "-INF", "INF"]).parse(i))
}

node! {
    pub struct GuidValue<'a> {
        pub time_low: Repeated<Terminal<'a>, 8, 8>,
        pub dash1: Terminal<'a>,
        pub time_mid: Repeated<Terminal<'a>, 4, 4>,
        pub dash2: Terminal<'a>,
        pub time_high: Repeated<Terminal<'a>, 4, 4>,
        pub dash3: Terminal<'a>,
        pub clock_seq: Repeated<Terminal<'a>, 4, 4>,
        pub dash4: Terminal<'a>,
        pub node: Repeated<Terminal<'a>, 12, 12>,
    }
}

pub fn guid_value<'a>(input: Input<'a>) -> Output<'a, GuidValue<'a>> {
    rule("guidValue", input, |i| {
        seq((
            hexdig.repeat::<8, 8>(),
            literal("-"),
            hexdig.repeat::<4, 4>(),
            literal("-"),
            hexdig.repeat::<4, 4>(),
            literal("-"),
            hexdig.repeat::<4, 4>(),
            literal("-"),
            hexdig.repeat::<12, 12>(),
        ))
        .map(
            |(time_low, dash1, time_mid, dash2, time_high, dash3, clock_seq, dash4, node)| {
                GuidValue {
                    time_low,
                    dash1,
                    time_mid,
                    dash2,
                    time_high,
                    dash3,
                    clock_seq,
                    dash4,
                    node,
                }
            },
        )
        .parse(i)
    })
}

node! {
    pub struct ByteValue<'a>(pub Repeated<Terminal<'a>, 1, 3>);
}

pub fn byte_value<'a>(input: Input<'a>) -> Output<'a, ByteValue<'a>> {
    rule("byteValue", input, |i| digit.repeat::<1, 3>().map(ByteValue).parse(i))
}

macro_rules! signed_int {
    ($name:ident, $func:ident, $abnf:literal, $max:literal) => {
        node! {
            pub struct $name<'a> {
                pub sign: Option<Terminal<'a>>,
                pub digits: Repeated<Terminal<'a>, 1, $max>,
            }
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| {
                seq((sign.opt(), digit.repeat::<1, $max>()))
                    .map(|(sign, digits)| $name { sign, digits })
                    .parse(i)
            })
        }
    };
}

signed_int!(SbyteValue, sbyte_value, "sbyteValue", 3);
signed_int!(Int16Value, int16_value, "int16Value", 5);
signed_int!(Int32Value, int32_value, "int32Value", 10);
signed_int!(Int64Value, int64_value, "int64Value", 19);

// ---- strings

node! {
    /// `''`, one quote inside a string.
    pub struct SquoteInString<'a> {
        pub first: Terminal<'a>,
        pub second: Terminal<'a>,
    }
}

pub fn squote_in_string<'a>(input: Input<'a>) -> Output<'a, SquoteInString<'a>> {
    rule("SQUOTE-in-string", input, |i| {
        seq((squote, squote))
            .map(|(first, second)| SquoteInString { first, second })
            .parse(i)
    })
}

choice! {
    pub enum StringChar<'a> {
        Quote(SquoteInString<'a>),
        Char(UriChar<'a>),
    }
}

node! {
    pub struct StringLiteral<'a> {
        pub open: Terminal<'a>,
        pub chars: Star<StringChar<'a>>,
        pub close: Terminal<'a>,
    }
}

impl<'a> StringLiteral<'a> {
    /// The text between the quotes, as written.
    pub fn content(&self) -> String {
        self.chars.source()
    }
}

pub fn string<'a>(input: Input<'a>) -> Output<'a, StringLiteral<'a>> {
    rule("string", input, |i| {
        seq((
            squote,
            alt((
                squote_in_string.map(StringChar::Quote),
                pchar_no_squote.map(StringChar::Char),
            ))
            .repeat::<0, UNBOUNDED>(),
            squote,
        ))
        .map(|(open, chars, close)| StringLiteral { open, chars, close })
        .parse(i)
    })
}

// ---- dates and times

node! {
    pub struct DateValue<'a> {
        pub year: Year<'a>,
        pub dash1: Terminal<'a>,
        pub month: Month<'a>,
        pub dash2: Terminal<'a>,
        pub day: Day<'a>,
    }
}

pub fn date_value<'a>(input: Input<'a>) -> Output<'a, DateValue<'a>> {
    rule("dateValue", input, |i| {
        seq((year, literal("-"), month, literal("-"), day))
            .map(|(year, dash1, month, dash2, day)| DateValue {
                year,
                dash1,
                month,
                dash2,
                day,
            })
            .parse(i)
    })
}

node! {
    pub struct FractionalPart<'a> {
        pub dot: Terminal<'a>,
        pub digits: FractionalSeconds<'a>,
    }
}

node! {
    /// `":" second [ "." fractionalSeconds ]`
    pub struct SecondsPart<'a> {
        pub colon: Terminal<'a>,
        pub second: Second<'a>,
        pub fraction: Option<FractionalPart<'a>>,
    }
}

fn seconds_part<'a>(input: Input<'a>) -> Output<'a, SecondsPart<'a>> {
    seq((
        literal(":"),
        second,
        seq((literal("."), fractional_seconds))
            .map(|(dot, digits)| FractionalPart { dot, digits })
            .opt(),
    ))
    .map(|(colon, second, fraction)| SecondsPart {
        colon,
        second,
        fraction,
    })
    .parse(input)
}

node! {
    pub struct ZoneOffset<'a> {
        pub sign: Terminal<'a>,
        pub hour: Hour<'a>,
        pub colon: Terminal<'a>,
        pub minute: Minute<'a>,
    }
}

choice! {
    pub enum TimeZone<'a> {
        Utc(Terminal<'a>),
        Offset(ZoneOffset<'a>),
    }
}

node! {
    pub struct DateTimeOffsetValue<'a> {
        pub year: Year<'a>,
        pub dash1: Terminal<'a>,
        pub month: Month<'a>,
        pub dash2: Terminal<'a>,
        pub day: Day<'a>,
        pub t: Terminal<'a>,
        pub hour: Hour<'a>,
        pub colon: Terminal<'a>,
        pub minute: Minute<'a>,
        pub seconds: Option<SecondsPart<'a>>,
        pub zone: TimeZone<'a>,
    }
}

pub fn date_time_offset_value<'a>(input: Input<'a>) -> Output<'a, DateTimeOffsetValue<'a>> {
    rule("dateTimeOffsetValue", input, |i| {
        seq((
            year,
            literal("-"),
            month,
            literal("-"),
            day,
            literal_ci("T"),
            hour,
            literal(":"),
            minute,
            seconds_part.opt(),
            alt((
                literal_ci("Z").map(TimeZone::Utc),
                seq((sign, hour, literal(":"), minute)).map(|(sign, hour, colon, minute)| {
                    TimeZone::Offset(ZoneOffset {
                        sign,
                        hour,
                        colon,
                        minute,
                    })
                }),
            )),
        ))
        .map(
            |(year, dash1, month, dash2, day, t, hour, colon, minute, seconds, zone)| {
                DateTimeOffsetValue {
                    year,
                    dash1,
                    month,
                    dash2,
                    day,
                    t,
                    hour,
                    colon,
                    minute,
                    seconds,
                    zone,
                }
            },
        )
        .parse(i)
    })
}

node! {
    pub struct Duration<'a> {
        pub prefix: Option<Terminal<'a>>,
        pub open: Terminal<'a>,
        pub value: DurationValue<'a>,
        pub close: Terminal<'a>,
    }
}

pub fn duration<'a>(input: Input<'a>) -> Output<'a, Duration<'a>> {
    rule("duration", input, |i| {
        seq((literal_ci("duration").opt(), squote, duration_value, squote))
            .map(|(prefix, open, value, close)| Duration {
                prefix,
                open,
                value,
                close,
            })
            .parse(i)
    })
}

node! {
    pub struct DurationSeconds<'a> {
        pub digits: Plus<Terminal<'a>>,
        pub fraction: Option<(Terminal<'a>, Plus<Terminal<'a>>)>,
        pub s: Terminal<'a>,
    }
}

node! {
    pub struct DurationTime<'a> {
        pub t: Terminal<'a>,
        pub hours: Option<(Plus<Terminal<'a>>, Terminal<'a>)>,
        pub minutes: Option<(Plus<Terminal<'a>>, Terminal<'a>)>,
        pub seconds: Option<DurationSeconds<'a>>,
    }
}

node! {
    pub struct DurationValue<'a> {
        pub sign: Option<Terminal<'a>>,
        pub p: Terminal<'a>,
        pub days: Option<(Plus<Terminal<'a>>, Terminal<'a>)>,
        pub time: Option<DurationTime<'a>>,
    }
}

pub fn duration_value<'a>(input: Input<'a>) -> Output<'a, DurationValue<'a>> {
    rule("durationValue", input, |i| {
        seq((
            sign.opt(),
            literal_ci("P"),
            seq((digits, literal_ci("D"))).opt(),
            seq((
                literal_ci("T"),
                seq((digits, literal_ci("H"))).opt(),
                seq((digits, literal_ci("M"))).opt(),
                seq((digits, seq((literal("."), digits)).opt(), literal_ci("S")))
                    .map(|(digits, fraction, s)| DurationSeconds {
                        digits,
                        fraction,
                        s,
                    })
                    .opt(),
            ))
            .map(|(t, hours, minutes, seconds)| DurationTime {
                t,
                hours,
                minutes,
                seconds,
            })
            .opt(),
        ))
        .map(|(sign, p, days, time)| DurationValue { sign, p, days, time })
        .parse(i)
    })
}

node! {
    pub struct TimeOfDayValue<'a> {
        pub hour: Hour<'a>,
        pub colon: Terminal<'a>,
        pub minute: Minute<'a>,
        pub seconds: Option<SecondsPart<'a>>,
    }
}

pub fn time_of_day_value<'a>(input: Input<'a>) -> Output<'a, TimeOfDayValue<'a>> {
    rule("timeOfDayValue", input, |i| {
        seq((hour, literal(":"), minute, seconds_part.opt()))
            .map(|(hour, colon, minute, seconds)| TimeOfDayValue {
                hour,
                colon,
                minute,
                seconds,
            })
            .parse(i)
    })
}

pub fn one_to_nine<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("oneToNine", input, |i| char_range('1', '9').parse(i))
}

node! {
    pub struct ZeroToFiftyNine<'a> {
        pub tens: Terminal<'a>,
        pub units: Terminal<'a>,
    }
}

pub fn zero_to_fifty_nine<'a>(input: Input<'a>) -> Output<'a, ZeroToFiftyNine<'a>> {
    rule("zeroToFiftyNine", input, |i| {
        seq((char_range('0', '5'), digit))
            .map(|(tens, units)| ZeroToFiftyNine { tens, units })
            .parse(i)
    })
}

rename!(Minute, minute, "minute", ZeroToFiftyNine, zero_to_fifty_nine);
rename!(Second, second, "second", ZeroToFiftyNine, zero_to_fifty_nine);

choice! {
    pub enum YearDigits<'a> {
        /// `"0" 3DIGIT`
        Padded((Terminal<'a>, Repeated<Terminal<'a>, 3, 3>)),
        /// `oneToNine 3*DIGIT`
        Long((Terminal<'a>, Repeated<Terminal<'a>, 3, UNBOUNDED>)),
    }
}

node! {
    pub struct Year<'a> {
        pub sign: Option<Terminal<'a>>,
        pub digits: YearDigits<'a>,
    }
}

pub fn year<'a>(input: Input<'a>) -> Output<'a, Year<'a>> {
    rule("year", input, |i| {
        seq((
            literal("-").opt(),
            alt((
                seq((literal("0"), digit.repeat::<3, 3>())).map(YearDigits::Padded),
                seq((one_to_nine, digit.repeat::<3, UNBOUNDED>())).map(YearDigits::Long),
            )),
        ))
        .map(|(sign, digits)| Year { sign, digits })
        .parse(i)
    })
}

node! {
    pub struct Month<'a> {
        pub tens: Terminal<'a>,
        pub units: Terminal<'a>,
    }
}

pub fn month<'a>(input: Input<'a>) -> Output<'a, Month<'a>> {
    rule("month", input, |i| {
        alt((
            seq((literal("0"), one_to_nine)),
            seq((literal("1"), keyword(&["0", "1", "2"]))),
        ))
        .map(|(tens, units)| Month { tens, units })
        .parse(i)
    })
}

node! {
    pub struct Day<'a> {
        pub tens: Terminal<'a>,
        pub units: Terminal<'a>,
    }
}

pub fn day<'a>(input: Input<'a>) -> Output<'a, Day<'a>> {
    rule("day", input, |i| {
        alt((
            seq((literal("0"), one_to_nine)),
            seq((keyword(&["1", "2"]), digit)),
            seq((literal("3"), keyword(&["0", "1"]))),
        ))
        .map(|(tens, units)| Day { tens, units })
        .parse(i)
    })
}

node! {
    pub struct Hour<'a> {
        pub tens: Terminal<'a>,
        pub units: Terminal<'a>,
    }
}

pub fn hour<'a>(input: Input<'a>) -> Output<'a, Hour<'a>> {
    rule("hour", input, |i| {
        alt((
            seq((keyword(&["0", "1"]), digit)),
            seq((literal("2"), char_range('0', '3'))),
        ))
        .map(|(tens, units)| Hour { tens, units })
        .parse(i)
    })
}

node! {
    pub struct FractionalSeconds<'a>(pub Repeated<Terminal<'a>, 1, 12>);
}

pub fn fractional_seconds<'a>(input: Input<'a>) -> Output<'a, FractionalSeconds<'a>> {
    rule("fractionalSeconds", input, |i| {
        digit.repeat::<1, 12>().map(FractionalSeconds).parse(i)
    })
}

// ---- enumerations

node! {
    pub struct EnumLiteral<'a> {
        pub type_name: Option<QualifiedEnumTypeName<'a>>,
        pub open: Terminal<'a>,
        pub value: EnumValue<'a>,
        pub close: Terminal<'a>,
    }
}

pub fn enum_literal<'a>(input: Input<'a>) -> Output<'a, EnumLiteral<'a>> {
    rule("enum", input, |i| {
        seq((qualified_enum_type_name.opt(), squote, enum_value, squote))
            .map(|(type_name, open, value, close)| EnumLiteral {
                type_name,
                open,
                value,
                close,
            })
            .parse(i)
    })
}

node! {
    pub struct EnumValue<'a>(pub Delimited<SingleEnumValue<'a>, Terminal<'a>>);
}

pub fn enum_value<'a>(input: Input<'a>) -> Output<'a, EnumValue<'a>> {
    rule("enumValue", input, |i| {
        sep_by(single_enum_value, comma).map(EnumValue).parse(i)
    })
}

choice! {
    pub enum SingleEnumValue<'a> {
        Member(EnumerationMember<'a>),
        Value(EnumMemberValue<'a>),
    }
}

pub fn single_enum_value<'a>(input: Input<'a>) -> Output<'a, SingleEnumValue<'a>> {
    rule("singleEnumValue", input, |i| {
        alt((
            enumeration_member.map(SingleEnumValue::Member),
            enum_member_value.map(SingleEnumValue::Value),
        ))
        .parse(i)
    })
}

rename!(EnumMemberValue, enum_member_value, "enumMemberValue", Int64Value, int64_value);

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn parse_all<'a, T: Node>(p: impl Parser<'a, T>, s: &'a str) -> Option<T> {
        p.parse(Input::new(s)).complete().ok()
    }

    #[test]
    fn test_primitive_literal_kinds() {
        let kind = |s| parse_all(primitive_literal, s);
        assert!(matches!(kind("null"), Some(PrimitiveLiteral::Null(_))));
        assert!(matches!(kind("TRUE"), Some(PrimitiveLiteral::Boolean(_))));
        assert!(matches!(kind("42"), Some(PrimitiveLiteral::Decimal(_))));
        assert!(matches!(kind("-1.5e10"), Some(PrimitiveLiteral::Decimal(_))));
        assert!(matches!(kind("-INF"), Some(PrimitiveLiteral::Decimal(_))));
        assert!(matches!(kind("2012-12-03"), Some(PrimitiveLiteral::Date(_))));
        assert!(matches!(
            kind("2012-12-03T07:16:23Z"),
            Some(PrimitiveLiteral::DateTimeOffset(_))
        ));
        assert!(matches!(kind("07:59:59.999"), Some(PrimitiveLiteral::TimeOfDay(_))));
        assert!(matches!(
            kind("01234567-89ab-cdef-0123-456789abcdef"),
            Some(PrimitiveLiteral::Guid(_))
        ));
        assert!(matches!(kind("'O''Neil'"), Some(PrimitiveLiteral::String(_))));
        assert!(matches!(kind("duration'P12DT23H59M59.999S'"), Some(PrimitiveLiteral::Duration(_))));
        assert!(matches!(kind("NS.Color'Red,Blue'"), Some(PrimitiveLiteral::Enum(_))));
        assert!(matches!(kind("binary'T0RhdGE'"), Some(PrimitiveLiteral::Binary(_))));
        assert!(matches!(
            kind("geography'SRID=0;Point(142.1 64.1)'"),
            Some(PrimitiveLiteral::GeographyPoint(_))
        ));
        assert!(matches!(
            kind("geometry'SRID=0;Polygon((1 1,1 2,2 2,1 1))'"),
            Some(PrimitiveLiteral::GeometryPolygon(_))
        ));
    }

    #[test]
    fn test_string() {
        let out = string(Input::new("'it''s'x"));
        let s = out.value().unwrap();
        assert_eq!(s.content(), "it''s");
        assert!(matches!(s.chars[2], StringChar::Quote(_)));
        assert_eq!(out.remainder().rest(), "x");

        let out = string(Input::new("%27a%27"));
        assert_eq!(out.value().map(|s| s.content()).as_deref(), Some("a"));

        let inp = Input::new("'open");
        let out = string(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);
        assert_eq!(out.furthest(), 5);
    }

    #[test]
    fn test_dates() {
        assert!(parse_all(date_value, "2000-02-29").is_some());
        assert!(parse_all(date_value, "-0001-01-01").is_some());
        assert!(parse_all(date_value, "12345-01-01").is_some());
        assert!(parse_all(date_value, "2000-13-01").is_none());
        assert!(parse_all(date_value, "2000-01-32").is_none());
        assert!(parse_all(date_value, "200-01-01").is_none());

        let dto = parse_all(date_time_offset_value, "2012-12-03T07:16:23.5+01:00").unwrap();
        assert!(matches!(dto.zone, TimeZone::Offset(_)));
        assert_eq!(dto.seconds.map(|s| s.source()).as_deref(), Some(":23.5"));
        assert!(parse_all(date_time_offset_value, "2012-12-03T24:00Z").is_none());
        assert!(parse_all(time_of_day_value, "23:59:60").is_none());
    }

    #[test]
    fn test_duration() {
        for s in ["P1D", "-PT1M", "PT0.5S", "P1DT2H3M4S", "P"] {
            assert!(parse_all(duration_value, s).is_some(), "{s}");
        }
        let d = parse_all(duration_value, "PT1M").unwrap();
        let t = d.time.unwrap();
        assert!(t.hours.is_none());
        assert_eq!(t.minutes.map(|m| m.source()).as_deref(), Some("1M"));
        assert!(parse_all(duration, "'P1D'").is_some());
    }

    #[test]
    fn test_numbers() {
        assert!(parse_all(byte_value, "255").is_some());
        assert!(parse_all(byte_value, "2555").is_none());
        assert!(parse_all(sbyte_value, "-128").is_some());
        assert!(parse_all(int64_value, "9223372036854775807").is_some());
        assert!(parse_all(int64_value, "92233720368547758070").is_none());
        assert!(parse_all(decimal_value, "1.").is_none());
        assert!(parse_all(decimal_value, "NaN").is_some());
    }

    #[test]
    fn test_binary_value() {
        for s in ["", "QUJD", "QUI=", "QUI", "QQ==", "QQ", "T0RhdGE"] {
            assert!(parse_all(binary_value, s).is_some(), "{s}");
        }
        let v = parse_all(binary_value, "QUJDRA").unwrap();
        assert_eq!(v.quads.len(), 1);
        assert!(matches!(v.tail, Some(Base64Tail::B8(_))));
    }

    #[test]
    fn test_enum_value() {
        let e = parse_all(enum_literal, "'Red,2'").unwrap();
        assert!(e.type_name.is_none());
        let values: Vec<_> = e.value.0.items().collect();
        assert!(matches!(values[0], SingleEnumValue::Member(_)));
        assert!(matches!(values[1], SingleEnumValue::Value(_)));
    }
}
