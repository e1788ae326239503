//! Generic URI and IRI syntax, and the character sets OData builds on it.

use crate::prelude::*;
use crate::{choice, node};

use super::punctuation::{alpha, digit, hexdig, a_to_f, obs_text, vchar};
use super::json::{escape, quotation_mark};

node! {
    pub struct PctEncoded<'a> {
        pub percent: Terminal<'a>,
        pub hi: Terminal<'a>,
        pub lo: Terminal<'a>,
    }
}

choice! {
    /// One URI character, either literal or percent-encoded.
    pub enum UriChar<'a> {
        Plain(Terminal<'a>),
        Encoded(PctEncoded<'a>),
        Escaped((Terminal<'a>, Terminal<'a>)),
    }
}

fn pct<'a>((percent, hi, lo): (Terminal<'a>, Terminal<'a>, Terminal<'a>)) -> PctEncoded<'a> {
    PctEncoded { percent, hi, lo }
}

pub fn pct_encoded<'a>(input: Input<'a>) -> Output<'a, PctEncoded<'a>> {
    rule("pct-encoded", input, |i| seq((literal("%"), hexdig, hexdig)).map(pct).parse(i))
}

/// Any percent-encoding except `%27`.
pub fn pct_encoded_no_squote<'a>(input: Input<'a>) -> Output<'a, PctEncoded<'a>> {
    rule("pct-encoded-no-SQUOTE", input, |i| {
        alt((
            seq((
                literal("%"),
                alt((char_class(|c: char| matches!(c, '0' | '1' | '3'..='6' | '8' | '9')), a_to_f)),
                hexdig,
            )),
            seq((
                literal("%"),
                literal("2"),
                alt((char_class(|c: char| matches!(c, '0'..='6' | '8' | '9')), a_to_f)),
            )),
        ))
        .map(pct)
        .parse(i)
    })
}

/// Any percent-encoding except `%22`, `%25` and `%5C`.
pub fn pct_encoded_unescaped<'a>(input: Input<'a>) -> Output<'a, PctEncoded<'a>> {
    rule("pct-encoded-unescaped", input, |i| {
        alt((
            seq((
                literal("%"),
                alt((char_class(|c: char| matches!(c, '0' | '1' | '3' | '4' | '6'..='9')), a_to_f)),
                hexdig,
            )),
            seq((
                literal("%"),
                literal("2"),
                alt((char_class(|c: char| matches!(c, '0' | '1' | '3'..='9')), a_to_f)),
            )),
            seq((
                literal("%"),
                literal("5"),
                alt((digit, keyword_ci(&["A", "B", "D", "E", "F"]))),
            )),
        ))
        .map(pct)
        .parse(i)
    })
}

pub fn unreserved<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("unreserved", input, |i| {
        char_class(|c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')).parse(i)
    })
}

pub fn sub_delims<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("sub-delims", input, |i| {
        alt((keyword(&["$", "&", "'", "="]), other_delims)).parse(i)
    })
}

pub fn other_delims<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("other-delims", input, |i| {
        keyword(&["!", "(", ")", "*", "+", ",", ";"]).parse(i)
    })
}

pub fn pchar<'a>(input: Input<'a>) -> Output<'a, UriChar<'a>> {
    rule("pchar", input, |i| {
        alt((
            unreserved.map(UriChar::Plain),
            pct_encoded.map(UriChar::Encoded),
            sub_delims.map(UriChar::Plain),
            keyword(&[":", "@"]).map(UriChar::Plain),
        ))
        .parse(i)
    })
}

pub fn pchar_no_squote<'a>(input: Input<'a>) -> Output<'a, UriChar<'a>> {
    rule("pchar-no-SQUOTE", input, |i| {
        alt((
            unreserved.map(UriChar::Plain),
            pct_encoded_no_squote.map(UriChar::Encoded),
            other_delims.map(UriChar::Plain),
            keyword(&["$", "&", "=", ":", "@"]).map(UriChar::Plain),
        ))
        .parse(i)
    })
}

pub fn qchar_no_amp<'a>(input: Input<'a>) -> Output<'a, UriChar<'a>> {
    rule("qchar-no-AMP", input, |i| {
        alt((
            unreserved.map(UriChar::Plain),
            pct_encoded.map(UriChar::Encoded),
            other_delims.map(UriChar::Plain),
            keyword(&[":", "@", "/", "?", "$", "'", "="]).map(UriChar::Plain),
        ))
        .parse(i)
    })
}

pub fn qchar_no_amp_eq<'a>(input: Input<'a>) -> Output<'a, UriChar<'a>> {
    rule("qchar-no-AMP-EQ", input, |i| {
        alt((
            unreserved.map(UriChar::Plain),
            pct_encoded.map(UriChar::Encoded),
            other_delims.map(UriChar::Plain),
            keyword(&[":", "@", "/", "?", "$", "'"]).map(UriChar::Plain),
        ))
        .parse(i)
    })
}

pub fn qchar_no_amp_eq_at_dollar<'a>(input: Input<'a>) -> Output<'a, UriChar<'a>> {
    rule("qchar-no-AMP-EQ-AT-DOLLAR", input, |i| {
        alt((
            unreserved.map(UriChar::Plain),
            pct_encoded.map(UriChar::Encoded),
            other_delims.map(UriChar::Plain),
            keyword(&[":", "/", "?", "'"]).map(UriChar::Plain),
        ))
        .parse(i)
    })
}

pub fn qchar_unescaped<'a>(input: Input<'a>) -> Output<'a, UriChar<'a>> {
    rule("qchar-unescaped", input, |i| {
        alt((
            unreserved.map(UriChar::Plain),
            pct_encoded_unescaped.map(UriChar::Encoded),
            other_delims.map(UriChar::Plain),
            keyword(&[":", "@", "/", "?", "$", "'", "="]).map(UriChar::Plain),
        ))
        .parse(i)
    })
}

pub fn qchar_no_amp_dquote<'a>(input: Input<'a>) -> Output<'a, UriChar<'a>> {
    rule("qchar-no-AMP-DQUOTE", input, |i| {
        alt((
            qchar_unescaped,
            seq((escape, alt((escape, quotation_mark)))).map(UriChar::Escaped),
        ))
        .parse(i)
    })
}

// ---- URI

node! {
    pub struct Uri<'a> {
        pub scheme: Scheme<'a>,
        pub colon: Terminal<'a>,
        pub hier_part: HierPart<'a>,
        pub query: Option<(Terminal<'a>, Query<'a>)>,
        pub fragment: Option<(Terminal<'a>, Fragment<'a>)>,
    }
}

pub fn uri<'a>(input: Input<'a>) -> Output<'a, Uri<'a>> {
    rule("URI", input, |i| {
        seq((
            scheme,
            literal(":"),
            hier_part,
            seq((literal("?"), query)).opt(),
            seq((literal("#"), fragment)).opt(),
        ))
        .map(|(scheme, colon, hier_part, query, fragment)| Uri {
            scheme,
            colon,
            hier_part,
            query,
            fragment,
        })
        .parse(i)
    })
}

node! {
    pub struct NetworkPath<'a> {
        pub slashes: Terminal<'a>,
        pub authority: Authority<'a>,
        pub path: PathAbempty<'a>,
    }
}

choice! {
    pub enum HierPart<'a> {
        Network(NetworkPath<'a>),
        Absolute(PathAbsolute<'a>),
        Rootless(PathRootless<'a>),
    }
}

pub fn hier_part<'a>(input: Input<'a>) -> Output<'a, HierPart<'a>> {
    rule("hier-part", input, |i| {
        alt((
            seq((literal("//"), authority, path_abempty)).map(|(slashes, authority, path)| {
                HierPart::Network(NetworkPath {
                    slashes,
                    authority,
                    path,
                })
            }),
            path_absolute.map(HierPart::Absolute),
            path_rootless.map(HierPart::Rootless),
        ))
        .parse(i)
    })
}

node! {
    pub struct Scheme<'a> {
        pub first: Terminal<'a>,
        pub rest: Star<Terminal<'a>>,
    }
}

pub fn scheme<'a>(input: Input<'a>) -> Output<'a, Scheme<'a>> {
    rule("scheme", input, |i| {
        seq((
            alpha,
            alt((alpha, digit, keyword(&["+", "-", "."]))).repeat::<0, UNBOUNDED>(),
        ))
        .map(|(first, rest)| Scheme { first, rest })
        .parse(i)
    })
}

node! {
    pub struct Authority<'a> {
        pub userinfo: Option<(Userinfo<'a>, Terminal<'a>)>,
        pub host: Host<'a>,
        pub port: Option<(Terminal<'a>, Port<'a>)>,
    }
}

pub fn authority<'a>(input: Input<'a>) -> Output<'a, Authority<'a>> {
    rule("authority", input, |i| {
        seq((
            seq((userinfo, literal("@"))).opt(),
            host,
            seq((literal(":"), port)).opt(),
        ))
        .map(|(userinfo, host, port)| Authority {
            userinfo,
            host,
            port,
        })
        .parse(i)
    })
}

node! {
    pub struct Userinfo<'a>(pub Star<UriChar<'a>>);
}

pub fn userinfo<'a>(input: Input<'a>) -> Output<'a, Userinfo<'a>> {
    rule("userinfo", input, |i| {
        alt((
            unreserved.map(UriChar::Plain),
            pct_encoded.map(UriChar::Encoded),
            sub_delims.map(UriChar::Plain),
            literal(":").map(UriChar::Plain),
        ))
        .repeat::<0, UNBOUNDED>()
        .map(Userinfo)
        .parse(i)
    })
}

choice! {
    pub enum Host<'a> {
        IpLiteral(IpLiteral<'a>),
        Ipv4(Ipv4Address<'a>),
        RegName(RegName<'a>),
    }
}

/// A registered name may also spell out an IPv4 address or a prefix of one, so
/// the longest reading wins, with IPv4 preferred on a tie.
pub fn host<'a>(input: Input<'a>) -> Output<'a, Host<'a>> {
    rule("host", input, |i| {
        longest((
            ip_literal.map(Host::IpLiteral),
            ipv4address.map(Host::Ipv4),
            reg_name.map(Host::RegName),
        ))
        .parse(i)
    })
}

node! {
    pub struct Port<'a>(pub Star<Terminal<'a>>);
}

pub fn port<'a>(input: Input<'a>) -> Output<'a, Port<'a>> {
    rule("port", input, |i| digit.repeat::<0, UNBOUNDED>().map(Port).parse(i))
}

choice! {
    pub enum IpAddress<'a> {
        V6(Ipv6Address<'a>),
        Future(IpvFuture<'a>),
    }
}

node! {
    pub struct IpLiteral<'a> {
        pub open: Terminal<'a>,
        pub address: IpAddress<'a>,
        pub close: Terminal<'a>,
    }
}

pub fn ip_literal<'a>(input: Input<'a>) -> Output<'a, IpLiteral<'a>> {
    rule("IP-literal", input, |i| {
        seq((
            literal("["),
            alt((ipv6address.map(IpAddress::V6), ipv_future.map(IpAddress::Future))),
            literal("]"),
        ))
        .map(|(open, address, close)| IpLiteral {
            open,
            address,
            close,
        })
        .parse(i)
    })
}

node! {
    pub struct IpvFuture<'a> {
        pub v: Terminal<'a>,
        pub version: Plus<Terminal<'a>>,
        pub dot: Terminal<'a>,
        pub address: Plus<Terminal<'a>>,
    }
}

pub fn ipv_future<'a>(input: Input<'a>) -> Output<'a, IpvFuture<'a>> {
    rule("IPvFuture", input, |i| {
        seq((
            literal_ci("v"),
            hexdig.repeat::<1, UNBOUNDED>(),
            literal("."),
            alt((unreserved, sub_delims, literal(":"))).repeat::<1, UNBOUNDED>(),
        ))
        .map(|(v, version, dot, address)| IpvFuture {
            v,
            version,
            dot,
            address,
        })
        .parse(i)
    })
}

node! {
    /// The `h16 *( ":" h16 )` groups before a `::`.
    pub struct H16Prefix<'a> {
        pub first: H16<'a>,
        pub rest: Repeated<(Terminal<'a>, H16<'a>), 0, 6>,
    }
}

choice! {
    pub enum Ipv6Tail<'a> {
        Ls32(Ls32<'a>),
        H16(H16<'a>),
    }
}

node! {
    /// All nine forms share one shape: optional groups, an optional `::`, the
    /// `h16 ":"` groups after it and the final piece.
    pub struct Ipv6Address<'a> {
        pub prefix: Option<H16Prefix<'a>>,
        pub elision: Option<Terminal<'a>>,
        pub groups: Repeated<(H16<'a>, Terminal<'a>), 0, 6>,
        pub tail: Option<Ipv6Tail<'a>>,
    }
}

fn h16_prefix<'a, const K: usize>(input: Input<'a>) -> Output<'a, H16Prefix<'a>> {
    seq((h16, seq((literal(":"), h16)).repeat::<0, K>()))
        .map_opt(|(first, rest)| {
            Some(H16Prefix {
                first,
                rest: Repeated::new(rest.into_vec()).ok()?,
            })
        })
        .parse(input)
}

fn h16_groups<'a, const N: usize>(
    input: Input<'a>,
) -> Output<'a, Repeated<(H16<'a>, Terminal<'a>), 0, 6>> {
    seq((h16, literal(":")))
        .repeat::<N, N>()
        .map_opt(|groups| Repeated::new(groups.into_vec()).ok())
        .parse(input)
}

fn ls32_tail<'a>(input: Input<'a>) -> Output<'a, Ipv6Tail<'a>> {
    ls32.map(Ipv6Tail::Ls32).parse(input)
}

fn elided<'a>(
    (prefix, elision, groups, tail): (
        Option<H16Prefix<'a>>,
        Terminal<'a>,
        Repeated<(H16<'a>, Terminal<'a>), 0, 6>,
        Option<Ipv6Tail<'a>>,
    ),
) -> Ipv6Address<'a> {
    Ipv6Address {
        prefix,
        elision: Some(elision),
        groups,
        tail,
    }
}

pub fn ipv6address<'a>(input: Input<'a>) -> Output<'a, Ipv6Address<'a>> {
    rule("IPv6address", input, |i| {
        longest((
            seq((h16_groups::<6>, ls32_tail)).map(|(groups, tail)| Ipv6Address {
                prefix: None,
                elision: None,
                groups,
                tail: Some(tail),
            }),
            seq((literal("::"), h16_groups::<5>, ls32_tail)).map(|(elision, groups, tail)| {
                elided((None, elision, groups, Some(tail)))
            }),
            seq((h16_prefix::<0>.opt(), literal("::"), h16_groups::<4>, ls32_tail))
                .map(|(p, e, g, t)| elided((p, e, g, Some(t)))),
            seq((h16_prefix::<1>.opt(), literal("::"), h16_groups::<3>, ls32_tail))
                .map(|(p, e, g, t)| elided((p, e, g, Some(t)))),
            seq((h16_prefix::<2>.opt(), literal("::"), h16_groups::<2>, ls32_tail))
                .map(|(p, e, g, t)| elided((p, e, g, Some(t)))),
            seq((h16_prefix::<3>.opt(), literal("::"), h16_groups::<1>, ls32_tail))
                .map(|(p, e, g, t)| elided((p, e, g, Some(t)))),
            seq((h16_prefix::<4>.opt(), literal("::"), h16_groups::<0>, ls32_tail))
                .map(|(p, e, g, t)| elided((p, e, g, Some(t)))),
            seq((h16_prefix::<5>.opt(), literal("::"), h16_groups::<0>, h16))
                .map(|(p, e, g, t)| elided((p, e, g, Some(Ipv6Tail::H16(t))))),
            seq((h16_prefix::<6>.opt(), literal("::"), h16_groups::<0>))
                .map(|(p, e, g)| elided((p, e, g, None))),
        ))
        .parse(i)
    })
}

node! {
    pub struct H16<'a>(pub Repeated<Terminal<'a>, 1, 4>);
}

pub fn h16<'a>(input: Input<'a>) -> Output<'a, H16<'a>> {
    rule("h16", input, |i| hexdig.repeat::<1, 4>().map(H16).parse(i))
}

choice! {
    pub enum Ls32<'a> {
        Pair((H16<'a>, Terminal<'a>, H16<'a>)),
        Ipv4(Ipv4Address<'a>),
    }
}

pub fn ls32<'a>(input: Input<'a>) -> Output<'a, Ls32<'a>> {
    rule("ls32", input, |i| {
        alt((
            seq((h16, literal(":"), h16)).map(Ls32::Pair),
            ipv4address.map(Ls32::Ipv4),
        ))
        .parse(i)
    })
}

node! {
    pub struct Ipv4Address<'a> {
        pub a: DecOctet<'a>,
        pub dot1: Terminal<'a>,
        pub b: DecOctet<'a>,
        pub dot2: Terminal<'a>,
        pub c: DecOctet<'a>,
        pub dot3: Terminal<'a>,
        pub d: DecOctet<'a>,
    }
}

pub fn ipv4address<'a>(input: Input<'a>) -> Output<'a, Ipv4Address<'a>> {
    rule("IPv4address", input, |i| {
        seq((
            dec_octet,
            literal("."),
            dec_octet,
            literal("."),
            dec_octet,
            literal("."),
            dec_octet,
        ))
        .map(|(a, dot1, b, dot2, c, dot3, d)| Ipv4Address {
            a,
            dot1,
            b,
            dot2,
            c,
            dot3,
            d,
        })
        .parse(i)
    })
}

node! {
    pub struct DecOctet<'a>(pub Repeated<Terminal<'a>, 1, 3>);
}

pub fn dec_octet<'a>(input: Input<'a>) -> Output<'a, DecOctet<'a>> {
    rule("dec-octet", input, |i| {
        alt((
            seq((literal("1"), digit, digit)).map(|(a, b, c)| vec![a, b, c]),
            seq((literal("2"), char_range('0', '4'), digit)).map(|(a, b, c)| vec![a, b, c]),
            seq((literal("25"), char_range('0', '5'))).map(|(a, b)| vec![a, b]),
            seq((char_range('1', '9'), digit)).map(|(a, b)| vec![a, b]),
            digit.map(|a| vec![a]),
        ))
        .map_opt(|digits| Repeated::new(digits).ok().map(DecOctet))
        .parse(i)
    })
}

node! {
    pub struct RegName<'a>(pub Star<UriChar<'a>>);
}

pub fn reg_name<'a>(input: Input<'a>) -> Output<'a, RegName<'a>> {
    rule("reg-name", input, |i| {
        alt((
            unreserved.map(UriChar::Plain),
            pct_encoded.map(UriChar::Encoded),
            sub_delims.map(UriChar::Plain),
        ))
        .repeat::<0, UNBOUNDED>()
        .map(RegName)
        .parse(i)
    })
}

node! {
    pub struct PathAbempty<'a>(pub Star<(Terminal<'a>, Segment<'a>)>);
}

pub fn path_abempty<'a>(input: Input<'a>) -> Output<'a, PathAbempty<'a>> {
    rule("path-abempty", input, |i| {
        seq((literal("/"), segment))
            .repeat::<0, UNBOUNDED>()
            .map(PathAbempty)
            .parse(i)
    })
}

node! {
    pub struct PathAbsolute<'a> {
        pub slash: Terminal<'a>,
        pub rest: Option<PathRootless<'a>>,
    }
}

pub fn path_absolute<'a>(input: Input<'a>) -> Output<'a, PathAbsolute<'a>> {
    rule("path-absolute", input, |i| {
        seq((literal("/"), path_rootless.opt()))
            .map(|(slash, rest)| PathAbsolute { slash, rest })
            .parse(i)
    })
}

node! {
    pub struct PathRootless<'a> {
        pub first: SegmentNz<'a>,
        pub rest: Star<(Terminal<'a>, Segment<'a>)>,
    }
}

pub fn path_rootless<'a>(input: Input<'a>) -> Output<'a, PathRootless<'a>> {
    rule("path-rootless", input, |i| {
        seq((segment_nz, seq((literal("/"), segment)).repeat::<0, UNBOUNDED>()))
            .map(|(first, rest)| PathRootless { first, rest })
            .parse(i)
    })
}

node! {
    pub struct Segment<'a>(pub Star<UriChar<'a>>);
}

node! {
    pub struct SegmentNz<'a>(pub Plus<UriChar<'a>>);
}

pub fn segment<'a>(input: Input<'a>) -> Output<'a, Segment<'a>> {
    rule("segment", input, |i| pchar.repeat::<0, UNBOUNDED>().map(Segment).parse(i))
}

pub fn segment_nz<'a>(input: Input<'a>) -> Output<'a, SegmentNz<'a>> {
    rule("segment-nz", input, |i| pchar.repeat::<1, UNBOUNDED>().map(SegmentNz).parse(i))
}

fn query_char<'a>(input: Input<'a>) -> Output<'a, UriChar<'a>> {
    alt((pchar, keyword(&["/", "?"]).map(UriChar::Plain))).parse(input)
}

node! {
    pub struct Query<'a>(pub Star<UriChar<'a>>);
}

node! {
    pub struct Fragment<'a>(pub Star<UriChar<'a>>);
}

pub fn query<'a>(input: Input<'a>) -> Output<'a, Query<'a>> {
    rule("query", input, |i| query_char.repeat::<0, UNBOUNDED>().map(Query).parse(i))
}

pub fn fragment<'a>(input: Input<'a>) -> Output<'a, Fragment<'a>> {
    rule("fragment", input, |i| query_char.repeat::<0, UNBOUNDED>().map(Fragment).parse(i))
}

// ---- IRI

node! {
    pub struct IriInHeader<'a>(pub Plus<Terminal<'a>>);
}

pub fn iri_in_header<'a>(input: Input<'a>) -> Output<'a, IriInHeader<'a>> {
    rule("IRI-in-header", input, |i| {
        alt((vchar, obs_text)).repeat::<1, UNBOUNDED>().map(IriInHeader).parse(i)
    })
}

node! {
    pub struct IriInQuery<'a>(pub Plus<UriChar<'a>>);
}

pub fn iri_in_query<'a>(input: Input<'a>) -> Output<'a, IriInQuery<'a>> {
    rule("IRI-in-query", input, |i| {
        qchar_no_amp.repeat::<1, UNBOUNDED>().map(IriInQuery).parse(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn consumed<'a, T: Node>(out: &Output<'a, T>) -> Option<String> {
        out.value().map(|v| v.source())
    }

    #[test]
    fn test_uri() {
        let s = "http://user@example.com:8080/a/b%20c?x=1#top";
        let out = uri(Input::new(s));
        assert_eq!(consumed(&out).as_deref(), Some(s));
        let u = out.value().unwrap();
        assert_eq!(u.scheme.source(), "http");
        let HierPart::Network(net) = &u.hier_part else {
            panic!("expected authority form: {:?}", u.hier_part);
        };
        assert_eq!(net.authority.host.source(), "example.com");
        assert!(matches!(net.authority.host, Host::RegName(_)));
        assert_eq!(net.authority.port.as_ref().map(|p| p.1.source()).as_deref(), Some("8080"));
        assert_eq!(net.path.0.len(), 2);

        let out = uri(Input::new("urn:isbn:0451450523"));
        assert!(matches!(out.value().map(|u| &u.hier_part), Some(HierPart::Rootless(_))));
        assert!(!uri(Input::new("1http://x")).is_success());
    }

    #[test]
    fn test_host() {
        let out = host(Input::new("192.168.0.1"));
        assert!(matches!(out.value(), Some(Host::Ipv4(_))));
        assert!(out.remainder().at_end());

        // longer registered name beats the IPv4 prefix
        let out = host(Input::new("192.168.0.1.example"));
        assert!(matches!(out.value(), Some(Host::RegName(_))));
        assert!(out.remainder().at_end());

        assert!(matches!(host(Input::new("[::1]")).value(), Some(Host::IpLiteral(_))));
        assert!(matches!(host(Input::new("[v1.fe]")).value(), Some(Host::IpLiteral(_))));
    }

    #[test]
    fn test_dec_octet() {
        for s in ["0", "9", "10", "199", "249", "255"] {
            let out = dec_octet(Input::new(s));
            assert_eq!(consumed(&out).as_deref(), Some(s), "{s}");
        }
        // "256" reads as "25" and leaves the "6"
        assert_eq!(dec_octet(Input::new("256")).remainder().rest(), "6");
        assert!(!ipv4address(Input::new("1.2.3")).is_success());
    }

    #[test]
    fn test_ipv6() {
        for s in [
            "1:2:3:4:5:6:7:8",
            "1:2:3:4:5:6:1.2.3.4",
            "::1",
            "::",
            "fe80::1",
            "fe80::1:2:3:4:5",
            "1:2::3:4",
            "::ffff:10.0.0.1",
            "2001:db8::",
        ] {
            let out = ipv6address(Input::new(s));
            assert_eq!(consumed(&out).as_deref(), Some(s), "{s}");
        }
        let out = ipv6address(Input::new("1:2:3:4:5:6:7:8"));
        assert!(out.value().unwrap().elision.is_none());
        assert!(!ipv6address(Input::new("12345::")).is_success());
    }

    #[test]
    fn test_character_sets() {
        assert!(matches!(pchar(Input::new("%41")).value(), Some(UriChar::Encoded(_))));
        assert!(pchar(Input::new("'")).is_success());
        assert!(!pchar(Input::new("/")).is_success());

        assert!(!pchar_no_squote(Input::new("'")).is_success());
        assert!(!pchar_no_squote(Input::new("%27")).is_success());
        assert!(pchar_no_squote(Input::new("%28")).is_success());
        assert!(pchar_no_squote(Input::new("%2F")).is_success());

        assert!(qchar_no_amp(Input::new("=")).is_success());
        assert!(!qchar_no_amp(Input::new("&")).is_success());
        assert!(!qchar_no_amp_eq(Input::new("=")).is_success());
        assert!(!qchar_no_amp_eq_at_dollar(Input::new("$")).is_success());
        assert!(!qchar_no_amp_eq_at_dollar(Input::new("@")).is_success());

        for s in ["%22", "%25", "%5C", "%5c"] {
            assert!(!pct_encoded_unescaped(Input::new(s)).is_success(), "{s}");
        }
        assert!(pct_encoded_unescaped(Input::new("%5B")).is_success());
        assert!(matches!(
            qchar_no_amp_dquote(Input::new("\\\"")).value(),
            Some(UriChar::Escaped(_))
        ));
    }

    #[test]
    fn test_paths() {
        let out = path_absolute(Input::new("/"));
        assert!(out.value().map_or(false, |p| p.rest.is_none()));
        let out = path_absolute(Input::new("/a//b"));
        assert_eq!(out.remainder().rest(), "");
        assert_eq!(out.value().and_then(|p| p.rest.as_ref()).map(|r| r.rest.len()), Some(2));
        assert!(!segment_nz(Input::new("/")).is_success());
        assert_eq!(query(Input::new("a=1&b?/#f")).remainder().rest(), "#f");
    }

    #[test]
    fn test_iri() {
        assert_eq!(iri_in_query(Input::new("http://x/y?a=1&b")).remainder().rest(), "&b");
        assert!(iri_in_header(Input::new("héllo")).remainder().at_end());
    }
}
