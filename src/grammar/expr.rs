//! Filter and query expressions.
//!
//! Binary operators nest to the right: in `a add b mul c` the `add` node holds
//! `b mul c` as its operand. Several operand forms spell the same text (a
//! property named `contains` and the `contains(...)` method, a navigation and a
//! key path), so the operand of a `commonExpr` is the longest reading, and a
//! tie goes to the first form listed.

use crate::prelude::*;
use crate::{choice, node, rename};

use super::json::{array_or_object, ArrayOrObject};
use super::literals::{enum_literal, primitive_literal, EnumLiteral, PrimitiveLiteral};
use super::names::*;
use super::punctuation::{at, bws, close, colon, comma, eq, open, rws, semi, Bws, Rws};
use super::query::{expand_count_option, parameter_value, ExpandCountOption, ParameterValue};
use super::resource::{
    count, key_predicate, parameter_alias, parameter_name, type_cast_then, KeyPredicate,
    ParameterAlias, ParameterName,
};

choice! {
    pub enum Operand<'a> {
        Literal(Box<PrimitiveLiteral<'a>>),
        ArrayOrObject(Box<ArrayOrObject<'a>>),
        Root(Box<RootExpr<'a>>),
        MethodCall(Box<MethodCallExpr<'a>>),
        Paren(Box<ParenExpr<'a>>),
        List(Box<ListExpr<'a>>),
        Cast(Box<CastExpr<'a>>),
        Isof(Box<IsofExpr<'a>>),
        Not(Box<NotExpr<'a>>),
        FirstMember(Box<FirstMemberExpr<'a>>),
        Negate(Box<NegateExpr<'a>>),
    }
}

/// A function call such as `NS.Fn()` reads as a member, so there is no separate
/// function operand.
fn operand<'a>(input: Input<'a>) -> Output<'a, Operand<'a>> {
    longest((
        primitive_literal.map(|e| Operand::Literal(Box::new(e))),
        array_or_object.map(|e| Operand::ArrayOrObject(Box::new(e))),
        root_expr.map(|e| Operand::Root(Box::new(e))),
        method_call_expr.map(|e| Operand::MethodCall(Box::new(e))),
        paren_or_list,
        cast_expr.map(|e| Operand::Cast(Box::new(e))),
        isof_expr.map(|e| Operand::Isof(Box::new(e))),
        not_expr.map(|e| Operand::Not(Box::new(e))),
        first_member_expr.map(|e| Operand::FirstMember(Box::new(e))),
    ))
    // "-5" stays a literal; negation only applies when nothing else reads
    .or(negate_expr.map(|e| Operand::Negate(Box::new(e))))
    .parse(input)
}

node! {
    pub struct CommonExpr<'a> {
        pub operand: Operand<'a>,
        pub arithmetic: Option<ArithmeticExpr<'a>>,
        pub comparison: Option<ComparisonExpr<'a>>,
        pub logical: Option<LogicalExpr<'a>>,
    }
}

pub fn common_expr<'a>(input: Input<'a>) -> Output<'a, CommonExpr<'a>> {
    rule("commonExpr", input, |i| {
        seq((
            operand,
            arithmetic_expr.opt(),
            comparison_expr.opt(),
            logical_expr.opt(),
        ))
        .map(|(operand, arithmetic, comparison, logical)| CommonExpr {
            operand,
            arithmetic,
            comparison,
            logical,
        })
        .parse(i)
    })
}

rename!(BoolCommonExpr, bool_common_expr, "boolCommonExpr", CommonExpr, common_expr);

// ---- infix operators

macro_rules! infix {
    ($name:ident, $func:ident, $abnf:literal, $op:literal, $operand:ident, $operand_func:ident) => {
        node! {
            pub struct $name<'a> {
                pub before: Rws<'a>,
                pub operator: Terminal<'a>,
                pub after: Rws<'a>,
                pub operand: Box<$operand<'a>>,
            }
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| {
                seq((rws, literal_ci($op), rws, $operand_func))
                    .map(|(before, operator, after, operand)| $name {
                        before,
                        operator,
                        after,
                        operand: Box::new(operand),
                    })
                    .parse(i)
            })
        }
    };
}

infix!(AndExpr, and_expr, "andExpr", "and", BoolCommonExpr, bool_common_expr);
infix!(OrExpr, or_expr, "orExpr", "or", BoolCommonExpr, bool_common_expr);

infix!(EqExpr, eq_expr, "eqExpr", "eq", CommonExpr, common_expr);
infix!(NeExpr, ne_expr, "neExpr", "ne", CommonExpr, common_expr);
infix!(LtExpr, lt_expr, "ltExpr", "lt", CommonExpr, common_expr);
infix!(LeExpr, le_expr, "leExpr", "le", CommonExpr, common_expr);
infix!(GtExpr, gt_expr, "gtExpr", "gt", CommonExpr, common_expr);
infix!(GeExpr, ge_expr, "geExpr", "ge", CommonExpr, common_expr);
infix!(InExpr, in_expr, "inExpr", "in", CommonExpr, common_expr);
infix!(HasExpr, has_expr, "hasExpr", "has", EnumLiteral, enum_literal);

infix!(AddExpr, add_expr, "addExpr", "add", CommonExpr, common_expr);
infix!(SubExpr, sub_expr, "subExpr", "sub", CommonExpr, common_expr);
infix!(MulExpr, mul_expr, "mulExpr", "mul", CommonExpr, common_expr);
infix!(DivExpr, div_expr, "divExpr", "div", CommonExpr, common_expr);
infix!(DivbyExpr, divby_expr, "divbyExpr", "divby", CommonExpr, common_expr);
infix!(ModExpr, mod_expr, "modExpr", "mod", CommonExpr, common_expr);

choice! {
    pub enum ArithmeticExpr<'a> {
        Add(AddExpr<'a>),
        Sub(SubExpr<'a>),
        Mul(MulExpr<'a>),
        Div(DivExpr<'a>),
        Divby(DivbyExpr<'a>),
        Mod(ModExpr<'a>),
    }
}

fn arithmetic_expr<'a>(input: Input<'a>) -> Output<'a, ArithmeticExpr<'a>> {
    alt((
        add_expr.map(ArithmeticExpr::Add),
        sub_expr.map(ArithmeticExpr::Sub),
        mul_expr.map(ArithmeticExpr::Mul),
        div_expr.map(ArithmeticExpr::Div),
        divby_expr.map(ArithmeticExpr::Divby),
        mod_expr.map(ArithmeticExpr::Mod),
    ))
    .parse(input)
}

choice! {
    pub enum ComparisonExpr<'a> {
        Eq(EqExpr<'a>),
        Ne(NeExpr<'a>),
        Lt(LtExpr<'a>),
        Le(LeExpr<'a>),
        Gt(GtExpr<'a>),
        Ge(GeExpr<'a>),
        Has(HasExpr<'a>),
        In(InExpr<'a>),
    }
}

fn comparison_expr<'a>(input: Input<'a>) -> Output<'a, ComparisonExpr<'a>> {
    alt((
        eq_expr.map(ComparisonExpr::Eq),
        ne_expr.map(ComparisonExpr::Ne),
        lt_expr.map(ComparisonExpr::Lt),
        le_expr.map(ComparisonExpr::Le),
        gt_expr.map(ComparisonExpr::Gt),
        ge_expr.map(ComparisonExpr::Ge),
        has_expr.map(ComparisonExpr::Has),
        in_expr.map(ComparisonExpr::In),
    ))
    .parse(input)
}

choice! {
    pub enum LogicalExpr<'a> {
        And(AndExpr<'a>),
        Or(OrExpr<'a>),
    }
}

fn logical_expr<'a>(input: Input<'a>) -> Output<'a, LogicalExpr<'a>> {
    alt((and_expr.map(LogicalExpr::And), or_expr.map(LogicalExpr::Or))).parse(input)
}

// ---- prefix operators

node! {
    pub struct NegateExpr<'a> {
        pub minus: Terminal<'a>,
        pub bws: Bws<'a>,
        pub operand: Box<CommonExpr<'a>>,
    }
}

pub fn negate_expr<'a>(input: Input<'a>) -> Output<'a, NegateExpr<'a>> {
    rule("negateExpr", input, |i| {
        seq((literal("-"), bws, common_expr))
            .map(|(minus, bws, operand)| NegateExpr {
                minus,
                bws,
                operand: Box::new(operand),
            })
            .parse(i)
    })
}

node! {
    pub struct NotExpr<'a> {
        pub not: Terminal<'a>,
        pub rws: Rws<'a>,
        pub operand: Box<BoolCommonExpr<'a>>,
    }
}

pub fn not_expr<'a>(input: Input<'a>) -> Output<'a, NotExpr<'a>> {
    rule("notExpr", input, |i| {
        seq((literal_ci("not"), rws, bool_common_expr))
            .map(|(not, rws, operand)| NotExpr {
                not,
                rws,
                operand: Box::new(operand),
            })
            .parse(i)
    })
}

node! {
    /// `commonExpr BWS COMMA BWS`, the optional first argument of `isof` and `cast`.
    pub struct TypeTestTarget<'a> {
        pub expr: Box<CommonExpr<'a>>,
        pub before: Bws<'a>,
        pub comma: Terminal<'a>,
        pub after: Bws<'a>,
    }
}

fn type_test_target<'a>(input: Input<'a>) -> Output<'a, TypeTestTarget<'a>> {
    seq((common_expr, bws, comma, bws))
        .map(|(expr, before, comma, after)| TypeTestTarget {
            expr: Box::new(expr),
            before,
            comma,
            after,
        })
        .parse(input)
}

macro_rules! type_test {
    ($name:ident, $func:ident, $abnf:literal, $word:literal) => {
        node! {
            pub struct $name<'a> {
                pub keyword: Terminal<'a>,
                pub open: Terminal<'a>,
                pub bws1: Bws<'a>,
                pub target: Option<TypeTestTarget<'a>>,
                pub type_name: QualifiedTypeName<'a>,
                pub bws2: Bws<'a>,
                pub close: Terminal<'a>,
            }
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| {
                seq((
                    literal_ci($word),
                    open,
                    bws,
                    type_test_target.opt(),
                    qualified_type_name,
                    bws,
                    close,
                ))
                .map(|(keyword, open, bws1, target, type_name, bws2, close)| $name {
                    keyword,
                    open,
                    bws1,
                    target,
                    type_name,
                    bws2,
                    close,
                })
                .parse(i)
            })
        }
    };
}

type_test!(IsofExpr, isof_expr, "isofExpr", "isof");
type_test!(CastExpr, cast_expr, "castExpr", "cast");

// ---- grouping

node! {
    pub struct ParenExpr<'a> {
        pub open: Terminal<'a>,
        pub bws1: Bws<'a>,
        pub expr: Box<CommonExpr<'a>>,
        pub bws2: Bws<'a>,
        pub close: Terminal<'a>,
    }
}

pub fn paren_expr<'a>(input: Input<'a>) -> Output<'a, ParenExpr<'a>> {
    rule("parenExpr", input, |i| {
        seq((open, bws, common_expr, bws, close))
            .map(|(open, bws1, expr, bws2, close)| ParenExpr {
                open,
                bws1,
                expr: Box::new(expr),
                bws2,
                close,
            })
            .parse(i)
    })
}

node! {
    pub struct ListExpr<'a> {
        pub open: Terminal<'a>,
        pub bws1: Bws<'a>,
        pub first: Box<CommonExpr<'a>>,
        pub bws2: Bws<'a>,
        pub rest: Star<(Terminal<'a>, Bws<'a>, CommonExpr<'a>, Bws<'a>)>,
        pub close: Terminal<'a>,
    }
}

impl<'a> ListExpr<'a> {
    pub fn items(&self) -> impl Iterator<Item = &CommonExpr<'a>> {
        std::iter::once(&*self.first).chain(self.rest.iter().map(|(_, _, e, _)| e))
    }
}

type ListBody<'a> = (
    Terminal<'a>,
    Bws<'a>,
    CommonExpr<'a>,
    Bws<'a>,
    Star<(Terminal<'a>, Bws<'a>, CommonExpr<'a>, Bws<'a>)>,
    Terminal<'a>,
);

fn list_body<'a>(input: Input<'a>) -> Output<'a, ListBody<'a>> {
    seq((
        open,
        bws,
        common_expr,
        bws,
        seq((comma, bws, common_expr, bws)).repeat::<0, UNBOUNDED>(),
        close,
    ))
    .parse(input)
}

pub fn list_expr<'a>(input: Input<'a>) -> Output<'a, ListExpr<'a>> {
    rule("listExpr", input, |i| {
        list_body
            .map(|(open, bws1, first, bws2, rest, close)| ListExpr {
                open,
                bws1,
                first: Box::new(first),
                bws2,
                rest,
                close,
            })
            .parse(i)
    })
}

/// A parenthesized expression and a list share their opening, so the group is
/// read once and a single item without a comma becomes a `parenExpr`.
fn paren_or_list<'a>(input: Input<'a>) -> Output<'a, Operand<'a>> {
    list_body
        .map(|(open, bws1, first, bws2, rest, close)| {
            if rest.is_empty() {
                Operand::Paren(Box::new(ParenExpr {
                    open,
                    bws1,
                    expr: Box::new(first),
                    bws2,
                    close,
                }))
            } else {
                Operand::List(Box::new(ListExpr {
                    open,
                    bws1,
                    first: Box::new(first),
                    bws2,
                    rest,
                    close,
                }))
            }
        })
        .parse(input)
}

// ---- paths

choice! {
    pub enum RootTarget<'a> {
        EntitySet((EntitySetName<'a>, KeyPredicate<'a>)),
        Singleton(SingletonEntity<'a>),
    }
}

node! {
    pub struct RootExpr<'a> {
        pub root: Terminal<'a>,
        pub target: RootTarget<'a>,
        pub navigation: Option<Box<SingleNavigationExpr<'a>>>,
    }
}

pub fn root_expr<'a>(input: Input<'a>) -> Output<'a, RootExpr<'a>> {
    rule("rootExpr", input, |i| {
        seq((
            literal("$root/"),
            alt((
                seq((entity_set_name, key_predicate)).map(RootTarget::EntitySet),
                singleton_entity.map(RootTarget::Singleton),
            )),
            single_navigation_expr.map(Box::new).opt(),
        ))
        .map(|(root, target, navigation)| RootExpr {
            root,
            target,
            navigation,
        })
        .parse(i)
    })
}

node! {
    pub struct InscopeMemberExpr<'a> {
        pub variable: InscopeVariableExpr<'a>,
        pub member: Option<(Terminal<'a>, MemberExpr<'a>)>,
    }
}

choice! {
    pub enum FirstMemberExpr<'a> {
        Member(MemberExpr<'a>),
        Inscope(InscopeMemberExpr<'a>),
    }
}

pub fn first_member_expr<'a>(input: Input<'a>) -> Output<'a, FirstMemberExpr<'a>> {
    rule("firstMemberExpr", input, |i| {
        alt((
            member_expr.map(FirstMemberExpr::Member),
            seq((inscope_variable_expr, seq((literal("/"), member_expr)).opt())).map(
                |(variable, member)| {
                    FirstMemberExpr::Inscope(InscopeMemberExpr { variable, member })
                },
            ),
        ))
        .parse(i)
    })
}

choice! {
    pub enum MemberKind<'a> {
        Property(PropertyPathExpr<'a>),
        BoundFunction(BoundFunctionExpr<'a>),
        Annotation(AnnotationExpr<'a>),
    }
}

node! {
    pub struct MemberExpr<'a> {
        pub type_cast: Option<(QualifiedEntityTypeName<'a>, Terminal<'a>)>,
        pub member: MemberKind<'a>,
    }
}

/// A bound function consumes at least `NS.Fn()` where a property path stops
/// after `NS`, so the first form that parses is also the longest.
pub fn member_expr<'a>(input: Input<'a>) -> Output<'a, MemberExpr<'a>> {
    rule("memberExpr", input, |i| {
        seq((
            seq((qualified_entity_type_name, literal("/"))).opt(),
            alt((
                bound_function_expr.map(MemberKind::BoundFunction),
                annotation_expr.map(MemberKind::Annotation),
                property_path_expr.map(MemberKind::Property),
            )),
        ))
        .map(|(type_cast, member)| MemberExpr { type_cast, member })
        .parse(i)
    })
}

choice! {
    pub enum PropertyPathExpr<'a> {
        Primitive((PrimitiveProperty<'a>, Option<Box<PrimitivePathExpr<'a>>>)),
        Complex((ComplexProperty<'a>, Option<Box<ComplexPathExpr<'a>>>)),
        EntityColNavigation((EntityColNavigationProperty<'a>, Option<Box<CollectionNavigationExpr<'a>>>)),
    }
}

impl<'a> PropertyPathExpr<'a> {
    /// The property name that starts the path.
    pub fn property(&self) -> &OdataIdentifier<'a> {
        match self {
            Self::Primitive((PrimitiveProperty::Key(p), _)) => &p.0,
            Self::Primitive((PrimitiveProperty::NonKey(p), _)) => &p.0,
            Self::Complex((p, _)) => &p.0,
            Self::EntityColNavigation((p, _)) => &p.0,
        }
    }
}

/// The name is read once and what follows it decides the kind of property:
/// a bare name is primitive, `/Prop` or a cast continues a complex value, and
/// keys, `/$count` and lambdas navigate a collection.
pub fn property_path_expr<'a>(input: Input<'a>) -> Output<'a, PropertyPathExpr<'a>> {
    use PropertyPathExpr as P;
    rule("propertyPathExpr", input, |i| {
        seq((odata_identifier, path_expr_tail.opt()))
            .map(|(name, tail)| match tail {
                None => P::Primitive((PrimitiveProperty::Key(PrimitiveKeyProperty(name)), None)),
                Some(PathExprTail::Primitive(path)) => P::Primitive((
                    PrimitiveProperty::Key(PrimitiveKeyProperty(name)),
                    Some(Box::new(path)),
                )),
                Some(PathExprTail::Complex(path)) => {
                    P::Complex((ComplexProperty(name), Some(Box::new(path))))
                }
                Some(PathExprTail::Collection(nav)) => P::EntityColNavigation((
                    EntityColNavigationProperty(name),
                    Some(Box::new(nav)),
                )),
            })
            .parse(i)
    })
}

// What follows a property name or the parameters of a function call.
enum PathExprTail<'a> {
    Primitive(PrimitivePathExpr<'a>),
    Complex(ComplexPathExpr<'a>),
    Collection(CollectionNavigationExpr<'a>),
}

// "/" namespace "." identifier
fn slash_qualified<'a>(input: Input<'a>) -> Output<'a, ()> {
    seq((literal("/"), namespace, literal("."), odata_identifier))
        .map(|_| ())
        .parse(input)
}

fn nonempty_collection_navigation<'a>(input: Input<'a>) -> Output<'a, PathExprTail<'a>> {
    collection_navigation_expr
        .map_opt(|nav| {
            (nav.type_cast.is_some() || nav.path.is_some())
                .then_some(PathExprTail::Collection(nav))
        })
        .parse(input)
}

// "/" qualifiedEntityTypeName keyPredicate [ singleNavigationExpr ]
fn cast_then_key<'a>(input: Input<'a>) -> Output<'a, PathExprTail<'a>> {
    seq((
        literal("/"),
        qualified_entity_type_name,
        key_predicate,
        single_navigation_expr.opt(),
    ))
    .map(|(slash, type_name, key, nav)| {
        PathExprTail::Collection(CollectionNavigationExpr {
            type_cast: Some((slash, type_name)),
            path: Some(CollectionNavigationPath::Key((key, nav))),
        })
    })
    .parse(input)
}

/// The next few characters select the one continuation that can apply, so the
/// rest of a member path is parsed once per segment rather than once per
/// property kind. Where two readings remain, at most one of them recurses.
fn path_expr_tail<'a>(input: Input<'a>) -> Output<'a, PathExprTail<'a>> {
    use PathExprTail as T;
    let lambda = || {
        seq((literal("/"), alt((literal_ci("any"), literal_ci("all"))), open)).map(|_| ())
    };
    alt((
        when(open, nonempty_collection_navigation),
        when(count, nonempty_collection_navigation),
        when(lambda(), nonempty_collection_navigation),
        when(seq((literal("/"), at)), primitive_path_expr.map(T::Primitive)),
        when(
            seq((slash_qualified, open)),
            alt((
                primitive_path_expr
                    .map_opt(|path| path.path.is_some().then_some(T::Primitive(path))),
                cast_then_key,
            )),
        ),
        when(
            seq((slash_qualified, alt((count.map(|_| ()), lambda())))),
            nonempty_collection_navigation,
        ),
        when(slash_qualified, complex_path_expr.map(T::Complex)),
        when(
            seq((literal("/"), odata_identifier)),
            longest((complex_path_expr.map(T::Complex), nonempty_collection_navigation)),
        ),
        when(
            literal("/"),
            longest((primitive_path_expr.map(T::Primitive), nonempty_collection_navigation)),
        ),
    ))
    .parse(input)
}

choice! {
    pub enum AnnotationPath<'a> {
        Collection(Box<CollectionPathExpr<'a>>),
        SingleNavigation(Box<SingleNavigationExpr<'a>>),
        Complex(Box<ComplexPathExpr<'a>>),
        Primitive(Box<PrimitivePathExpr<'a>>),
    }
}

node! {
    pub struct AnnotationExpr<'a> {
        pub annotation: Annotation<'a>,
        pub path: Option<AnnotationPath<'a>>,
    }
}

pub fn annotation_expr<'a>(input: Input<'a>) -> Output<'a, AnnotationExpr<'a>> {
    rule("annotationExpr", input, |i| {
        seq((
            annotation,
            alt((
                collection_path_expr.map(|p| AnnotationPath::Collection(Box::new(p))),
                single_navigation_expr.map(|p| AnnotationPath::SingleNavigation(Box::new(p))),
                complex_path_expr.map(|p| AnnotationPath::Complex(Box::new(p))),
                primitive_path_expr.map(|p| AnnotationPath::Primitive(Box::new(p))),
            ))
            .opt(),
        ))
        .map(|(annotation, path)| AnnotationExpr { annotation, path })
        .parse(i)
    })
}

node! {
    pub struct Annotation<'a> {
        pub at: Terminal<'a>,
        pub namespace: Option<(Namespace<'a>, Terminal<'a>)>,
        pub term: TermName<'a>,
        pub qualifier: Option<(Terminal<'a>, AnnotationQualifier<'a>)>,
    }
}

pub fn annotation<'a>(input: Input<'a>) -> Output<'a, Annotation<'a>> {
    rule("annotation", input, |i| {
        seq((
            at,
            seq((namespace, literal("."))).opt(),
            term_name,
            seq((literal("#"), annotation_qualifier)).opt(),
        ))
        .map(|(at, namespace, term, qualifier)| Annotation {
            at,
            namespace,
            term,
            qualifier,
        })
        .parse(i)
    })
}

rename!(
    AnnotationQualifier,
    annotation_qualifier,
    "annotationQualifier",
    OdataIdentifier,
    odata_identifier
);

choice! {
    pub enum InscopeVariableExpr<'a> {
        Implicit(Terminal<'a>),
        Alias(ParameterAlias<'a>),
        Lambda(LambdaVariableExpr<'a>),
    }
}

pub fn inscope_variable_expr<'a>(input: Input<'a>) -> Output<'a, InscopeVariableExpr<'a>> {
    rule("inscopeVariableExpr", input, |i| {
        alt((
            implicit_variable_expr.map(InscopeVariableExpr::Implicit),
            parameter_alias.map(InscopeVariableExpr::Alias),
            lambda_variable_expr.map(InscopeVariableExpr::Lambda),
        ))
        .parse(i)
    })
}

/// `$it` or `$this`.
pub fn implicit_variable_expr<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    rule("implicitVariableExpr", input, |i| keyword(&["$it", "$this"]).parse(i))
}

rename!(
    LambdaVariableExpr,
    lambda_variable_expr,
    "lambdaVariableExpr",
    OdataIdentifier,
    odata_identifier
);

choice! {
    pub enum CollectionNavigationPath<'a> {
        Collection(CollectionPathExpr<'a>),
        Key((KeyPredicate<'a>, Option<SingleNavigationExpr<'a>>)),
    }
}

node! {
    pub struct CollectionNavigationExpr<'a> {
        pub type_cast: Option<(Terminal<'a>, QualifiedEntityTypeName<'a>)>,
        pub path: Option<CollectionNavigationPath<'a>>,
    }
}

/// `/$count` and `/any(...)` also read as key path segments, so the collection
/// path is tried before the key predicate.
fn collection_navigation_path<'a>(input: Input<'a>) -> Output<'a, CollectionNavigationPath<'a>> {
    alt((
        collection_path_expr.map(CollectionNavigationPath::Collection),
        seq((key_predicate, single_navigation_expr.opt())).map(CollectionNavigationPath::Key),
    ))
    .parse(input)
}

pub fn collection_navigation_expr<'a>(input: Input<'a>) -> Output<'a, CollectionNavigationExpr<'a>> {
    rule("collectionNavigationExpr", input, |i| {
        type_cast_then(i, qualified_entity_type_name, collection_navigation_path)
            .map(|(type_cast, path)| CollectionNavigationExpr { type_cast, path })
    })
}

node! {
    pub struct SingleNavigationExpr<'a> {
        pub slash: Terminal<'a>,
        pub member: Box<MemberExpr<'a>>,
    }
}

pub fn single_navigation_expr<'a>(input: Input<'a>) -> Output<'a, SingleNavigationExpr<'a>> {
    rule("singleNavigationExpr", input, |i| {
        seq((literal("/"), member_expr))
            .map(|(slash, member)| SingleNavigationExpr {
                slash,
                member: Box::new(member),
            })
            .parse(i)
    })
}

node! {
    pub struct ComplexColPathExpr<'a> {
        pub type_cast: Option<(Terminal<'a>, QualifiedComplexTypeName<'a>)>,
        pub path: Option<CollectionPathExpr<'a>>,
    }
}

pub fn complex_col_path_expr<'a>(input: Input<'a>) -> Output<'a, ComplexColPathExpr<'a>> {
    rule("complexColPathExpr", input, |i| {
        type_cast_then(i, qualified_complex_type_name, collection_path_expr)
            .map(|(type_cast, path)| ComplexColPathExpr { type_cast, path })
    })
}

node! {
    pub struct CountExpr<'a> {
        pub count: Terminal<'a>,
        pub options: Option<(Terminal<'a>, Delimited<ExpandCountOption<'a>, Terminal<'a>>, Terminal<'a>)>,
    }
}

choice! {
    pub enum CollectionPathExpr<'a> {
        Count(CountExpr<'a>),
        BoundFunction((Terminal<'a>, BoundFunctionExpr<'a>)),
        Annotation((Terminal<'a>, AnnotationExpr<'a>)),
        Any((Terminal<'a>, AnyExpr<'a>)),
        All((Terminal<'a>, AllExpr<'a>)),
    }
}

pub fn collection_path_expr<'a>(input: Input<'a>) -> Output<'a, CollectionPathExpr<'a>> {
    use CollectionPathExpr as C;
    rule("collectionPathExpr", input, |i| {
        alt((
            seq((
                count,
                seq((open, sep_by(expand_count_option, semi), close)).opt(),
            ))
            .map(|(count, options)| C::Count(CountExpr { count, options })),
            seq((literal("/"), bound_function_expr)).map(C::BoundFunction),
            seq((literal("/"), annotation_expr)).map(C::Annotation),
            seq((literal("/"), any_expr)).map(C::Any),
            seq((literal("/"), all_expr)).map(C::All),
        ))
        .parse(i)
    })
}

choice! {
    pub enum ComplexPathExprTail<'a> {
        BoundFunction((Terminal<'a>, BoundFunctionExpr<'a>)),
        Annotation((Terminal<'a>, AnnotationExpr<'a>)),
        Property((Terminal<'a>, PropertyPathExpr<'a>)),
    }
}

node! {
    pub struct ComplexPathExpr<'a> {
        pub type_cast: Option<(Terminal<'a>, QualifiedComplexTypeName<'a>)>,
        pub path: Option<ComplexPathExprTail<'a>>,
    }
}

/// A property path would stop after the namespace of `/NS.Func()`, so the bound
/// function is tried first.
fn complex_path_expr_tail<'a>(input: Input<'a>) -> Output<'a, ComplexPathExprTail<'a>> {
    alt((
        seq((literal("/"), bound_function_expr)).map(ComplexPathExprTail::BoundFunction),
        seq((literal("/"), annotation_expr)).map(ComplexPathExprTail::Annotation),
        seq((literal("/"), property_path_expr)).map(ComplexPathExprTail::Property),
    ))
    .parse(input)
}

pub fn complex_path_expr<'a>(input: Input<'a>) -> Output<'a, ComplexPathExpr<'a>> {
    rule("complexPathExpr", input, |i| {
        type_cast_then(i, qualified_complex_type_name, complex_path_expr_tail)
            .map(|(type_cast, path)| ComplexPathExpr { type_cast, path })
    })
}

choice! {
    pub enum PrimitivePathTail<'a> {
        Annotation(AnnotationExpr<'a>),
        BoundFunction(BoundFunctionExpr<'a>),
    }
}

node! {
    pub struct PrimitivePathExpr<'a> {
        pub slash: Terminal<'a>,
        pub path: Option<PrimitivePathTail<'a>>,
    }
}

pub fn primitive_path_expr<'a>(input: Input<'a>) -> Output<'a, PrimitivePathExpr<'a>> {
    rule("primitivePathExpr", input, |i| {
        seq((
            literal("/"),
            alt((
                annotation_expr.map(PrimitivePathTail::Annotation),
                bound_function_expr.map(PrimitivePathTail::BoundFunction),
            ))
            .opt(),
        ))
        .map(|(slash, path)| PrimitivePathExpr { slash, path })
        .parse(i)
    })
}

node! {
    pub struct BoundFunctionExpr<'a>(pub Box<FunctionExpr<'a>>);
}

pub fn bound_function_expr<'a>(input: Input<'a>) -> Output<'a, BoundFunctionExpr<'a>> {
    rule("boundFunctionExpr", input, |i| {
        function_expr
            .map(|f| BoundFunctionExpr(Box::new(f)))
            .parse(i)
    })
}

// ---- function calls

choice! {
    pub enum FunctionCallExpr<'a> {
        EntityCol((EntityColFunction<'a>, FunctionExprParameters<'a>, Option<Box<CollectionNavigationExpr<'a>>>)),
        Complex((ComplexFunction<'a>, FunctionExprParameters<'a>, Option<Box<ComplexPathExpr<'a>>>)),
        Primitive((PrimitiveFunction<'a>, FunctionExprParameters<'a>, Option<Box<PrimitivePathExpr<'a>>>)),
    }
}

node! {
    pub struct FunctionExpr<'a> {
        pub namespace: Namespace<'a>,
        pub dot: Terminal<'a>,
        pub call: FunctionCallExpr<'a>,
    }
}

/// The function kind follows from the path after the parameters; with nothing
/// after them the call returns a collection of entities.
pub fn function_expr<'a>(input: Input<'a>) -> Output<'a, FunctionExpr<'a>> {
    use FunctionCallExpr as C;
    rule("functionExpr", input, |i| {
        seq((
            namespace,
            literal("."),
            odata_identifier,
            function_expr_parameters,
            path_expr_tail.opt(),
        ))
        .map(|(namespace, dot, name, params, tail)| {
            let call = match tail {
                None => C::EntityCol((EntityColFunction(name), params, None)),
                Some(PathExprTail::Collection(nav)) => {
                    C::EntityCol((EntityColFunction(name), params, Some(Box::new(nav))))
                }
                Some(PathExprTail::Complex(path)) => {
                    C::Complex((ComplexFunction(name), params, Some(Box::new(path))))
                }
                Some(PathExprTail::Primitive(path)) => {
                    C::Primitive((PrimitiveFunction(name), params, Some(Box::new(path))))
                }
            };
            FunctionExpr {
                namespace,
                dot,
                call,
            }
        })
        .parse(i)
    })
}

node! {
    pub struct FunctionExprParameters<'a> {
        pub open: Terminal<'a>,
        pub params: Option<Delimited<FunctionExprParameter<'a>, Terminal<'a>>>,
        pub close: Terminal<'a>,
    }
}

pub fn function_expr_parameters<'a>(input: Input<'a>) -> Output<'a, FunctionExprParameters<'a>> {
    rule("functionExprParameters", input, |i| {
        seq((open, sep_by(function_expr_parameter, comma).opt(), close))
            .map(|(open, params, close)| FunctionExprParameters {
                open,
                params,
                close,
            })
            .parse(i)
    })
}

choice! {
    pub enum FunctionExprArgument<'a> {
        Alias(ParameterAlias<'a>),
        Value(ParameterValue<'a>),
    }
}

node! {
    pub struct FunctionExprParameter<'a> {
        pub name: ParameterName<'a>,
        pub eq: Terminal<'a>,
        pub value: FunctionExprArgument<'a>,
    }
}

pub fn function_expr_parameter<'a>(input: Input<'a>) -> Output<'a, FunctionExprParameter<'a>> {
    rule("functionExprParameter", input, |i| {
        seq((
            parameter_name,
            eq,
            alt((
                parameter_alias.map(FunctionExprArgument::Alias),
                parameter_value.map(FunctionExprArgument::Value),
            )),
        ))
        .map(|(name, eq, value)| FunctionExprParameter { name, eq, value })
        .parse(i)
    })
}

// ---- lambdas

node! {
    pub struct LambdaBody<'a> {
        pub variable: LambdaVariableExpr<'a>,
        pub bws1: Bws<'a>,
        pub colon: Terminal<'a>,
        pub bws2: Bws<'a>,
        pub predicate: LambdaPredicateExpr<'a>,
    }
}

fn lambda_body<'a>(input: Input<'a>) -> Output<'a, LambdaBody<'a>> {
    seq((lambda_variable_expr, bws, colon, bws, lambda_predicate_expr))
        .map(|(variable, bws1, colon, bws2, predicate)| LambdaBody {
            variable,
            bws1,
            colon,
            bws2,
            predicate,
        })
        .parse(input)
}

node! {
    pub struct AnyExpr<'a> {
        pub any: Terminal<'a>,
        pub open: Terminal<'a>,
        pub bws1: Bws<'a>,
        pub body: Option<LambdaBody<'a>>,
        pub bws2: Bws<'a>,
        pub close: Terminal<'a>,
    }
}

pub fn any_expr<'a>(input: Input<'a>) -> Output<'a, AnyExpr<'a>> {
    rule("anyExpr", input, |i| {
        seq((literal_ci("any"), open, bws, lambda_body.opt(), bws, close))
            .map(|(any, open, bws1, body, bws2, close)| AnyExpr {
                any,
                open,
                bws1,
                body,
                bws2,
                close,
            })
            .parse(i)
    })
}

node! {
    pub struct AllExpr<'a> {
        pub all: Terminal<'a>,
        pub open: Terminal<'a>,
        pub bws1: Bws<'a>,
        pub body: LambdaBody<'a>,
        pub bws2: Bws<'a>,
        pub close: Terminal<'a>,
    }
}

pub fn all_expr<'a>(input: Input<'a>) -> Output<'a, AllExpr<'a>> {
    rule("allExpr", input, |i| {
        seq((literal_ci("all"), open, bws, lambda_body, bws, close))
            .map(|(all, open, bws1, body, bws2, close)| AllExpr {
                all,
                open,
                bws1,
                body,
                bws2,
                close,
            })
            .parse(i)
    })
}

rename!(
    LambdaPredicateExpr,
    lambda_predicate_expr,
    "lambdaPredicateExpr",
    BoolCommonExpr,
    bool_common_expr
);

// ---- method calls

node! {
    /// `name OPEN BWS CLOSE`
    pub struct NullaryCall<'a> {
        pub name: Terminal<'a>,
        pub open: Terminal<'a>,
        pub bws: Bws<'a>,
        pub close: Terminal<'a>,
    }
}

fn nullary_call<'a>(name: &'static str, input: Input<'a>) -> Output<'a, NullaryCall<'a>> {
    seq((literal_ci(name), open, bws, close))
        .map(|(name, open, bws, close)| NullaryCall {
            name,
            open,
            bws,
            close,
        })
        .parse(input)
}

node! {
    /// `name OPEN BWS commonExpr BWS CLOSE`
    pub struct UnaryCall<'a> {
        pub name: Terminal<'a>,
        pub open: Terminal<'a>,
        pub bws1: Bws<'a>,
        pub arg: Box<CommonExpr<'a>>,
        pub bws2: Bws<'a>,
        pub close: Terminal<'a>,
    }
}

fn unary_call<'a>(name: &'static str, input: Input<'a>) -> Output<'a, UnaryCall<'a>> {
    seq((literal_ci(name), open, bws, common_expr, bws, close))
        .map(|(name, open, bws1, arg, bws2, close)| UnaryCall {
            name,
            open,
            bws1,
            arg: Box::new(arg),
            bws2,
            close,
        })
        .parse(input)
}

node! {
    /// `BWS COMMA BWS commonExpr`, an argument after the first.
    pub struct NextArg<'a> {
        pub bws1: Bws<'a>,
        pub comma: Terminal<'a>,
        pub bws2: Bws<'a>,
        pub arg: Box<CommonExpr<'a>>,
    }
}

fn next_arg<'a>(input: Input<'a>) -> Output<'a, NextArg<'a>> {
    seq((bws, comma, bws, common_expr))
        .map(|(bws1, comma, bws2, arg)| NextArg {
            bws1,
            comma,
            bws2,
            arg: Box::new(arg),
        })
        .parse(input)
}

node! {
    /// `name OPEN BWS commonExpr BWS COMMA BWS commonExpr BWS CLOSE`
    pub struct BinaryCall<'a> {
        pub name: Terminal<'a>,
        pub open: Terminal<'a>,
        pub bws1: Bws<'a>,
        pub first: Box<CommonExpr<'a>>,
        pub second: NextArg<'a>,
        pub bws2: Bws<'a>,
        pub close: Terminal<'a>,
    }
}

fn binary_call<'a>(name: &'static str, input: Input<'a>) -> Output<'a, BinaryCall<'a>> {
    seq((literal_ci(name), open, bws, common_expr, next_arg, bws, close))
        .map(|(name, open, bws1, first, second, bws2, close)| BinaryCall {
            name,
            open,
            bws1,
            first: Box::new(first),
            second,
            bws2,
            close,
        })
        .parse(input)
}

node! {
    /// `substring` takes an optional third argument.
    pub struct SubstringCall<'a> {
        pub name: Terminal<'a>,
        pub open: Terminal<'a>,
        pub bws1: Bws<'a>,
        pub first: Box<CommonExpr<'a>>,
        pub second: NextArg<'a>,
        pub third: Option<NextArg<'a>>,
        pub bws2: Bws<'a>,
        pub close: Terminal<'a>,
    }
}

fn substring_call<'a>(name: &'static str, input: Input<'a>) -> Output<'a, SubstringCall<'a>> {
    seq((
        literal_ci(name),
        open,
        bws,
        common_expr,
        next_arg,
        next_arg.opt(),
        bws,
        close,
    ))
    .map(
        |(name, open, bws1, first, second, third, bws2, close)| SubstringCall {
            name,
            open,
            bws1,
            first: Box::new(first),
            second,
            third,
            bws2,
            close,
        },
    )
    .parse(input)
}

macro_rules! method_call {
    ($name:ident, $func:ident, $abnf:literal, $word:literal, $shape:ident, $shape_func:ident) => {
        node! {
            pub struct $name<'a>(pub $shape<'a>);
        }

        pub fn $func<'a>(input: Input<'a>) -> Output<'a, $name<'a>> {
            rule($abnf, input, |i| $shape_func($word, i).map($name))
        }
    };
}

method_call!(ConcatMethodCallExpr, concat_method_call_expr, "concatMethodCallExpr", "concat", BinaryCall, binary_call);
method_call!(ContainsMethodCallExpr, contains_method_call_expr, "containsMethodCallExpr", "contains", BinaryCall, binary_call);
method_call!(EndsWithMethodCallExpr, ends_with_method_call_expr, "endsWithMethodCallExpr", "endswith", BinaryCall, binary_call);
method_call!(IndexOfMethodCallExpr, index_of_method_call_expr, "indexOfMethodCallExpr", "indexof", BinaryCall, binary_call);
method_call!(LengthMethodCallExpr, length_method_call_expr, "lengthMethodCallExpr", "length", UnaryCall, unary_call);
method_call!(StartsWithMethodCallExpr, starts_with_method_call_expr, "startsWithMethodCallExpr", "startswith", BinaryCall, binary_call);
method_call!(SubstringMethodCallExpr, substring_method_call_expr, "substringMethodCallExpr", "substring", SubstringCall, substring_call);
method_call!(ToLowerMethodCallExpr, to_lower_method_call_expr, "toLowerMethodCallExpr", "tolower", UnaryCall, unary_call);
method_call!(ToUpperMethodCallExpr, to_upper_method_call_expr, "toUpperMethodCallExpr", "toupper", UnaryCall, unary_call);
method_call!(TrimMethodCallExpr, trim_method_call_expr, "trimMethodCallExpr", "trim", UnaryCall, unary_call);

method_call!(YearMethodCallExpr, year_method_call_expr, "yearMethodCallExpr", "year", UnaryCall, unary_call);
method_call!(MonthMethodCallExpr, month_method_call_expr, "monthMethodCallExpr", "month", UnaryCall, unary_call);
method_call!(DayMethodCallExpr, day_method_call_expr, "dayMethodCallExpr", "day", UnaryCall, unary_call);
method_call!(HourMethodCallExpr, hour_method_call_expr, "hourMethodCallExpr", "hour", UnaryCall, unary_call);
method_call!(MinuteMethodCallExpr, minute_method_call_expr, "minuteMethodCallExpr", "minute", UnaryCall, unary_call);
method_call!(SecondMethodCallExpr, second_method_call_expr, "secondMethodCallExpr", "second", UnaryCall, unary_call);
method_call!(
    FractionalsecondsMethodCallExpr,
    fractionalseconds_method_call_expr,
    "fractionalsecondsMethodCallExpr",
    "fractionalseconds",
    UnaryCall,
    unary_call
);
method_call!(
    TotalsecondsMethodCallExpr,
    totalseconds_method_call_expr,
    "totalsecondsMethodCallExpr",
    "totalseconds",
    UnaryCall,
    unary_call
);
method_call!(DateMethodCallExpr, date_method_call_expr, "dateMethodCallExpr", "date", UnaryCall, unary_call);
method_call!(TimeMethodCallExpr, time_method_call_expr, "timeMethodCallExpr", "time", UnaryCall, unary_call);
method_call!(
    TotalOffsetMinutesMethodCallExpr,
    total_offset_minutes_method_call_expr,
    "totalOffsetMinutesMethodCallExpr",
    "totaloffsetminutes",
    UnaryCall,
    unary_call
);

method_call!(
    MinDateTimeMethodCallExpr,
    min_date_time_method_call_expr,
    "minDateTimeMethodCallExpr",
    "mindatetime",
    NullaryCall,
    nullary_call
);
method_call!(
    MaxDateTimeMethodCallExpr,
    max_date_time_method_call_expr,
    "maxDateTimeMethodCallExpr",
    "maxdatetime",
    NullaryCall,
    nullary_call
);
method_call!(NowMethodCallExpr, now_method_call_expr, "nowMethodCallExpr", "now", NullaryCall, nullary_call);

method_call!(RoundMethodCallExpr, round_method_call_expr, "roundMethodCallExpr", "round", UnaryCall, unary_call);
method_call!(FloorMethodCallExpr, floor_method_call_expr, "floorMethodCallExpr", "floor", UnaryCall, unary_call);
method_call!(
    CeilingMethodCallExpr,
    ceiling_method_call_expr,
    "ceilingMethodCallExpr",
    "ceiling",
    UnaryCall,
    unary_call
);

method_call!(
    DistanceMethodCallExpr,
    distance_method_call_expr,
    "distanceMethodCallExpr",
    "geo.distance",
    BinaryCall,
    binary_call
);
method_call!(
    GeoLengthMethodCallExpr,
    geo_length_method_call_expr,
    "geoLengthMethodCallExpr",
    "geo.length",
    UnaryCall,
    unary_call
);
method_call!(
    IntersectsMethodCallExpr,
    intersects_method_call_expr,
    "intersectsMethodCallExpr",
    "geo.intersects",
    BinaryCall,
    binary_call
);

method_call!(
    HasSubsetMethodCallExpr,
    has_subset_method_call_expr,
    "hasSubsetMethodCallExpr",
    "hassubset",
    BinaryCall,
    binary_call
);
method_call!(
    HasSubsequenceMethodCallExpr,
    has_subsequence_method_call_expr,
    "hasSubsequenceMethodCallExpr",
    "hassubsequence",
    BinaryCall,
    binary_call
);

choice! {
    pub enum MethodCallExpr<'a> {
        IndexOf(IndexOfMethodCallExpr<'a>),
        ToLower(ToLowerMethodCallExpr<'a>),
        ToUpper(ToUpperMethodCallExpr<'a>),
        Trim(TrimMethodCallExpr<'a>),
        Substring(SubstringMethodCallExpr<'a>),
        Concat(ConcatMethodCallExpr<'a>),
        Length(LengthMethodCallExpr<'a>),
        Year(YearMethodCallExpr<'a>),
        Month(MonthMethodCallExpr<'a>),
        Day(DayMethodCallExpr<'a>),
        Hour(HourMethodCallExpr<'a>),
        Minute(MinuteMethodCallExpr<'a>),
        Second(SecondMethodCallExpr<'a>),
        Fractionalseconds(FractionalsecondsMethodCallExpr<'a>),
        Totalseconds(TotalsecondsMethodCallExpr<'a>),
        Date(DateMethodCallExpr<'a>),
        Time(TimeMethodCallExpr<'a>),
        Round(RoundMethodCallExpr<'a>),
        Floor(FloorMethodCallExpr<'a>),
        Ceiling(CeilingMethodCallExpr<'a>),
        Distance(DistanceMethodCallExpr<'a>),
        GeoLength(GeoLengthMethodCallExpr<'a>),
        TotalOffsetMinutes(TotalOffsetMinutesMethodCallExpr<'a>),
        MinDateTime(MinDateTimeMethodCallExpr<'a>),
        MaxDateTime(MaxDateTimeMethodCallExpr<'a>),
        Now(NowMethodCallExpr<'a>),
        Bool(BoolMethodCallExpr<'a>),
    }
}

pub fn method_call_expr<'a>(input: Input<'a>) -> Output<'a, MethodCallExpr<'a>> {
    use MethodCallExpr as M;
    rule("methodCallExpr", input, |i| {
        alt((
            alt((
                index_of_method_call_expr.map(M::IndexOf),
                to_lower_method_call_expr.map(M::ToLower),
                to_upper_method_call_expr.map(M::ToUpper),
                trim_method_call_expr.map(M::Trim),
                substring_method_call_expr.map(M::Substring),
                concat_method_call_expr.map(M::Concat),
                length_method_call_expr.map(M::Length),
                year_method_call_expr.map(M::Year),
                month_method_call_expr.map(M::Month),
                day_method_call_expr.map(M::Day),
                hour_method_call_expr.map(M::Hour),
                minute_method_call_expr.map(M::Minute),
                second_method_call_expr.map(M::Second),
            )),
            alt((
                fractionalseconds_method_call_expr.map(M::Fractionalseconds),
                totalseconds_method_call_expr.map(M::Totalseconds),
                date_method_call_expr.map(M::Date),
                time_method_call_expr.map(M::Time),
                round_method_call_expr.map(M::Round),
                floor_method_call_expr.map(M::Floor),
                ceiling_method_call_expr.map(M::Ceiling),
                distance_method_call_expr.map(M::Distance),
                geo_length_method_call_expr.map(M::GeoLength),
                total_offset_minutes_method_call_expr.map(M::TotalOffsetMinutes),
                min_date_time_method_call_expr.map(M::MinDateTime),
                max_date_time_method_call_expr.map(M::MaxDateTime),
                now_method_call_expr.map(M::Now),
            )),
            bool_method_call_expr.map(M::Bool),
        ))
        .parse(i)
    })
}

choice! {
    pub enum BoolMethodCallExpr<'a> {
        EndsWith(EndsWithMethodCallExpr<'a>),
        StartsWith(StartsWithMethodCallExpr<'a>),
        Contains(ContainsMethodCallExpr<'a>),
        Intersects(IntersectsMethodCallExpr<'a>),
        HasSubset(HasSubsetMethodCallExpr<'a>),
        HasSubsequence(HasSubsequenceMethodCallExpr<'a>),
    }
}

pub fn bool_method_call_expr<'a>(input: Input<'a>) -> Output<'a, BoolMethodCallExpr<'a>> {
    use BoolMethodCallExpr as B;
    rule("boolMethodCallExpr", input, |i| {
        alt((
            ends_with_method_call_expr.map(B::EndsWith),
            starts_with_method_call_expr.map(B::StartsWith),
            contains_method_call_expr.map(B::Contains),
            intersects_method_call_expr.map(B::Intersects),
            has_subset_method_call_expr.map(B::HasSubset),
            has_subsequence_method_call_expr.map(B::HasSubsequence),
        ))
        .parse(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn expr(s: &str) -> CommonExpr {
        let out = common_expr(Input::new(s));
        assert!(out.remainder().at_end(), "{s}: stopped at {:?}", out.remainder());
        out.into_value().unwrap()
    }

    fn member_name(e: &CommonExpr) -> Option<String> {
        match &e.operand {
            Operand::FirstMember(m) => Some(m.source()),
            _ => None,
        }
    }

    #[test]
    fn test_comparison() {
        let e = expr("Name eq 'Bob'");
        assert_eq!(member_name(&e).as_deref(), Some("Name"));
        let Some(ComparisonExpr::Eq(eq)) = &e.comparison else {
            panic!("expected eq: {:?}", e.comparison);
        };
        assert!(matches!(&eq.operand.operand, Operand::Literal(l) if matches!(**l, PrimitiveLiteral::String(_))));
        assert!(e.arithmetic.is_none() && e.logical.is_none());
    }

    #[test]
    fn test_operators_nest_right() {
        let e = expr("Price add 2 mul 3 gt 10 and not Discontinued");
        let Some(ArithmeticExpr::Add(add)) = &e.arithmetic else {
            panic!("expected add: {:?}", e.arithmetic);
        };
        let Some(ArithmeticExpr::Mul(mul)) = &add.operand.arithmetic else {
            panic!("expected mul: {:?}", add.operand.arithmetic);
        };
        // the comparison and the logical operator bind inside the innermost operand
        assert!(matches!(mul.operand.comparison, Some(ComparisonExpr::Gt(_))));
        assert!(e.comparison.is_none() && e.logical.is_none());

        let e = expr("A divby B");
        assert!(matches!(e.arithmetic, Some(ArithmeticExpr::Divby(_))));
        let e = expr("Style has NS.Color'Red'");
        assert!(matches!(e.comparison, Some(ComparisonExpr::Has(_))));
        let e = expr("Name in ('a', 'b')");
        let Some(ComparisonExpr::In(inx)) = &e.comparison else {
            panic!("expected in");
        };
        let Operand::List(list) = &inx.operand.operand else {
            panic!("expected a list");
        };
        assert_eq!(list.items().count(), 2);
    }

    #[test]
    fn test_method_calls() {
        let e = expr("contains(tolower(Name),'bo')");
        let Operand::MethodCall(m) = &e.operand else {
            panic!("expected a method call: {:?}", e.operand);
        };
        assert!(matches!(**m, MethodCallExpr::Bool(BoolMethodCallExpr::Contains(_))));

        assert!(matches!(expr("now()").operand, Operand::MethodCall(_)));
        assert!(matches!(expr("substring(Name,1,2)").operand, Operand::MethodCall(_)));
        assert!(matches!(expr("geo.distance(A, B)").operand, Operand::MethodCall(_)));
        // a property that happens to share a method name
        assert!(matches!(expr("length").operand, Operand::FirstMember(_)));
    }

    #[test]
    fn test_negation() {
        assert!(matches!(expr("-5 add 3").operand, Operand::Literal(_)));
        assert!(matches!(expr("-Price").operand, Operand::Negate(_)));
        assert!(matches!(expr("not (A eq 1)").operand, Operand::Not(_)));
    }

    #[test]
    fn test_paths() {
        let e = expr("Address/City eq 'x'");
        assert_eq!(member_name(&e).as_deref(), Some("Address/City"));

        let e = expr("Orders/$count gt 0");
        let Operand::FirstMember(m) = &e.operand else { panic!() };
        let FirstMemberExpr::Member(m) = &**m else { panic!() };
        assert!(matches!(
            &m.member,
            MemberKind::Property(PropertyPathExpr::EntityColNavigation((_, Some(_))))
        ));

        let e = expr("Items/any(d:d/Quantity gt 100)");
        assert!(e.comparison.is_none());
        let e = expr("Items/all(d:d/Done)");
        assert!(member_name(&e).is_some());

        assert!(matches!(expr("$it/Name").operand, Operand::FirstMember(_)));
        assert!(matches!(expr("$root/People('x')/Name").operand, Operand::Root(_)));
        assert!(matches!(expr("NS.Fn(a=1)").operand, Operand::FirstMember(_)));
        assert!(matches!(expr("@NS.Term#Q").operand, Operand::FirstMember(_)));
    }

    #[test]
    fn test_property_kinds() {
        let kind = |s: &'static str| {
            let out = property_path_expr(Input::new(s));
            assert!(out.remainder().at_end(), "{s}: stopped at {:?}", out.remainder());
            out.into_value().unwrap()
        };
        assert!(matches!(kind("Name"), PropertyPathExpr::Primitive((_, None))));
        assert!(matches!(kind("Name/@Core.Description"), PropertyPathExpr::Primitive((_, Some(_)))));

        let PropertyPathExpr::Complex((_, Some(c))) = kind("Addr/NS.Home/City") else { panic!() };
        assert!(c.type_cast.is_some());

        let PropertyPathExpr::EntityColNavigation((_, Some(nav))) = kind("Orders(1)/Amount") else {
            panic!()
        };
        assert!(matches!(nav.path, Some(CollectionNavigationPath::Key((_, Some(_))))));

        let PropertyPathExpr::EntityColNavigation((_, Some(nav))) = kind("Orders/NS.Big(1)") else {
            panic!()
        };
        assert!(nav.type_cast.is_some());

        let PropertyPathExpr::Primitive((_, Some(p))) = kind("Items/NS.Fn(a=1)/Name") else {
            panic!()
        };
        assert!(matches!(p.path, Some(PrimitivePathTail::BoundFunction(_))));
        assert_eq!(kind("Items/$count").property().source(), "Items");
    }

    #[test]
    fn test_paren_and_list() {
        assert!(matches!(expr("(1)").operand, Operand::Paren(_)));
        assert!(matches!(expr("(1,2)").operand, Operand::List(_)));
        let e = expr("A in (1, 2)");
        assert!(e.comparison.is_some());
        assert!(!common_expr(Input::new("((1,2)")).remainder().at_end());
    }

    #[test]
    fn test_type_tests() {
        let e = expr("isof(NS.Manager)");
        let Operand::Isof(isof) = &e.operand else { panic!() };
        assert!(isof.target.is_none());
        let e = expr("cast(Price, Edm.Int32) gt 3");
        let Operand::Cast(cast) = &e.operand else { panic!() };
        assert!(cast.target.is_some());
        assert!(e.comparison.is_some());
    }

    #[test]
    fn test_round_trip() {
        for s in [
            "Name eq 'Bob'",
            "(A eq 1) or (B ne 2)",
            "startswith(Name, 'A') and year(Born) lt 2000",
            "Tags/any(t: t eq 'x')",
            "concat(concat(City,','), Country) eq 'Berlin,Germany'",
        ] {
            assert_eq!(expr(s).source(), s);
        }
    }

    #[test]
    fn test_failure_rewinds() {
        let inp = Input::new("eq 'Bob'");
        let out = common_expr(inp);
        // "eq" is read as a property name; the dangling literal is left over
        assert_eq!(out.remainder().rest(), " 'Bob'");

        let inp = Input::new(")");
        let out = common_expr(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);
    }
}
