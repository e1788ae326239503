//! Context URL fragments, the part after `#` in `$metadata#...`.

use crate::prelude::*;
use crate::{choice, node};

use super::names::*;
use super::punctuation::{close, comma, open, star};
use super::query::{
    all_operations_in_schema, qualified_function_name, select_path, AllOperationsInSchema,
    QualifiedFunctionName, SelectPath,
};
use super::resource::{key_predicate, KeyPredicate};

node! {
    pub struct Context<'a> {
        pub hash: Terminal<'a>,
        pub fragment: ContextFragment<'a>,
    }
}

pub fn context<'a>(input: Input<'a>) -> Output<'a, Context<'a>> {
    rule("context", input, |i| {
        seq((literal("#"), context_fragment))
            .map(|(hash, fragment)| Context { hash, fragment })
            .parse(i)
    })
}

node! {
    pub struct PropertyContext<'a> {
        pub entity_set: EntitySet<'a>,
        pub key: KeyPredicate<'a>,
        pub slash: Terminal<'a>,
        pub path: ContextPropertyPath<'a>,
        pub select: Option<SelectList<'a>>,
    }
}

choice! {
    pub enum ContextFragment<'a> {
        CollectionRef(Terminal<'a>),
        Ref(Terminal<'a>),
        CollectionEntityType(Terminal<'a>),
        CollectionComplexType(Terminal<'a>),
        TypeName((QualifiedTypeName<'a>, Option<SelectList<'a>>)),
        Delta((EntitySet<'a>, Terminal<'a>)),
        Property(PropertyContext<'a>),
        EntitySet((EntitySet<'a>, Option<SelectList<'a>>, Option<Terminal<'a>>)),
        Singleton(SingletonContext<'a>),
    }
}

/// Names are indistinguishable without a model, so the longest reading wins.
/// Ties go to a type name, then to an entity set, then to a singleton:
/// `Collection(NS.Person)` also reads as an entity set with a select list.
pub fn context_fragment<'a>(input: Input<'a>) -> Output<'a, ContextFragment<'a>> {
    use ContextFragment as F;
    rule("contextFragment", input, |i| {
        longest((
            literal("Collection($ref)").map(F::CollectionRef),
            literal("$ref").map(F::Ref),
            literal("Collection(Edm.EntityType)").map(F::CollectionEntityType),
            literal("Collection(Edm.ComplexType)").map(F::CollectionComplexType),
            seq((qualified_type_name, select_list.opt())).map(F::TypeName),
            (|i: Input<'a>| entity_set_then(i, delta_suffix)).map(F::Delta),
            (|i: Input<'a>| entity_set_then(i, property_suffix)).map(
                |(entity_set, (key, slash, path, select))| {
                    F::Property(PropertyContext {
                        entity_set,
                        key,
                        slash,
                        path,
                        select,
                    })
                },
            ),
            (|i: Input<'a>| entity_set_then(i, entity_set_suffix))
                .map(|(entity_set, (select, suffix))| F::EntitySet((entity_set, select, suffix))),
            singleton_context.map(F::Singleton),
        ))
        .parse(i)
    })
}

fn delta_suffix<'a>(input: Input<'a>) -> Output<'a, Terminal<'a>> {
    keyword(&["/$deletedEntity", "/$deletedLink", "/$link"]).parse(input)
}

type PropertySuffix<'a> = (
    KeyPredicate<'a>,
    Terminal<'a>,
    ContextPropertyPath<'a>,
    Option<SelectList<'a>>,
);

fn property_suffix<'a>(input: Input<'a>) -> Output<'a, PropertySuffix<'a>> {
    seq((key_predicate, literal("/"), context_property_path, select_list.opt())).parse(input)
}

fn entity_set_suffix<'a>(
    input: Input<'a>,
) -> Output<'a, (Option<SelectList<'a>>, Option<Terminal<'a>>)> {
    seq((select_list.opt(), keyword(&["/$entity", "/$delta"]).opt())).parse(input)
}

node! {
    pub struct SingletonNavigation<'a> {
        pub navigation: Navigation<'a>,
        pub containment: Star<ContainmentNavigation<'a>>,
        pub type_cast: Option<(Terminal<'a>, QualifiedEntityTypeName<'a>)>,
    }
}

node! {
    pub struct SingletonContext<'a> {
        pub singleton: SingletonEntity<'a>,
        pub navigation: Option<SingletonNavigation<'a>>,
        pub select: Option<SelectList<'a>>,
    }
}

fn singleton_context<'a>(input: Input<'a>) -> Output<'a, SingletonContext<'a>> {
    seq((
        singleton_entity,
        seq((
            navigation,
            containment_navigation.repeat::<0, UNBOUNDED>(),
            seq((literal("/"), qualified_entity_type_name)).opt(),
        ))
        .map(|(navigation, containment, type_cast)| SingletonNavigation {
            navigation,
            containment,
            type_cast,
        })
        .opt(),
        select_list.opt(),
    ))
    .map(|(singleton, navigation, select)| SingletonContext {
        singleton,
        navigation,
        select,
    })
    .parse(input)
}

node! {
    pub struct EntitySet<'a> {
        pub name: EntitySetName<'a>,
        pub containment: Star<ContainmentNavigation<'a>>,
        pub type_cast: Option<(Terminal<'a>, QualifiedEntityTypeName<'a>)>,
    }
}

pub fn entity_set<'a>(input: Input<'a>) -> Output<'a, EntitySet<'a>> {
    rule("entitySet", input, |i| {
        seq((
            entity_set_name,
            containment_navigation.repeat::<0, UNBOUNDED>(),
            seq((literal("/"), qualified_entity_type_name)).opt(),
        ))
        .map(|(name, containment, type_cast)| EntitySet {
            name,
            containment,
            type_cast,
        })
        .parse(i)
    })
}

/// An entity set followed by `tail`. Containment steps are given back when the
/// tail needs them, as in `People('x')/Name` where the key belongs to the tail.
fn entity_set_then<'a, T>(
    input: Input<'a>,
    tail: fn(Input<'a>) -> Output<'a, T>,
) -> Output<'a, (EntitySet<'a>, T)> {
    seq((
        entity_set_name,
        star_then(
            containment_navigation,
            seq((seq((literal("/"), qualified_entity_type_name)).opt(), tail)),
        ),
    ))
    .map(|(name, (containment, (type_cast, t)))| {
        (
            EntitySet {
                name,
                containment,
                type_cast,
            },
            t,
        )
    })
    .parse(input)
}

node! {
    pub struct ContainmentNavigation<'a> {
        pub key: KeyPredicate<'a>,
        pub type_cast: Option<(Terminal<'a>, QualifiedEntityTypeName<'a>)>,
        pub navigation: Navigation<'a>,
    }
}

pub fn containment_navigation<'a>(input: Input<'a>) -> Output<'a, ContainmentNavigation<'a>> {
    rule("containmentNavigation", input, |i| {
        seq((
            key_predicate,
            seq((literal("/"), qualified_entity_type_name)).opt(),
            navigation,
        ))
        .map(|(key, type_cast, navigation)| ContainmentNavigation {
            key,
            type_cast,
            navigation,
        })
        .parse(i)
    })
}

node! {
    pub struct NavigationSegment<'a> {
        pub slash: Terminal<'a>,
        pub property: ComplexProperty<'a>,
        pub type_cast: Option<(Terminal<'a>, QualifiedComplexTypeName<'a>)>,
    }
}

node! {
    pub struct Navigation<'a> {
        pub segments: Star<NavigationSegment<'a>>,
        pub slash: Terminal<'a>,
        pub property: NavigationProperty<'a>,
    }
}

pub fn navigation<'a>(input: Input<'a>) -> Output<'a, Navigation<'a>> {
    rule("navigation", input, |i| {
        star_then(
            seq((
                literal("/"),
                complex_property,
                seq((literal("/"), qualified_complex_type_name)).opt(),
            ))
            .map(|(slash, property, type_cast)| NavigationSegment {
                slash,
                property,
                type_cast,
            }),
            seq((literal("/"), navigation_property)),
        )
        .map(|(segments, (slash, property))| Navigation {
            segments,
            slash,
            property,
        })
        .parse(i)
    })
}

node! {
    pub struct SelectList<'a> {
        pub open: Terminal<'a>,
        pub items: Delimited<SelectListItem<'a>, Terminal<'a>>,
        pub close: Terminal<'a>,
    }
}

pub fn select_list<'a>(input: Input<'a>) -> Output<'a, SelectList<'a>> {
    rule("selectList", input, |i| {
        seq((open, sep_by(select_list_item, comma), close))
            .map(|(open, items, close)| SelectList { open, items, close })
            .parse(i)
    })
}

choice! {
    pub enum SelectListMember<'a> {
        Action(QualifiedActionName<'a>),
        Function(QualifiedFunctionName<'a>),
        Property(SelectListProperty<'a>),
    }
}

choice! {
    pub enum SelectListItem<'a> {
        Star(Terminal<'a>),
        AllOperations(AllOperationsInSchema<'a>),
        Member((Option<(QualifiedEntityTypeName<'a>, Terminal<'a>)>, SelectListMember<'a>)),
    }
}

pub fn select_list_item<'a>(input: Input<'a>) -> Output<'a, SelectListItem<'a>> {
    rule("selectListItem", input, |i| {
        alt((
            star.map(SelectListItem::Star),
            all_operations_in_schema.map(SelectListItem::AllOperations),
            seq((
                seq((qualified_entity_type_name, literal("/"))).opt(),
                longest((
                    qualified_action_name.map(SelectListMember::Action),
                    qualified_function_name.map(SelectListMember::Function),
                    select_list_property.map(SelectListMember::Property),
                )),
            ))
            .map(SelectListItem::Member),
        ))
        .parse(i)
    })
}

choice! {
    pub enum SelectListProperty<'a> {
        Primitive(PrimitiveProperty<'a>),
        PrimitiveCol(PrimitiveColProperty<'a>),
        Navigation((NavigationProperty<'a>, Option<Terminal<'a>>, Option<Box<SelectList<'a>>>)),
        Path((SelectPath<'a>, Option<(Terminal<'a>, Box<SelectListProperty<'a>>)>)),
    }
}

pub fn select_list_property<'a>(input: Input<'a>) -> Output<'a, SelectListProperty<'a>> {
    use SelectListProperty as P;
    rule("selectListProperty", input, |i| {
        longest((
            primitive_property.map(P::Primitive),
            primitive_col_property.map(P::PrimitiveCol),
            seq((
                navigation_property,
                literal("+").opt(),
                select_list.map(Box::new).opt(),
            ))
            .map(P::Navigation),
            seq((
                select_path,
                seq((literal("/"), select_list_property.map(Box::new))).opt(),
            ))
            .map(P::Path),
        ))
        .parse(i)
    })
}

node! {
    pub struct ComplexPathContext<'a> {
        pub type_cast: Option<(Terminal<'a>, QualifiedComplexTypeName<'a>)>,
        pub slash: Terminal<'a>,
        pub path: Box<ContextPropertyPath<'a>>,
    }
}

choice! {
    pub enum ContextPropertyPath<'a> {
        Primitive(PrimitiveProperty<'a>),
        PrimitiveCol(PrimitiveColProperty<'a>),
        ComplexCol(ComplexColProperty<'a>),
        Complex((ComplexProperty<'a>, Option<ComplexPathContext<'a>>)),
    }
}

pub fn context_property_path<'a>(input: Input<'a>) -> Output<'a, ContextPropertyPath<'a>> {
    use ContextPropertyPath as P;
    rule("contextPropertyPath", input, |i| {
        longest((
            primitive_property.map(P::Primitive),
            primitive_col_property.map(P::PrimitiveCol),
            complex_col_property.map(P::ComplexCol),
            seq((
                complex_property,
                seq((
                    seq((literal("/"), qualified_complex_type_name)).opt(),
                    literal("/"),
                    context_property_path,
                ))
                .map(|(type_cast, slash, path)| ComplexPathContext {
                    type_cast,
                    slash,
                    path: Box::new(path),
                })
                .opt(),
            ))
            .map(P::Complex),
        ))
        .parse(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn fragment(s: &str) -> ContextFragment {
        let out = context(Input::new(s));
        assert!(out.remainder().at_end(), "{s}: stopped at {:?}", out.remainder());
        let ctx = out.into_value().unwrap();
        assert_eq!(ctx.source(), s);
        ctx.fragment
    }

    #[test]
    fn test_fixed_fragments() {
        assert!(matches!(fragment("#Collection($ref)"), ContextFragment::CollectionRef(_)));
        assert!(matches!(fragment("#$ref"), ContextFragment::Ref(_)));
        assert!(matches!(
            fragment("#Collection(Edm.EntityType)"),
            ContextFragment::CollectionEntityType(_)
        ));
    }

    #[test]
    fn test_entity_set_fragments() {
        let ContextFragment::EntitySet((set, None, None)) = fragment("#People") else {
            panic!("expected a plain entity set");
        };
        assert_eq!(set.name.source(), "People");

        let ContextFragment::EntitySet((_, Some(select), None)) = fragment("#People(FirstName,Emails)")
        else {
            panic!("expected a select list");
        };
        assert_eq!(select.items.len(), 2);

        assert!(matches!(
            fragment("#People/$delta"),
            ContextFragment::EntitySet((_, None, Some(_)))
        ));
        assert!(matches!(fragment("#People/$deletedEntity"), ContextFragment::Delta(_)));
        assert!(matches!(fragment("#People/$link"), ContextFragment::Delta(_)));
    }

    #[test]
    fn test_property_fragment() {
        let ContextFragment::Property(prop) = fragment("#People('russell')/Emails") else {
            panic!("expected a property context");
        };
        assert!(prop.entity_set.containment.is_empty());
        assert_eq!(prop.key.source(), "('russell')");
        assert_eq!(prop.path.source(), "Emails");
    }

    #[test]
    fn test_type_name_fragment() {
        assert!(matches!(fragment("#Edm.String"), ContextFragment::TypeName(_)));
        assert!(matches!(fragment("#Collection(NS.Person)"), ContextFragment::TypeName(_)));
    }

    #[test]
    fn test_select_list() {
        let out = select_list(Input::new("(Friends(FirstName),Address/City,*)"));
        assert!(out.remainder().at_end());
        let items: Vec<_> = out.value().unwrap().items.items().cloned().collect();
        assert_eq!(items.len(), 3);
        assert!(matches!(
            &items[0],
            SelectListItem::Member((None, SelectListMember::Property(SelectListProperty::Navigation((_, None, Some(_))))))
        ));
        assert!(matches!(
            &items[1],
            SelectListItem::Member((None, SelectListMember::Property(SelectListProperty::Path(_))))
        ));
        assert!(matches!(items[2], SelectListItem::Star(_)));
    }

    #[test]
    fn test_navigation() {
        let out = navigation(Input::new("/Address/NS.Home/Country"));
        assert!(out.remainder().at_end());
        let nav = out.value().unwrap();
        assert_eq!(nav.segments.len(), 1);
        assert_eq!(nav.property.source(), "Country");

        let inp = Input::new("Address");
        let out = navigation(inp);
        assert!(!out.is_success());
        assert_eq!(out.remainder(), inp);
    }
}
