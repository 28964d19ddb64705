use crate::errors::Error;
use crate::tests::{graph_from, nth};
use crate::unify::Unifier;
use indexmap::IndexSet;
use shapefold_model::attributes::AttributeKind;
use shapefold_model::{
    AttributeRegistry, StringTypeMapping, Type, TypeAttributes, TypeGraph, TypeKind, TypeRef,
};

const MIXED: &str = r#"
top-levels:
  Root: 0
types:
  - kind: class
    properties:
      i: { type: 1 }
      d: { type: 2 }
      s: { type: 3 }
      e: { type: 4 }
      nil: { type: 5 }
      ai: { type: 6 }
      ad: { type: 7 }
      m: { type: 8 }
      c: { type: 9 }
      f: { type: 10 }
      any: { type: 11 }
  - kind: integer
  - kind: double
  - kind: string
    attributes:
      description: "a label"
  - kind: enum
    cases: [red, green]
  - kind: "null"
  - kind: array
    items: 1
  - kind: array
    items: 2
  - kind: map
    values: 3
  - kind: class
    properties:
      x: { type: 3 }
  - kind: enum
    cases: [green, blue]
  - kind: any
"#;

/// Unifies the group of types, returning the new graph and the unified type.
fn unified(group: &[usize], conflate_numbers: bool) -> anyhow::Result<(TypeGraph, TypeRef)> {
    let graph = graph_from(MIXED)?;
    let registry = AttributeRegistry::standard();
    let unifier = Unifier::new(&registry, conflate_numbers);

    let group: Vec<TypeRef> = group.iter().map(|i| nth(&graph, *i)).collect();
    let first = group[0];
    let rewritten = graph.rewrite::<Error, _>(
        "unify",
        &StringTypeMapping::default(),
        false,
        &[group],
        |builder, members, forwarding| {
            let types = members.iter().copied().collect();
            let attributes = TypeAttributes::from_names(["Merged"]);
            unifier.unify(builder, &types, attributes, Some(forwarding))
        },
    )?;

    // Find the unified type through the property of the root which held the first member.
    let root = graph.class(nth(&graph, 0)).unwrap();
    let name = root
        .properties
        .iter()
        .find(|(_, p)| p.type_ref == first)
        .map(|(n, _)| n.clone())
        .unwrap();
    let new_root = rewritten.class(rewritten.top_level("Root").unwrap()).unwrap();
    let r = new_root.property(&name).unwrap().type_ref;
    Ok((rewritten, r))
}

fn member_kinds(graph: &TypeGraph, r: TypeRef) -> Vec<TypeKind> {
    match graph.ty(r) {
        Type::Union { members } => members.iter().map(|m| graph.kind(*m)).collect(),
        _ => vec![graph.kind(r)],
    }
}

#[test]
fn unify_numbers() -> anyhow::Result<()> {
    let (graph, r) = unified(&[1, 2], true)?;
    assert_eq!(graph.kind(r), TypeKind::Double);
    assert_eq!(graph.attributes(r).names(), vec!["Merged"]);

    let (graph, r) = unified(&[1, 2], false)?;
    assert_eq!(
        member_kinds(&graph, r),
        vec![TypeKind::Integer, TypeKind::Double]
    );
    assert_eq!(graph.attributes(r).names(), vec!["Merged"]);

    let (graph, r) = unified(&[6, 7], true)?;
    let Type::Array { items } = graph.ty(r) else {
        panic!("expected an array, got {:?}", graph.ty(r));
    };
    assert_eq!(graph.kind(*items), TypeKind::Double);

    Ok(())
}

#[test]
fn unify_strings_and_enums() -> anyhow::Result<()> {
    let (graph, r) = unified(&[3, 4], true)?;
    assert_eq!(graph.kind(r), TypeKind::String);

    let (graph, r) = unified(&[4, 10], true)?;
    let Type::Enum { cases } = graph.ty(r) else {
        panic!("expected an enum, got {:?}", graph.ty(r));
    };
    let cases: Vec<_> = cases.iter().map(String::as_str).collect();
    assert_eq!(cases, vec!["red", "green", "blue"]);

    Ok(())
}

#[test]
fn unify_any() -> anyhow::Result<()> {
    let (graph, r) = unified(&[3, 11, 9], true)?;
    assert_eq!(graph.kind(r), TypeKind::Any);
    assert_eq!(graph.attributes(r).names(), vec!["Merged"]);

    Ok(())
}

#[test]
fn unify_maps_and_classes() -> anyhow::Result<()> {
    let (graph, r) = unified(&[8, 9], true)?;
    let Type::Map { values } = graph.ty(r) else {
        panic!("expected a map, got {:?}", graph.ty(r));
    };
    assert_eq!(graph.kind(*values), TypeKind::String);

    Ok(())
}

#[test]
fn unify_union() -> anyhow::Result<()> {
    let (graph, r) = unified(&[3, 5, 1], true)?;
    assert_eq!(
        member_kinds(&graph, r),
        vec![TypeKind::Null, TypeKind::Integer, TypeKind::String]
    );
    assert_eq!(graph.attributes(r).names(), vec!["Merged"]);

    // A member contributed by a single type keeps its attributes.
    let Type::Union { members } = graph.ty(r) else {
        panic!("expected a union, got {:?}", graph.ty(r));
    };
    let string = members
        .iter()
        .find(|m| graph.kind(**m) == TypeKind::String)
        .unwrap();
    let description = graph.attributes(*string).get(&AttributeKind::DESCRIPTION);
    assert_eq!(description, Some(&serde_json::json!("a label")));

    Ok(())
}

#[test]
fn unify_lookups() -> anyhow::Result<()> {
    let graph = graph_from(MIXED)?;
    let registry = AttributeRegistry::standard();
    let unifier = Unifier::new(&registry, true);
    let set = |indices: &[usize]| -> IndexSet<TypeRef> {
        indices.iter().map(|i| nth(&graph, *i)).collect()
    };

    graph.rewrite::<Error, _>(
        "lookups",
        &StringTypeMapping::default(),
        false,
        &[vec![nth(&graph, 9)]],
        |builder, members, forwarding| {
            let numbers = unifier.unify(builder, &set(&[1, 2]), TypeAttributes::new(), None)?;
            let again = unifier.unify(builder, &set(&[2, 1]), TypeAttributes::new(), None)?;
            assert_eq!(numbers, again);

            let string = unifier.unify(builder, &set(&[3]), TypeAttributes::new(), None)?;
            assert_eq!(string, builder.reconstitute(nth(&graph, 3))?);

            let group = unifier.unify(builder, &set(&[9]), TypeAttributes::new(), None)?;
            assert_eq!(group, forwarding);

            let types = members.iter().copied().collect();
            unifier.unify(builder, &types, TypeAttributes::new(), Some(forwarding))
        },
    )?;

    Ok(())
}

#[test]
fn unify_empty() -> anyhow::Result<()> {
    let graph = graph_from(MIXED)?;
    let registry = AttributeRegistry::standard();
    let unifier = Unifier::new(&registry, true);

    let err = graph
        .rewrite::<Error, _>(
            "empty",
            &StringTypeMapping::default(),
            false,
            &[vec![nth(&graph, 9)]],
            |builder, _, forwarding| {
                unifier.unify(builder, &IndexSet::new(), TypeAttributes::new(), Some(forwarding))
            },
        )
        .expect_err("expected an empty set error");
    assert!(matches!(err, Error::EmptyClique), "unexpected error: {err:?}");

    Ok(())
}
