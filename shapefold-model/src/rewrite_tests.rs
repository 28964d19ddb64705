use crate::attributes::TypeAttributes;
use crate::errors::{Error, Kind};
use crate::mapping::StringTypeMapping;
use crate::tests::graph_from;
use crate::types::{ClassProperty, ClassType, Type, TypeKind, TypeRef};
use indexmap::IndexMap;

const PEOPLE: &str = r#"
top-levels:
  Team: 0
types:
  - kind: class
    properties:
      lead: { type: 1 }
      members: { type: 3 }
  - kind: class
    properties:
      name: { type: 2 }
      boss: { type: 4, optional: true }
    attributes:
      names: [Lead]
  - kind: string
  - kind: array
    items: 4
  - kind: class
    properties:
      name: { type: 2 }
      boss: { type: 1, optional: true }
    attributes:
      names: [Member]
  - kind: bool
"#;

#[test]
fn rewrite_without_groups() -> anyhow::Result<()> {
    let graph = graph_from(PEOPLE)?;

    let rewritten = graph.rewrite::<Error, _>(
        "copy",
        &StringTypeMapping::default(),
        false,
        &[],
        |_, _, fwd| Ok(fwd),
    )?;

    // The unreachable boolean is dropped.
    assert_eq!(rewritten.len(), graph.len() - 1);
    assert_eq!(rewritten.all_named_types_separated().classes.len(), 3);
    let team = rewritten.top_level("Team").unwrap();
    let lead = rewritten.class(team).unwrap().property("lead").unwrap().type_ref;
    assert_eq!(rewritten.attributes(lead).names(), vec!["Lead"]);
    assert_eq!(rewritten.recursive_types().len(), 2);

    Ok(())
}

#[test]
fn rewrite_group() -> anyhow::Result<()> {
    let graph = graph_from(PEOPLE)?;
    let group = vec![TypeRef::new(1), TypeRef::new(4)];

    let mut calls = 0;
    let rewritten = graph.rewrite::<Error, _>(
        "merge people",
        &StringTypeMapping::default(),
        false,
        &[group],
        |builder, members, fwd| {
            calls += 1;
            assert_eq!(members.len(), 2);
            let first = builder.source().class(members[0]).unwrap().clone();
            let mut properties = IndexMap::new();
            for (name, prop) in first.properties.iter() {
                let type_ref = builder.reconstitute(prop.type_ref)?;
                properties.insert(name.clone(), ClassProperty::new(type_ref, prop.is_optional));
            }
            builder.add(
                Type::Class(ClassType::new(properties, false)),
                TypeAttributes::from_names(["Person"]),
                Some(fwd),
            )
        },
    )?;
    assert_eq!(calls, 1);

    let named = rewritten.all_named_types_separated();
    assert_eq!(named.classes.len(), 2);

    let team = rewritten.class(rewritten.top_level("Team").unwrap()).unwrap();
    let lead = team.property("lead").unwrap().type_ref;
    let members = team.property("members").unwrap().type_ref;
    assert_eq!(rewritten.ty(members), &Type::Array { items: lead });

    // The merged class refers to itself.
    let person = rewritten.class(lead).unwrap();
    assert_eq!(person.property("boss").unwrap().type_ref, lead);
    assert!(rewritten.is_recursive(lead));
    assert_eq!(rewritten.attributes(lead).names(), vec!["Person"]);

    Ok(())
}

#[test]
fn rewrite_unresolved_replacement() -> anyhow::Result<()> {
    let graph = graph_from(PEOPLE)?;
    let groups = [vec![TypeRef::new(1), TypeRef::new(4)]];

    let err = graph
        .rewrite::<Error, _>(
            "lazy",
            &StringTypeMapping::default(),
            false,
            &groups,
            |builder, _, _| builder.add_primitive(TypeKind::String, TypeAttributes::new(), None),
        )
        .expect_err("expected invalid replacement");
    assert_eq!(err.kind, Kind::InvalidReplacement);

    Ok(())
}

#[test]
fn rewrite_invalid_groups() -> anyhow::Result<()> {
    let graph = graph_from(PEOPLE)?;
    let mapping = StringTypeMapping::default();

    let overlapping = [
        vec![TypeRef::new(1), TypeRef::new(4)],
        vec![TypeRef::new(4), TypeRef::new(0)],
    ];
    let err = graph
        .rewrite::<Error, _>("overlap", &mapping, false, &overlapping, |_, _, fwd| Ok(fwd))
        .expect_err("expected invalid group");
    assert_eq!(err.kind, Kind::InvalidGroup);

    let empty = [vec![]];
    let err = graph
        .rewrite::<Error, _>("empty", &mapping, false, &empty, |_, _, fwd| Ok(fwd))
        .expect_err("expected invalid group");
    assert_eq!(err.kind, Kind::InvalidGroup);

    let foreign = [vec![TypeRef::new(42)]];
    let err = graph
        .rewrite::<Error, _>("foreign", &mapping, false, &foreign, |_, _, fwd| Ok(fwd))
        .expect_err("expected invalid reference");
    assert_eq!(err.kind, Kind::InvalidReference);

    Ok(())
}

#[test]
fn rewrite_union_registry() -> anyhow::Result<()> {
    let graph = graph_from(PEOPLE)?;
    let groups = [vec![TypeRef::new(1), TypeRef::new(4)]];

    graph.rewrite::<Error, _>(
        "registry",
        &StringTypeMapping::default(),
        false,
        &groups,
        |builder, members, fwd| {
            let set = members.iter().copied().collect();
            assert_eq!(builder.lookup_group(&set), Some(fwd));
            assert_eq!(builder.lookup_union(&set), None);

            let reversed = members.iter().rev().copied().collect();
            builder.register_union(&set, fwd);
            assert_eq!(builder.lookup_union(&reversed), Some(fwd));

            let mixed = [TypeRef::new(1), TypeRef::new(2)].into_iter().collect();
            assert_eq!(builder.lookup_group(&mixed), None);

            builder.add(
                Type::Class(ClassType::default()),
                TypeAttributes::new(),
                Some(fwd),
            )
        },
    )?;

    Ok(())
}
