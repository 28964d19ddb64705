use crate::graph::TypeGraph;
use crate::types::{Type, TypeKind, TypeRef};
use enum_map::EnumMap;
use std::collections::HashSet;

fn kinds_compatible(left: TypeKind, right: TypeKind, conflate_numbers: bool) -> bool {
    left == right || (conflate_numbers && left.is_number() && right.is_number())
}

impl TypeGraph {
    /// Returns whether two types have exactly the same shape.
    ///
    /// Attributes are not compared. When `conflate_numbers` is set, integers and doubles
    /// are considered the same. Cycles are handled by visiting every pair of composite
    /// types at most once.
    pub fn structurally_compatible(&self, a: TypeRef, b: TypeRef, conflate_numbers: bool) -> bool {
        let mut work = vec![(a, b)];
        let mut done: HashSet<(TypeRef, TypeRef)> = HashSet::new();

        while let Some((left, right)) = work.pop() {
            let (left, right) = if left > right {
                (right, left)
            } else {
                (left, right)
            };
            if left == right {
                continue;
            }

            let left_kind = self.kind(left);
            if !kinds_compatible(left_kind, self.kind(right), conflate_numbers) {
                return false;
            }
            if !left_kind.is_primitive() && !done.insert((left, right)) {
                continue;
            }

            match (self.ty(left), self.ty(right)) {
                (Type::Array { items: l }, Type::Array { items: r }) => work.push((*l, *r)),
                (Type::Map { values: l }, Type::Map { values: r }) => work.push((*l, *r)),
                (Type::Enum { cases: l }, Type::Enum { cases: r }) => {
                    if l.len() != r.len() || !l.iter().all(|c| r.contains(c)) {
                        return false;
                    }
                }
                (Type::Union { members: l }, Type::Union { members: r }) => {
                    if l.len() != r.len() {
                        return false;
                    }
                    let mut by_kind = EnumMap::<TypeKind, Option<TypeRef>>::default();
                    for m in r.iter() {
                        by_kind[self.kind(*m)] = Some(*m);
                    }
                    for m in l.iter() {
                        let kind = self.kind(*m);
                        let counterpart = by_kind[kind].or_else(|| match kind {
                            TypeKind::Integer if conflate_numbers => by_kind[TypeKind::Double],
                            TypeKind::Double if conflate_numbers => by_kind[TypeKind::Integer],
                            _ => None,
                        });
                        match counterpart {
                            Some(c) => work.push((*m, c)),
                            None => return false,
                        }
                    }
                }
                (Type::Class(l), Type::Class(r)) => {
                    if l.len() != r.len() {
                        return false;
                    }
                    for (name, lp) in l.properties.iter() {
                        let Some(rp) = r.property(name) else {
                            return false;
                        };
                        if lp.is_optional != rp.is_optional {
                            return false;
                        }
                        work.push((lp.type_ref, rp.type_ref));
                    }
                }
                _ => {}
            }
        }

        true
    }
}
