use crate::graph::TypeGraph;
use crate::types::TypeRef;
use indexmap::IndexSet;
use petgraph::graph::{DiGraph, NodeIndex};

impl TypeGraph {
    /// Returns the graph of references between types.
    ///
    /// Node indices coincide with type reference indices.
    pub fn dependencies(&self) -> DiGraph<TypeRef, ()> {
        let mut graph = DiGraph::with_capacity(self.len(), self.len());
        for r in self.refs() {
            graph.add_node(r);
        }
        for r in self.refs() {
            for child in self.ty(r).children() {
                graph.add_edge(NodeIndex::new(r.index()), NodeIndex::new(child.index()), ());
            }
        }
        graph
    }

    /// Identifies the types taking part in a cycle of references.
    pub fn recursive_types(&self) -> IndexSet<TypeRef> {
        let graph = self.dependencies();
        let mut recursive = Vec::new();
        for component in petgraph::algo::kosaraju_scc(&graph) {
            // A trivial component contains a single vertex which is not connected to itself.
            let is_trivial = component.len() == 1 && {
                let idx = component[0];
                graph.find_edge(idx, idx).is_none()
            };
            if !is_trivial {
                recursive.extend(component.into_iter().map(|idx| graph[idx]));
            }
        }
        recursive.sort();
        recursive.into_iter().collect()
    }

    /// Tells whether `r` takes part in a cycle of references.
    ///
    /// Each call recomputes the strongly connected components: callers checking many types
    /// should keep the result of [`TypeGraph::recursive_types`] instead.
    pub fn is_recursive(&self, r: TypeRef) -> bool {
        self.recursive_types().contains(&r)
    }
}
