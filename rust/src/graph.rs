//! Precedence graph construction.
//!
//! An edge `u -> v` means `u` must finish before `v` starts. A [`Relation`]
//! is keyed by the earlier task: `relation[u]` holds the successors of `u`.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::interner::{VertexId, VertexIndex};
use crate::models::TaskId;

/// Raw precedence relation: `u -> {v, ...}`.
pub type Relation = FxHashMap<TaskId, FxHashSet<TaskId>>;

/// Successor or predecessor map, total over every id in the relation.
pub type Adjacency = FxHashMap<TaskId, FxHashSet<TaskId>>;

/// Build successor and predecessor maps from a relation.
///
/// Both maps contain an entry (possibly empty) for every id appearing as a
/// relation key or value, and `v ∈ successors[u] ⇔ u ∈ predecessors[v]`.
pub fn build_graph(relation: &Relation) -> (Adjacency, Adjacency) {
    let mut successors: Adjacency =
        FxHashMap::with_capacity_and_hasher(relation.len(), Default::default());
    let mut predecessors: Adjacency =
        FxHashMap::with_capacity_and_hasher(relation.len(), Default::default());

    for (&u, targets) in relation {
        successors.entry(u).or_default();
        predecessors.entry(u).or_default();
        for &v in targets {
            successors.entry(u).or_default().insert(v);
            successors.entry(v).or_default();
            predecessors.entry(v).or_default().insert(u);
        }
    }

    (successors, predecessors)
}

/// Arena form of a precedence relation.
///
/// Vertices are dense indices ordered by ascending task id; adjacency lists
/// are sorted and deduplicated. Cyclic input is representable.
#[derive(Debug, Clone, Default)]
pub struct PrecedenceGraph {
    index: VertexIndex,
    successors: Vec<Vec<VertexId>>,
    predecessors: Vec<Vec<VertexId>>,
}

impl PrecedenceGraph {
    pub fn from_relation(relation: &Relation) -> Self {
        Self::with_vertices(relation, std::iter::empty())
    }

    /// Build from a relation, adding `extra` ids as vertices even when no
    /// edge mentions them (tasks without dependencies).
    pub fn with_vertices(relation: &Relation, extra: impl IntoIterator<Item = TaskId>) -> Self {
        let edges = relation
            .iter()
            .flat_map(|(&u, targets)| targets.iter().map(move |&v| (u, v)));
        let ids = relation
            .iter()
            .flat_map(|(&u, targets)| std::iter::once(u).chain(targets.iter().copied()))
            .chain(extra);
        Self::from_edges(ids, edges)
    }

    /// Build from successor/predecessor maps such as [`build_graph`] returns.
    ///
    /// Edges are taken from both maps, so a one-sided map still yields a
    /// consistent graph.
    pub fn from_adjacency(successors: &Adjacency, predecessors: &Adjacency) -> Self {
        let forward = successors
            .iter()
            .flat_map(|(&u, vs)| vs.iter().map(move |&v| (u, v)));
        let backward = predecessors
            .iter()
            .flat_map(|(&v, us)| us.iter().map(move |&u| (u, v)));
        let ids = successors
            .iter()
            .chain(predecessors.iter())
            .flat_map(|(&k, vs)| std::iter::once(k).chain(vs.iter().copied()));
        Self::from_edges(ids, forward.chain(backward))
    }

    fn from_edges(
        ids: impl IntoIterator<Item = TaskId>,
        edges: impl IntoIterator<Item = (TaskId, TaskId)>,
    ) -> Self {
        let index = VertexIndex::new(ids);
        let n = index.len();
        let mut successors: Vec<Vec<VertexId>> = vec![Vec::new(); n];
        let mut predecessors: Vec<Vec<VertexId>> = vec![Vec::new(); n];

        for (u, v) in edges {
            // Every endpoint was fed to the index above.
            if let (Some(u), Some(v)) = (index.vertex(u), index.vertex(v)) {
                successors[u as usize].push(v);
                predecessors[v as usize].push(u);
            }
        }
        for list in successors.iter_mut().chain(predecessors.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            index,
            successors,
            predecessors,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &VertexIndex {
        &self.index
    }

    #[inline]
    pub fn id(&self, vertex: VertexId) -> TaskId {
        self.index.id(vertex)
    }

    #[inline]
    pub fn vertex(&self, id: TaskId) -> Option<VertexId> {
        self.index.vertex(id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> {
        0..self.len() as VertexId
    }

    #[inline]
    pub fn successors(&self, vertex: VertexId) -> &[VertexId] {
        &self.successors[vertex as usize]
    }

    #[inline]
    pub fn predecessors(&self, vertex: VertexId) -> &[VertexId] {
        &self.predecessors[vertex as usize]
    }

    pub fn has_self_loop(&self, vertex: VertexId) -> bool {
        self.successors(vertex).binary_search(&vertex).is_ok()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    /// Map a list of vertices back to their ids, sorted ascending.
    pub fn sorted_ids(&self, vertices: impl IntoIterator<Item = VertexId>) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = vertices.into_iter().map(|v| self.id(v)).collect();
        ids.sort_unstable();
        ids
    }
}
