//! Dense vertex indexing for task ids.
//!
//! Maps arbitrary task ids to contiguous `u32` vertex indices so the graph
//! algorithms can keep their state in plain vectors.

use rustc_hash::FxHashMap;

use crate::models::TaskId;

/// Dense vertex index (u32 for compact storage).
pub type VertexId = u32;

/// Bidirectional mapping between task ids and vertex indices.
///
/// Built from a sorted id list, so vertex order equals ascending id order.
/// Tie-breaks that prefer "smallest id" can therefore compare vertex indices.
#[derive(Debug, Clone, Default)]
pub struct VertexIndex {
    to_vertex: FxHashMap<TaskId, VertexId>,
    from_vertex: Vec<TaskId>,
}

impl VertexIndex {
    /// Build an index over `ids`, sorting and deduplicating them first.
    pub fn new(ids: impl IntoIterator<Item = TaskId>) -> Self {
        let mut from_vertex: Vec<TaskId> = ids.into_iter().collect();
        from_vertex.sort_unstable();
        from_vertex.dedup();

        let mut to_vertex =
            FxHashMap::with_capacity_and_hasher(from_vertex.len(), Default::default());
        for (vertex, &id) in from_vertex.iter().enumerate() {
            to_vertex.insert(id, vertex as VertexId);
        }

        Self {
            to_vertex,
            from_vertex,
        }
    }

    #[inline]
    pub fn vertex(&self, id: TaskId) -> Option<VertexId> {
        self.to_vertex.get(&id).copied()
    }

    /// Task id of a vertex. Panics on an index this map never issued.
    #[inline]
    pub fn id(&self, vertex: VertexId) -> TaskId {
        self.from_vertex[vertex as usize]
    }

    pub fn ids(&self) -> &[TaskId] {
        &self.from_vertex
    }

    pub fn len(&self) -> usize {
        self.from_vertex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from_vertex.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_follows_id_order() {
        let index = VertexIndex::new([42, -3, 7, 42]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.ids(), &[-3, 7, 42]);
        assert_eq!(index.vertex(-3), Some(0));
        assert_eq!(index.vertex(42), Some(2));
        assert_eq!(index.id(1), 7);
        assert_eq!(index.vertex(5), None);
    }

    #[test]
    fn test_empty_index() {
        let index = VertexIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.vertex(0), None);
    }
}
