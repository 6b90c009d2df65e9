//! Sethi-Ullman style linearization of a precedence DAG.
//!
//! The order is built right to left: at each step the unplaced vertex whose
//! successors are all placed and whose register need is smallest goes in
//! front of everything placed so far.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::SchedulerError;
use crate::graph::{Adjacency, PrecedenceGraph};
use crate::interner::VertexId;
use crate::models::TaskId;
use crate::{log_changes, log_checks, log_debug};

/// Memoized register need: 1 for a sink, else 1 + the largest child need.
struct RegisterNeeds<'g> {
    graph: &'g PrecedenceGraph,
    memo: Vec<Option<u32>>,
    visiting: Vec<bool>,
}

impl<'g> RegisterNeeds<'g> {
    fn new(graph: &'g PrecedenceGraph) -> Self {
        Self {
            graph,
            memo: vec![None; graph.len()],
            visiting: vec![false; graph.len()],
        }
    }

    /// Register need of `root`, filling the memo for everything below it.
    ///
    /// Uses an explicit post-order stack; a successor reached again while
    /// still on the stack is a cycle.
    fn get(&mut self, root: VertexId, verbosity: u8) -> Result<u32, SchedulerError> {
        if let Some(need) = self.memo[root as usize] {
            return Ok(need);
        }

        // (vertex, index of next successor to expand)
        let mut stack: Vec<(VertexId, usize)> = vec![(root, 0)];
        self.visiting[root as usize] = true;

        while let Some((v, next)) = stack.last_mut() {
            let v = *v;
            let successors = self.graph.successors(v);

            if *next < successors.len() {
                let child = successors[*next];
                *next += 1;
                if self.memo[child as usize].is_some() {
                    continue;
                }
                if self.visiting[child as usize] {
                    let start = stack.iter().position(|&(u, _)| u == child).unwrap_or(0);
                    let members = self.graph.sorted_ids(stack[start..].iter().map(|&(u, _)| u));
                    return Err(SchedulerError::CycleDetected(members));
                }
                self.visiting[child as usize] = true;
                stack.push((child, 0));
                continue;
            }

            stack.pop();
            let need = successors
                .iter()
                .filter_map(|&c| self.memo[c as usize])
                .max()
                .map_or(1, |deepest| deepest + 1);
            self.memo[v as usize] = Some(need);
            self.visiting[v as usize] = false;
            log_debug!(verbosity, "Register need of {} = {}", self.graph.id(v), need);
        }

        Ok(self.memo[root as usize].unwrap_or(1))
    }
}

/// Linearize a graph given as successor/predecessor maps.
///
/// # Errors
/// * `CycleDetected` with the vertices that could never be placed
pub fn linearize_sethi_ullman(
    successors: &Adjacency,
    predecessors: &Adjacency,
    verbosity: u8,
) -> Result<Vec<TaskId>, SchedulerError> {
    linearize_graph(&PrecedenceGraph::from_adjacency(successors, predecessors), verbosity)
}

/// Produce a total order over `graph` in which every vertex precedes its successors.
///
/// Among the vertices eligible for the front position, the one with the
/// smallest `(register need, id)` is taken.
pub fn linearize_graph(
    graph: &PrecedenceGraph,
    verbosity: u8,
) -> Result<Vec<TaskId>, SchedulerError> {
    let mut needs = RegisterNeeds::new(graph);
    let mut unplaced_successors: Vec<usize> =
        graph.vertices().map(|v| graph.successors(v).len()).collect();
    let mut placed = vec![false; graph.len()];
    let mut leaves: BinaryHeap<Reverse<(u32, VertexId)>> = BinaryHeap::new();

    for v in graph.vertices() {
        if unplaced_successors[v as usize] == 0 {
            leaves.push(Reverse((needs.get(v, verbosity)?, v)));
        }
    }

    let mut order: Vec<TaskId> = Vec::with_capacity(graph.len());
    while order.len() < graph.len() {
        let Some(Reverse((need, v))) = leaves.pop() else {
            let blocked = graph.sorted_ids(graph.vertices().filter(|&v| !placed[v as usize]));
            log_changes!(verbosity, "No placeable vertex left; blocked: {:?}", blocked);
            return Err(SchedulerError::CycleDetected(blocked));
        };

        log_checks!(
            verbosity,
            "Placing {} (register need {}) ahead of {} others",
            graph.id(v),
            need,
            order.len()
        );
        placed[v as usize] = true;
        order.push(graph.id(v));

        for &p in graph.predecessors(v) {
            unplaced_successors[p as usize] -= 1;
            if unplaced_successors[p as usize] == 0 {
                leaves.push(Reverse((needs.get(p, verbosity)?, p)));
            }
        }
    }

    // Built back to front.
    order.reverse();
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, Relation};
    use crate::test_support::relation;

    fn linearize(rel: &Relation) -> Result<Vec<TaskId>, SchedulerError> {
        let (succ, pred) = build_graph(rel);
        linearize_sethi_ullman(&succ, &pred, 0)
    }

    fn assert_topological(order: &[TaskId], rel: &Relation) {
        let position = |id: TaskId| order.iter().position(|&x| x == id).unwrap();
        for (u, vs) in rel {
            for v in vs {
                assert!(position(*u) < position(*v), "{u} must come before {v} in {order:?}");
            }
        }
    }

    #[test]
    fn test_diamond() {
        let rel = relation(&[(1, vec![2, 3]), (2, vec![4]), (3, vec![4])]);
        let order = linearize(&rel).unwrap();

        assert_eq!(order.len(), 4);
        assert_eq!(order[0], 1);
        assert_eq!(order[3], 4);
        assert_topological(&order, &rel);
        // Equal needs tie-break on id: 2 is placed first, so it ends up later.
        assert_eq!(order, vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_expression_tree() {
        // 1 and 2 feed 3, which feeds 4.
        let rel = relation(&[(1, vec![3]), (2, vec![3]), (3, vec![4])]);
        let order = linearize(&rel).unwrap();
        assert_topological(&order, &rel);
        assert_eq!(order[3], 4);
        assert_eq!(order[2], 3);
    }

    #[test]
    fn test_lower_need_goes_last() {
        // 1 heads a chain of three, 5 is a lone sink; 5 has the smallest need.
        let rel = relation(&[(1, vec![2]), (2, vec![3]), (5, vec![])]);
        let order = linearize(&rel).unwrap();
        assert_topological(&order, &rel);
        assert_eq!(order, vec![1, 2, 5, 3]);
    }

    #[test]
    fn test_two_cycle_rejected() {
        let rel = relation(&[(1, vec![2]), (2, vec![1])]);
        assert_eq!(linearize(&rel), Err(SchedulerError::CycleDetected(vec![1, 2])));
    }

    #[test]
    fn test_cycle_with_tail_reports_blocked_vertices() {
        let rel = relation(&[(1, vec![2]), (2, vec![3]), (3, vec![2, 4])]);
        assert_eq!(
            linearize(&rel),
            Err(SchedulerError::CycleDetected(vec![1, 2, 3]))
        );
    }

    #[test]
    fn test_self_loop_rejected() {
        let rel = relation(&[(1, vec![1])]);
        assert_eq!(linearize(&rel), Err(SchedulerError::CycleDetected(vec![1])));
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(linearize(&Relation::default()), Ok(vec![]));
    }

    #[test]
    fn test_register_needs() {
        let rel = relation(&[(1, vec![2, 3]), (2, vec![4]), (3, vec![])]);
        let graph = PrecedenceGraph::from_relation(&rel);
        let mut needs = RegisterNeeds::new(&graph);

        for (id, expected) in [(1, 3), (2, 2), (3, 1), (4, 1)] {
            assert_eq!(needs.get(graph.vertex(id).unwrap(), 0), Ok(expected), "task {id}");
        }
    }

    #[test]
    fn test_register_need_on_cycle_errors() {
        let rel = relation(&[(1, vec![2]), (2, vec![3]), (3, vec![2])]);
        let graph = PrecedenceGraph::from_relation(&rel);
        let mut needs = RegisterNeeds::new(&graph);
        assert_eq!(
            needs.get(graph.vertex(1).unwrap(), 0),
            Err(SchedulerError::CycleDetected(vec![2, 3]))
        );
    }

    #[test]
    fn test_deep_chain() {
        let edges: Vec<(TaskId, Vec<TaskId>)> = (0..100_000).map(|i| (i, vec![i + 1])).collect();
        let rel = relation(&edges);
        let order = linearize(&rel).unwrap();
        assert_eq!(order.len(), 100_001);
        assert_eq!(order[0], 0);
        assert_eq!(order[100_000], 100_000);
    }
}
