//! Cycle validation via Gabow's path-based strongly connected components.
//!
//! A single depth-first pass keeps two stacks: the traversal stack of
//! visited vertices not yet assigned to a component, and the root-candidate
//! stack used to find component boundaries without low-link values. The DFS
//! runs on an explicit frame stack so deep graphs cannot overflow the call
//! stack.

use crate::error::SchedulerError;
use crate::graph::{PrecedenceGraph, Relation};
use crate::interner::VertexId;
use crate::models::TaskId;
use crate::{log_changes, log_debug};

/// DFS frame: a vertex and the position of its next successor to examine.
struct Frame {
    vertex: VertexId,
    next: usize,
}

struct GabowState<'g> {
    graph: &'g PrecedenceGraph,
    counter: usize,
    preorder: Vec<Option<usize>>,
    assigned: Vec<bool>,
    path: Vec<VertexId>,
    roots: Vec<VertexId>,
    frames: Vec<Frame>,
    components: Vec<Vec<TaskId>>,
    verbosity: u8,
}

impl<'g> GabowState<'g> {
    fn new(graph: &'g PrecedenceGraph, verbosity: u8) -> Self {
        let n = graph.len();
        Self {
            graph,
            counter: 0,
            preorder: vec![None; n],
            assigned: vec![false; n],
            path: Vec::new(),
            roots: Vec::new(),
            frames: Vec::new(),
            components: Vec::new(),
            verbosity,
        }
    }

    fn visit(&mut self, v: VertexId) {
        self.preorder[v as usize] = Some(self.counter);
        self.counter += 1;
        self.path.push(v);
        self.roots.push(v);
        self.frames.push(Frame { vertex: v, next: 0 });
    }

    fn search(&mut self, start: VertexId) {
        self.visit(start);

        while let Some(frame) = self.frames.last_mut() {
            let v = frame.vertex;
            let successors = self.graph.successors(v);

            if frame.next < successors.len() {
                let w = successors[frame.next];
                frame.next += 1;
                match self.preorder[w as usize] {
                    None => self.visit(w),
                    Some(w_index) if !self.assigned[w as usize] => {
                        // Everything above w on the root stack shares a cycle with v.
                        while let Some(&top) = self.roots.last() {
                            if self.preorder[top as usize] > Some(w_index) {
                                self.roots.pop();
                            } else {
                                break;
                            }
                        }
                    }
                    Some(_) => {}
                }
                continue;
            }

            self.frames.pop();
            if self.roots.last() == Some(&v) {
                self.roots.pop();
                self.collect_component(v);
            }
        }
    }

    fn collect_component(&mut self, root: VertexId) {
        let mut members = Vec::new();
        while let Some(u) = self.path.pop() {
            self.assigned[u as usize] = true;
            members.push(u);
            if u == root {
                break;
            }
        }
        let component = self.graph.sorted_ids(members);
        log_debug!(
            self.verbosity,
            "SCC root {} closed component {:?}",
            self.graph.id(root),
            component
        );
        self.components.push(component);
    }
}

/// Compute all strongly connected components of `graph`.
///
/// Components are returned in completion order (a component appears before
/// any component that can reach it); members are sorted by id. Start
/// vertices are tried in ascending id order.
pub fn strongly_connected_components(graph: &PrecedenceGraph, verbosity: u8) -> Vec<Vec<TaskId>> {
    let mut state = GabowState::new(graph, verbosity);
    for v in graph.vertices() {
        if state.preorder[v as usize].is_none() {
            state.search(v);
        }
    }
    state.components
}

/// Check that `graph` has no cycle.
///
/// Any component with more than one member is a cycle. A singleton
/// component is also rejected when `detect_self_loops` is set and its
/// vertex lists itself as a successor.
pub fn validate_graph(
    graph: &PrecedenceGraph,
    detect_self_loops: bool,
    verbosity: u8,
) -> Result<(), SchedulerError> {
    for component in strongly_connected_components(graph, verbosity) {
        if component.len() > 1 {
            log_changes!(verbosity, "Cycle detected in tasks {:?}", component);
            return Err(SchedulerError::CycleDetected(component));
        }
    }

    if detect_self_loops {
        if let Some(v) = graph.vertices().find(|&v| graph.has_self_loop(v)) {
            log_changes!(verbosity, "Task {} precedes itself", graph.id(v));
            return Err(SchedulerError::CycleDetected(vec![graph.id(v)]));
        }
    }

    Ok(())
}

/// Reject a relation that contains a cycle, including a task that precedes itself.
pub fn validate_acyclic(relation: &Relation) -> Result<(), SchedulerError> {
    validate_graph(&PrecedenceGraph::from_relation(relation), true, 0)
}
