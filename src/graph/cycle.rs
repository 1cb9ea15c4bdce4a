//! Cycle detection over rule-to-rule prerequisite edges.
//!
//! Only prerequisites that name another rule form edges; plain files are
//! leaves. A cycle would make the generated script call its blocks
//! recursively without end, so it is rejected before generation.

use std::collections::HashMap;

use super::GenError;
use crate::rules::RuleGraph;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

impl RuleGraph {
    /// Reject graphs whose rule targets depend on each other in a loop.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::CircularDependency`] naming the first cycle found,
    /// rotated so it starts at its smallest target name.
    pub fn detect_cycles(&self) -> Result<(), GenError> {
        let mut detector = CycleDetector::new(self);
        for rule in self.sorted() {
            if let Some(cycle) = detector.visit(&rule.target) {
                return Err(GenError::CircularDependency { cycle });
            }
        }
        Ok(())
    }
}

struct CycleDetector<'a> {
    graph: &'a RuleGraph,
    stack: Vec<&'a str>,
    states: HashMap<&'a str, VisitState>,
}

impl<'a> CycleDetector<'a> {
    fn new(graph: &'a RuleGraph) -> Self {
        Self {
            graph,
            stack: Vec::new(),
            states: HashMap::new(),
        }
    }

    fn visit(&mut self, node: &'a str) -> Option<Vec<String>> {
        match self.states.get(node) {
            Some(VisitState::Visited) => return None,
            Some(VisitState::Visiting) => {
                let idx = self.stack.iter().position(|n| *n == node).unwrap_or(0);
                let mut cycle: Vec<String> =
                    self.stack.iter().skip(idx).map(|n| (*n).to_owned()).collect();
                cycle.push(node.to_owned());
                return Some(canonicalize_cycle(cycle));
            }
            None => {
                self.states.insert(node, VisitState::Visiting);
            }
        }

        self.stack.push(node);
        let graph = self.graph;
        if let Some(rule) = graph.get(node) {
            for dep in &rule.sources {
                if !graph.contains(dep) {
                    continue;
                }
                if let Some(cycle) = self.visit(dep) {
                    return Some(cycle);
                }
            }
        }
        self.stack.pop();
        self.states.insert(node, VisitState::Visited);
        None
    }
}

fn canonicalize_cycle(mut cycle: Vec<String>) -> Vec<String> {
    if cycle.len() < 2 {
        return cycle;
    }
    let len = cycle.len() - 1;
    let start = cycle
        .iter()
        .take(len)
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(idx, _)| idx);
    let (prefix, suffix) = cycle.split_at_mut(len);
    prefix.rotate_left(start);
    if let (Some(first), Some(slot)) = (prefix.first().cloned(), suffix.first_mut()) {
        *slot = first;
    }
    cycle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;

    fn graph(edges: &[(&str, &[&str])]) -> RuleGraph {
        let mut graph = RuleGraph::default();
        for (target, sources) in edges {
            graph.insert(Rule::new(*target, sources.iter().map(|s| (*s).to_owned()).collect()));
        }
        graph
    }

    fn cycle_of(graph: &RuleGraph) -> Option<Vec<String>> {
        match graph.detect_cycles() {
            Ok(()) => None,
            Err(GenError::CircularDependency { cycle }) => Some(cycle),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn acyclic_graph_passes() {
        let g = graph(&[("all", &["a", "b"]), ("a", &["b", "a.c"]), ("b", &["b.c"])]);
        assert_eq!(cycle_of(&g), None);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let g = graph(&[("a", &["a"])]);
        assert_eq!(cycle_of(&g), Some(vec!["a".to_owned(), "a".to_owned()]));
    }

    #[test]
    fn two_node_cycle_is_reported_canonically() {
        let g = graph(&[("b", &["a"]), ("a", &["b"]), ("all", &["b"])]);
        assert_eq!(
            cycle_of(&g),
            Some(vec!["a".to_owned(), "b".to_owned(), "a".to_owned()])
        );
    }

    #[test]
    fn file_prerequisites_are_not_edges() {
        let g = graph(&[("a.obj", &["a.c"]), ("a.c", &[])]);
        assert_eq!(cycle_of(&g), None);
    }

    #[test]
    fn canonicalize_rotates_smallest_node() {
        let cycle = ["c", "a", "b", "c"].map(str::to_owned).to_vec();
        assert_eq!(canonicalize_cycle(cycle), ["a", "b", "c", "a"]);
    }

    #[test]
    fn error_message_lists_the_cycle() {
        let g = graph(&[("x", &["y"]), ("y", &["x"])]);
        let err = g.detect_cycles().expect_err("cycle");
        assert_eq!(err.to_string(), "circular dependency detected: x -> y -> x");
    }
}
