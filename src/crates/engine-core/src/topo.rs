//! Deterministic topological sort over patch node ids, using Kahn's
//! algorithm. Grounded on the task-ordering pass in
//! `langgraph-core/src/pregel/algo.rs`, trimmed from Pregel's
//! version-tracked superstep bookkeeping down to a single pure
//! `(ids, edges) -> ordered ids` function.

use std::collections::{HashMap, VecDeque};

use crate::error::{EngineError, Result};
use crate::model::Edge;

/// Compute a deterministic topological order over `ids` given `edges`.
///
/// Ties are broken by the node's position in `ids` (a FIFO queue, not a
/// heap), so two patches with the same node/edge shape always produce the
/// same order. Returns [`EngineError::CycleDetected`] if the order's length
/// is shorter than `ids.len()`.
pub fn topo_sort(ids: &[String], edges: &[Edge]) -> Result<Vec<String>> {
    let position: HashMap<&str, usize> =
        ids.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();

    let mut in_degree: HashMap<&str, usize> = ids.iter().map(|id| (id.as_str(), 0)).collect();
    let mut outgoing: HashMap<&str, Vec<&str>> = ids.iter().map(|id| (id.as_str(), Vec::new())).collect();

    for edge in edges {
        if let Some(targets) = outgoing.get_mut(edge.source.as_str()) {
            targets.push(edge.target.as_str());
        }
        if let Some(deg) = in_degree.get_mut(edge.target.as_str()) {
            *deg += 1;
        }
    }

    let mut queue: VecDeque<&str> = ids
        .iter()
        .map(|id| id.as_str())
        .filter(|id| in_degree.get(id).copied().unwrap_or(0) == 0)
        .collect();
    // Stable order: the queue already iterates `ids` in input order.
    let mut queue: Vec<&str> = queue.drain(..).collect();
    queue.sort_by_key(|id| position[id]);
    let mut queue: VecDeque<&str> = queue.into();

    let mut order = Vec::with_capacity(ids.len());
    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        let mut newly_ready = Vec::new();
        for &target in outgoing.get(id).into_iter().flatten() {
            let deg = in_degree.get_mut(target).expect("target tracked in in_degree");
            *deg -= 1;
            if *deg == 0 {
                newly_ready.push(target);
            }
        }
        newly_ready.sort_by_key(|id| position[id]);
        for target in newly_ready {
            queue.push_back(target);
        }
    }

    if order.len() < ids.len() {
        return Err(EngineError::CycleDetected);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(s: &str, t: &str) -> Edge {
        Edge { source: s.to_string(), target: t.to_string() }
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_graph_sorts_empty() {
        assert_eq!(topo_sort(&[], &[]).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn single_node_no_edges() {
        assert_eq!(topo_sort(&ids(&["a"]), &[]).unwrap(), vec!["a"]);
    }

    #[test]
    fn linear_chain_preserves_dependency_order() {
        let order = topo_sort(&ids(&["a", "b", "c"]), &[e("a", "b"), e("b", "c")]).unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn independent_nodes_break_ties_by_input_position() {
        let order = topo_sort(&ids(&["b", "a"]), &[]).unwrap();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn fan_in_runs_parents_before_child() {
        let order = topo_sort(&ids(&["a", "b", "c"]), &[e("a", "c"), e("b", "c")]).unwrap();
        assert_eq!(order.last().unwrap(), "c");
        assert!(order.iter().position(|n| n == "a").unwrap() < order.iter().position(|n| n == "c").unwrap());
        assert!(order.iter().position(|n| n == "b").unwrap() < order.iter().position(|n| n == "c").unwrap());
    }

    #[test]
    fn direct_cycle_is_detected() {
        let err = topo_sort(&ids(&["a", "b"]), &[e("a", "b"), e("b", "a")]).unwrap_err();
        assert!(matches!(err, EngineError::CycleDetected));
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let err = topo_sort(&ids(&["a"]), &[e("a", "a")]).unwrap_err();
        assert!(matches!(err, EngineError::CycleDetected));
    }

    #[test]
    fn deterministic_across_runs() {
        let ids = ids(&["d", "a", "c", "b"]);
        let edges = vec![e("a", "b"), e("b", "c")];
        let first = topo_sort(&ids, &edges).unwrap();
        let second = topo_sort(&ids, &edges).unwrap();
        assert_eq!(first, second);
    }
}
