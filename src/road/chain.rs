//! Control-point chains as an arena of doubly linked nodes.
//!
//! Nodes reference each other by [`PointId`] rather than by pointer, so chains
//! may legitimately form cycles (closed roads). Every traversal is bounded by a
//! visited set and by [`MAX_CHAIN_TRAVERSAL`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::Point3;

/// Upper bound on nodes visited while walking a single chain.
pub const MAX_CHAIN_TRAVERSAL: usize = 10_000;

/// Identifier for a control point inside a [`ControlPointGraph`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PointId(pub usize);

impl PointId {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }
}

impl From<usize> for PointId {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPointNode {
    pub position: Point3,
    pub prev: Option<PointId>,
    pub next: Option<PointId>,
}

/// Errors raised by control-point edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("control point {0:?} does not exist")]
    UnknownPoint(PointId),
    #[error("control point {0:?} cannot be linked to itself")]
    SelfLink(PointId),
    #[error("control point {0:?} already has a successor")]
    HasSuccessor(PointId),
    #[error("control point {0:?} already has a predecessor")]
    HasPredecessor(PointId),
    #[error("control points {0:?} and {1:?} are not adjacent")]
    NotAdjacent(PointId, PointId),
    #[error("control point positions must be finite")]
    NonFinitePosition,
    #[error("a chain needs at least two points to be closed")]
    ChainTooShort,
}

/// One independent chain extracted from the graph, in traversal order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlPointChain {
    pub points: Vec<PointId>,
    pub positions: Vec<Point3>,
    pub closed: bool,
}

impl ControlPointChain {
    /// Builds a chain from raw positions, numbering the points in order.
    #[must_use]
    pub fn from_positions(positions: Vec<Point3>, closed: bool) -> Self {
        Self {
            points: (0..positions.len()).map(PointId::new).collect(),
            positions,
            closed,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Arena of control points. Removed slots stay empty so ids remain stable.
#[derive(Debug, Clone, Default)]
pub struct ControlPointGraph {
    nodes: Vec<Option<ControlPointNode>>,
    live: usize,
}

impl ControlPointGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live control points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[must_use]
    pub fn point(&self, id: PointId) -> Option<&ControlPointNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Iterates live points in id order.
    pub fn points(&self) -> impl Iterator<Item = (PointId, &ControlPointNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_ref().map(|n| (PointId::new(i), n)))
    }

    fn node_mut(&mut self, id: PointId) -> Result<&mut ControlPointNode, ChainError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(ChainError::UnknownPoint(id))
    }

    fn node(&self, id: PointId) -> Result<&ControlPointNode, ChainError> {
        self.point(id).ok_or(ChainError::UnknownPoint(id))
    }

    /// Adds an unlinked point, starting a new chain.
    pub fn add_point(&mut self, position: Point3) -> Result<PointId, ChainError> {
        if !position.is_finite() {
            return Err(ChainError::NonFinitePosition);
        }
        let id = PointId::new(self.nodes.len());
        self.nodes.push(Some(ControlPointNode {
            position,
            prev: None,
            next: None,
        }));
        self.live += 1;
        Ok(id)
    }

    /// Adds a point as the successor of `after`, which must be a chain tail.
    pub fn append_point(&mut self, after: PointId, position: Point3) -> Result<PointId, ChainError> {
        if self.node(after)?.next.is_some() {
            return Err(ChainError::HasSuccessor(after));
        }
        let id = self.add_point(position)?;
        self.link(after, id)?;
        Ok(id)
    }

    /// Inserts a point between two adjacent points `a -> b`.
    pub fn insert_between(&mut self, a: PointId, b: PointId, position: Point3) -> Result<PointId, ChainError> {
        if self.node(a)?.next != Some(b) || self.node(b)?.prev != Some(a) {
            return Err(ChainError::NotAdjacent(a, b));
        }
        if !position.is_finite() {
            return Err(ChainError::NonFinitePosition);
        }
        let id = self.add_point(position)?;
        self.node_mut(a)?.next = Some(id);
        self.node_mut(b)?.prev = Some(id);
        let node = self.node_mut(id)?;
        node.prev = Some(a);
        node.next = Some(b);
        Ok(id)
    }

    pub fn move_point(&mut self, id: PointId, position: Point3) -> Result<(), ChainError> {
        if !position.is_finite() {
            return Err(ChainError::NonFinitePosition);
        }
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Removes a point, linking its neighbours to each other.
    ///
    /// Removing one point of a two-point loop leaves the survivor unlinked.
    pub fn remove_point(&mut self, id: PointId) -> Result<Point3, ChainError> {
        let node = *self.node(id)?;
        match (node.prev, node.next) {
            (Some(prev), Some(next)) if prev == next => {
                let other = self.node_mut(prev)?;
                other.prev = None;
                other.next = None;
            }
            (prev, next) => {
                if let Some(prev) = prev {
                    self.node_mut(prev)?.next = next;
                }
                if let Some(next) = next {
                    self.node_mut(next)?.prev = prev;
                }
            }
        }
        self.nodes[id.0] = None;
        self.live -= 1;
        Ok(node.position)
    }

    /// Links `a -> b`. `a` must have no successor and `b` no predecessor.
    pub fn link(&mut self, a: PointId, b: PointId) -> Result<(), ChainError> {
        if a == b {
            return Err(ChainError::SelfLink(a));
        }
        if self.node(a)?.next.is_some() {
            return Err(ChainError::HasSuccessor(a));
        }
        if self.node(b)?.prev.is_some() {
            return Err(ChainError::HasPredecessor(b));
        }
        self.node_mut(a)?.next = Some(b);
        self.node_mut(b)?.prev = Some(a);
        Ok(())
    }

    /// Cuts the link leaving `a`, if any.
    pub fn unlink(&mut self, a: PointId) -> Result<(), ChainError> {
        let Some(next) = self.node_mut(a)?.next.take() else {
            return Ok(());
        };
        self.node_mut(next)?.prev = None;
        Ok(())
    }

    /// Links the tail of the chain containing `id` back to its head.
    /// Already-closed chains are left as they are.
    pub fn close_chain(&mut self, id: PointId) -> Result<(), ChainError> {
        self.node(id)?;
        let (head, cyclic) = self.walk_to_head(id);
        if cyclic {
            return Ok(());
        }
        let (tail, _) = self.walk_to_tail(head);
        if tail == head {
            return Err(ChainError::ChainTooShort);
        }
        self.link(tail, head)
    }

    fn walk_to_head(&self, id: PointId) -> (PointId, bool) {
        let mut current = id;
        for _ in 0..MAX_CHAIN_TRAVERSAL {
            match self.point(current).and_then(|n| n.prev) {
                Some(prev) if prev == id => return (id, true),
                Some(prev) => current = prev,
                None => return (current, false),
            }
        }
        log::warn!("chain traversal cap reached walking back from {id:?}");
        (current, false)
    }

    fn walk_to_tail(&self, id: PointId) -> (PointId, bool) {
        let mut current = id;
        for _ in 0..MAX_CHAIN_TRAVERSAL {
            match self.point(current).and_then(|n| n.next) {
                Some(next) if next == id => return (id, true),
                Some(next) => current = next,
                None => return (current, false),
            }
        }
        log::warn!("chain traversal cap reached walking forward from {id:?}");
        (current, false)
    }

    /// Extracts every independent chain.
    ///
    /// Open chains are walked from their heads first; whatever is left over
    /// afterwards belongs to pure cycles.
    #[must_use]
    pub fn chains(&self) -> Vec<ControlPointChain> {
        self.chains_with_cap().0
    }

    /// Like [`chains`](Self::chains), also reporting whether a traversal hit
    /// [`MAX_CHAIN_TRAVERSAL`].
    #[must_use]
    pub fn chains_with_cap(&self) -> (Vec<ControlPointChain>, bool) {
        let mut visited: HashSet<PointId> = HashSet::with_capacity(self.live);
        let mut chains = Vec::new();
        let mut capped = false;

        let heads = self.points().filter(|(_, n)| n.prev.is_none()).map(|(id, _)| id);
        let rest: Vec<PointId> = self.points().map(|(id, _)| id).collect();

        for start in heads.collect::<Vec<_>>().into_iter().chain(rest) {
            if visited.contains(&start) {
                continue;
            }
            let (chain, hit_cap) = self.walk_chain(start, &mut visited);
            capped |= hit_cap;
            chains.push(chain);
        }

        (chains, capped)
    }

    fn walk_chain(&self, start: PointId, visited: &mut HashSet<PointId>) -> (ControlPointChain, bool) {
        let mut chain = ControlPointChain::default();
        let mut current = Some(start);

        while let Some(id) = current {
            if id == start && !chain.points.is_empty() {
                chain.closed = true;
                break;
            }
            if chain.points.len() >= MAX_CHAIN_TRAVERSAL {
                log::warn!("chain starting at {start:?} exceeds {MAX_CHAIN_TRAVERSAL} points, truncating");
                return (chain, true);
            }
            if !visited.insert(id) {
                break;
            }
            let Some(node) = self.point(id) else {
                break;
            };
            chain.points.push(id);
            chain.positions.push(node.position);
            current = node.next;
        }

        (chain, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, z: f64) -> Point3 {
        Point3::new(x, 0.0, z)
    }

    fn open_chain(graph: &mut ControlPointGraph, count: usize) -> Vec<PointId> {
        let mut ids = vec![graph.add_point(p(0.0, 0.0)).unwrap()];
        for i in 1..count {
            let last = *ids.last().unwrap();
            ids.push(graph.append_point(last, p(i as f64, 0.0)).unwrap());
        }
        ids
    }

    #[test]
    fn open_chain_is_walked_from_head() {
        let mut graph = ControlPointGraph::new();
        let ids = open_chain(&mut graph, 4);
        let chains = graph.chains();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].points, ids);
        assert!(!chains[0].closed);
    }

    #[test]
    fn closing_a_chain_makes_it_cyclic() {
        let mut graph = ControlPointGraph::new();
        let ids = open_chain(&mut graph, 4);
        graph.close_chain(ids[2]).unwrap();
        let chains = graph.chains();
        assert_eq!(chains.len(), 1);
        assert!(chains[0].closed);
        assert_eq!(chains[0].len(), 4);
        // closing twice is a no-op
        graph.close_chain(ids[0]).unwrap();
        assert_eq!(graph.point(ids[3]).unwrap().next, Some(ids[0]));
    }

    #[test]
    fn removing_a_point_splices_neighbours() {
        let mut graph = ControlPointGraph::new();
        let ids = open_chain(&mut graph, 3);
        graph.remove_point(ids[1]).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.point(ids[0]).unwrap().next, Some(ids[2]));
        assert_eq!(graph.point(ids[2]).unwrap().prev, Some(ids[0]));
        assert!(matches!(graph.move_point(ids[1], p(0.0, 0.0)), Err(ChainError::UnknownPoint(_))));
    }

    #[test]
    fn two_point_loop_collapses_cleanly() {
        let mut graph = ControlPointGraph::new();
        let ids = open_chain(&mut graph, 2);
        graph.close_chain(ids[0]).unwrap();
        graph.remove_point(ids[1]).unwrap();
        let node = graph.point(ids[0]).unwrap();
        assert_eq!((node.prev, node.next), (None, None));
    }

    #[test]
    fn link_rules_are_enforced() {
        let mut graph = ControlPointGraph::new();
        let ids = open_chain(&mut graph, 2);
        let loose = graph.add_point(p(5.0, 5.0)).unwrap();
        assert_eq!(graph.link(loose, loose), Err(ChainError::SelfLink(loose)));
        assert_eq!(graph.link(ids[0], loose), Err(ChainError::HasSuccessor(ids[0])));
        assert_eq!(graph.link(loose, ids[1]), Err(ChainError::HasPredecessor(ids[1])));
        assert_eq!(graph.close_chain(loose), Err(ChainError::ChainTooShort));
        assert_eq!(
            graph.add_point(Point3::new(f64::NAN, 0.0, 0.0)),
            Err(ChainError::NonFinitePosition)
        );
    }

    #[test]
    fn insert_between_requires_adjacency() {
        let mut graph = ControlPointGraph::new();
        let ids = open_chain(&mut graph, 3);
        let mid = graph.insert_between(ids[0], ids[1], p(0.5, 1.0)).unwrap();
        let chain = &graph.chains()[0];
        assert_eq!(chain.points, vec![ids[0], mid, ids[1], ids[2]]);
        assert_eq!(
            graph.insert_between(ids[0], ids[2], p(0.0, 0.0)),
            Err(ChainError::NotAdjacent(ids[0], ids[2]))
        );
    }

    #[test]
    fn independent_chains_and_cycles_are_all_found() {
        let mut graph = ControlPointGraph::new();
        open_chain(&mut graph, 3);
        let a = graph.add_point(p(10.0, 0.0)).unwrap();
        let b = graph.append_point(a, p(11.0, 0.0)).unwrap();
        let c = graph.append_point(b, p(11.0, 1.0)).unwrap();
        graph.link(c, a).unwrap();

        let (chains, capped) = graph.chains_with_cap();
        assert!(!capped);
        assert_eq!(chains.len(), 2);
        assert_eq!(chains.iter().filter(|c| c.closed).count(), 1);
        assert_eq!(chains.iter().map(ControlPointChain::len).sum::<usize>(), 6);
    }

    #[test]
    fn unlink_opens_a_loop() {
        let mut graph = ControlPointGraph::new();
        let ids = open_chain(&mut graph, 3);
        graph.close_chain(ids[0]).unwrap();
        graph.unlink(ids[1]).unwrap();
        let chains = graph.chains();
        assert_eq!(chains.len(), 1);
        assert!(!chains[0].closed);
        assert_eq!(chains[0].points, vec![ids[2], ids[0], ids[1]]);
    }
}
