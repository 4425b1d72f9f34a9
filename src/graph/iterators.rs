// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Iterators over objects, neighbors and traversals in a `NetworkGraph`.

use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;
use uuid::Uuid;

use crate::model::{ConductingEquipment, ConnectivityNode, NetworkObject};
use crate::NetworkGraph;

/// An iterator over the objects in a `NetworkGraph`, in insertion order.
pub struct Objects<'a> {
    pub(crate) iter: std::slice::Iter<'a, NetworkObject>,
}

impl<'a> Iterator for Objects<'a> {
    type Item = &'a NetworkObject;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// An iterator over the distinct equipment one connectivity hop away from an
/// object, excluding the object itself.
pub struct Neighbors<'a> {
    graph: &'a NetworkGraph,
    exclude: Uuid,
    iter: std::vec::IntoIter<NodeIndex>,
    visited: HashSet<NodeIndex>,
}

impl<'a> Neighbors<'a> {
    pub(crate) fn new(graph: &'a NetworkGraph, exclude: Uuid, candidates: Vec<NodeIndex>) -> Self {
        Neighbors {
            graph,
            exclude,
            iter: candidates.into_iter(),
            visited: HashSet::new(),
        }
    }
}

impl<'a> Iterator for Neighbors<'a> {
    type Item = &'a ConductingEquipment;

    fn next(&mut self) -> Option<Self::Item> {
        for index in self.iter.by_ref() {
            if self.graph.topology[index] == self.exclude || !self.visited.insert(index) {
                continue;
            }
            if let Some(equipment) = self
                .graph
                .find_object(self.graph.topology[index])
                .and_then(NetworkObject::as_equipment)
            {
                return Some(equipment);
            }
        }
        None
    }
}

/// One object produced by a traversal.
#[derive(Clone, Debug)]
pub struct TraversalStep<'a> {
    pub object: &'a NetworkObject,
    /// Number of equipment stepped onto since the start.  Connectivity nodes
    /// carry the count of the object they were reached from.
    pub hops: usize,
    /// The `mRID` of the object this one was reached from.
    pub parent: Option<Uuid>,
}

/// A lazy depth-first traversal over the topology of a `NetworkGraph`.
///
/// Created with [`NetworkGraph::traverse_with_hops`].  Every object is
/// produced at most once, so traversals terminate on rings.
pub struct Traversal<'a, FE, FN>
where
    FE: FnMut(&ConductingEquipment) -> bool,
    FN: FnMut(&ConnectivityNode) -> bool,
{
    graph: &'a NetworkGraph,
    start: NodeIndex,
    stack: Vec<(NodeIndex, usize, Option<NodeIndex>)>,
    visited: HashSet<NodeIndex>,
    equipment_stop: FE,
    node_stop: FN,
    include_boundary: bool,
}

impl<'a, FE, FN> Traversal<'a, FE, FN>
where
    FE: FnMut(&ConductingEquipment) -> bool,
    FN: FnMut(&ConnectivityNode) -> bool,
{
    pub(crate) fn new(
        graph: &'a NetworkGraph,
        start: NodeIndex,
        equipment_stop: FE,
        node_stop: FN,
        include_boundary: bool,
    ) -> Self {
        Traversal {
            graph,
            start,
            stack: vec![(start, 0, None)],
            visited: HashSet::from([start]),
            equipment_stop,
            node_stop,
            include_boundary,
        }
    }

    fn is_stop(&mut self, index: NodeIndex, object: &NetworkObject) -> bool {
        if index == self.start {
            return false;
        }
        match object {
            NetworkObject::ConductingEquipment(equipment) => (self.equipment_stop)(equipment),
            NetworkObject::ConnectivityNode(node) => (self.node_stop)(node),
            _ => false,
        }
    }
}

impl<'a, FE, FN> Iterator for Traversal<'a, FE, FN>
where
    FE: FnMut(&ConductingEquipment) -> bool,
    FN: FnMut(&ConnectivityNode) -> bool,
{
    type Item = TraversalStep<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        while let Some((index, hops, parent)) = self.stack.pop() {
            let Some(object) = graph.find_object(graph.topology[index]) else {
                continue;
            };

            let stopped = self.is_stop(index, object);
            if !stopped {
                for next in graph.topology.neighbors(index) {
                    if !self.visited.insert(next) {
                        continue;
                    }
                    let next_hops = if graph.is_equipment_node(next) {
                        hops + 1
                    } else {
                        hops
                    };
                    self.stack.push((next, next_hops, Some(index)));
                }
            }

            if stopped && !self.include_boundary {
                continue;
            }
            return Some(TraversalStep {
                object,
                hops,
                parent: parent.map(|p| graph.topology[p]),
            });
        }
        None
    }
}
