// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A graph representation of the physical network model: equipment,
//! connectivity nodes, terminals and containers, and the connections between
//! them.

mod containment;
mod creation;
mod enrichment;
mod mutation;
mod retrieval;
mod validation;

pub mod iterators;
mod topology;
mod traversal;

#[cfg(test)]
mod test_utils;

pub use enrichment::EnrichmentSummary;
pub use retrieval::TerminalConnection;
pub use topology::{
    ConnectionPoint, Feeder, FeederMap, FeederReport, FeederType, FlatFeederInfo, LineSegment,
    SimpleLine,
};

use crate::{model::NetworkObject, NetworkGraphConfig};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use std::collections::HashMap;
use uuid::Uuid;

/// Objects are stored in an arena, `ObjectIndexMap` stores the arena position
/// for every `mRID`.
pub(crate) type ObjectIndexMap = HashMap<Uuid, usize>;

/// Equipment and connectivity nodes are the nodes of the topology graph.
/// `TopologyIndexMap` stores the corresponding `NodeIndex` for their `mRID`s.
pub(crate) type TopologyIndexMap = HashMap<Uuid, NodeIndex>;

/// A graph representation of a physical distribution network.
///
/// The topology is an undirected bipartite graph between equipment and
/// connectivity nodes, with one edge per connected terminal.  Containment is
/// kept separately, as a tree of `mRID` references.
pub struct NetworkGraph {
    objects: Vec<NetworkObject>,
    object_indices: ObjectIndexMap,
    /// Node weights are `mRID`s of equipment and connectivity nodes, edge
    /// weights are `mRID`s of terminals.
    topology: StableUnGraph<Uuid, Uuid>,
    topology_indices: TopologyIndexMap,
    terminal_edges: HashMap<Uuid, EdgeIndex>,
    equipment_terminals: HashMap<Uuid, Vec<Uuid>>,
    transformer_ends: HashMap<Uuid, Vec<Uuid>>,
    children: HashMap<Uuid, Vec<Uuid>>,
    config: NetworkGraphConfig,
}

impl NetworkGraph {
    /// Returns the configuration the graph was created with.
    pub fn config(&self) -> &NetworkGraphConfig {
        &self.config
    }
}
