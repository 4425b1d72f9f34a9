// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for creating [`NetworkGraph`] instances from a bulk of network
//! objects.

use petgraph::stable_graph::StableUnGraph;
use uuid::Uuid;

use crate::model::NetworkObject;
use crate::{Error, NetworkGraphConfig};

use super::{NetworkGraph, ObjectIndexMap, TopologyIndexMap};

/// `NetworkGraph` instantiation.
impl NetworkGraph {
    /// Creates a new [`NetworkGraph`] from the given objects.
    ///
    /// References between objects may point forward, all objects are inserted
    /// before any reference is resolved.
    ///
    /// Returns an error if the graph is invalid.
    pub fn try_new<ObjectIterator: IntoIterator<Item = NetworkObject>>(
        objects: ObjectIterator,
        config: NetworkGraphConfig,
    ) -> Result<Self, Error> {
        let mut graph = Self {
            objects: Vec::new(),
            object_indices: ObjectIndexMap::new(),
            topology: StableUnGraph::default(),
            topology_indices: TopologyIndexMap::new(),
            terminal_edges: Default::default(),
            equipment_terminals: Default::default(),
            transformer_ends: Default::default(),
            children: Default::default(),
            config,
        };

        for object in objects {
            graph.insert_object(object)?;
        }
        for index in 0..graph.objects.len() {
            graph.wire_object(index)?;
        }

        graph.validate()?;

        tracing::debug!(
            "Created network graph with {} objects and {} connected terminals.",
            graph.objects.len(),
            graph.terminal_edges.len()
        );

        Ok(graph)
    }

    /// Adds the object to the arena, and to the topology graph if it is
    /// equipment or a connectivity node.
    pub(super) fn insert_object(&mut self, object: NetworkObject) -> Result<usize, Error> {
        let mrid = object.mrid();
        if self.object_indices.contains_key(&mrid) {
            return Err(Error::invalid_graph(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        if matches!(
            object,
            NetworkObject::ConductingEquipment(_) | NetworkObject::ConnectivityNode(_)
        ) {
            let node = self.topology.add_node(mrid);
            self.topology_indices.insert(mrid, node);
        }

        let index = self.objects.len();
        self.objects.push(object);
        self.object_indices.insert(mrid, index);
        Ok(index)
    }

    /// Resolves the references stored on the object at the given arena index.
    pub(super) fn wire_object(&mut self, index: usize) -> Result<(), Error> {
        let object = self.objects[index].clone();
        let mrid = object.mrid();

        match object {
            NetworkObject::ConductingEquipment(equipment) => {
                if let Some(container) = equipment.container {
                    self.wire_container_reference(mrid, container)?;
                }
            }
            NetworkObject::EquipmentContainer(container) => {
                if let Some(parent) = container.parent {
                    self.wire_container_reference(mrid, parent)?;
                }
            }
            NetworkObject::Terminal(terminal) => {
                match self.find_object(terminal.equipment) {
                    Some(NetworkObject::ConductingEquipment(_)) => {}
                    Some(other) => {
                        return Err(Error::invalid_graph(format!(
                            "Terminal {mrid} is attached to {}:{}, which is not conducting equipment.",
                            other.class_name(),
                            other.mrid()
                        )));
                    }
                    None => {
                        return self.dangling(format!(
                            "Terminal {mrid} references missing equipment {}.",
                            terminal.equipment
                        ));
                    }
                }
                self.insert_terminal(terminal.equipment, mrid, terminal.sequence_number);

                if let Some(node) = terminal.connectivity_node {
                    match self.find_object(node) {
                        Some(NetworkObject::ConnectivityNode(_)) => {
                            self.connect_edge(mrid, terminal.equipment, node)?;
                        }
                        Some(other) => {
                            return Err(Error::invalid_graph(format!(
                                "Terminal {mrid} points to {}:{}, which is not a connectivity node.",
                                other.class_name(),
                                other.mrid()
                            )));
                        }
                        None => {
                            self.dangling(format!(
                                "Terminal {mrid} references missing connectivity node {node}."
                            ))?;
                        }
                    }
                }
            }
            NetworkObject::PowerTransformerEnd(end) => match self.find_object(end.power_transformer) {
                Some(NetworkObject::ConductingEquipment(_)) => {
                    self.transformer_ends
                        .entry(end.power_transformer)
                        .or_default()
                        .push(mrid);
                }
                _ => {
                    self.dangling(format!(
                        "PowerTransformerEnd {mrid} references missing power transformer {}.",
                        end.power_transformer
                    ))?;
                }
            },
            NetworkObject::ConnectivityNode(_) => {}
        }

        Ok(())
    }

    fn wire_container_reference(&mut self, child: Uuid, container: Uuid) -> Result<(), Error> {
        match self.find_object(container) {
            Some(NetworkObject::EquipmentContainer(_)) => {
                self.children.entry(container).or_default().push(child);
                Ok(())
            }
            Some(other) => Err(Error::invalid_graph(format!(
                "Object {child} is contained in {}:{}, which is not a container.",
                other.class_name(),
                other.mrid()
            ))),
            None => self.dangling(format!(
                "Object {child} references missing container {container}."
            )),
        }
    }

    /// Adds the topology edge for a terminal between its equipment and the
    /// given connectivity node.
    pub(super) fn connect_edge(
        &mut self,
        terminal: Uuid,
        equipment: Uuid,
        node: Uuid,
    ) -> Result<(), Error> {
        let (Some(&from), Some(&to)) = (
            self.topology_indices.get(&equipment),
            self.topology_indices.get(&node),
        ) else {
            return Err(Error::internal(format!(
                "Topology node missing for terminal {terminal}."
            )));
        };
        let edge = self.topology.add_edge(from, to, terminal);
        self.terminal_edges.insert(terminal, edge);
        Ok(())
    }

    /// Fails in strict mode, logs a warning and continues otherwise.
    fn dangling(&self, desc: String) -> Result<(), Error> {
        if self.config.strict_references {
            return Err(Error::dangling_reference(desc));
        }
        tracing::warn!("{}", desc);
        Ok(())
    }

    /// Adds a terminal to its equipment's list, after every terminal with a
    /// lower or equal sequence number.
    fn insert_terminal(&mut self, equipment: Uuid, terminal: Uuid, sequence_number: u32) {
        let mut terminals = self.equipment_terminals.remove(&equipment).unwrap_or_default();
        let position = terminals.partition_point(|id| {
            match self.find_object(*id) {
                Some(NetworkObject::Terminal(t)) => t.sequence_number <= sequence_number,
                _ => true,
            }
        });
        terminals.insert(position, terminal);
        self.equipment_terminals.insert(equipment, terminals);
    }
}
