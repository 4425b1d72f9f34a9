// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for retrieving objects and connections from a [`NetworkGraph`].

use petgraph::stable_graph::NodeIndex;
use uuid::Uuid;

use crate::graph_traits::ObjectKind;
use crate::iterators::{Neighbors, Objects};
use crate::model::{
    ConductingEquipment, ConnectivityNode, NetworkObject, PowerTransformerEnd, Terminal,
};
use crate::{Error, NetworkGraph};

/// A terminal together with the equipment and connectivity node it joins.
#[derive(Clone, Debug, PartialEq)]
pub struct TerminalConnection<'a> {
    pub terminal: &'a Terminal,
    pub equipment: Uuid,
    /// `None` if the terminal is not connected, or its connectivity node is
    /// missing from the graph.
    pub connectivity_node: Option<Uuid>,
}

/// Object and connection retrieval.
impl NetworkGraph {
    /// Returns the object with the given `mRID`, if it exists.
    pub fn object(&self, mrid: Uuid) -> Result<&NetworkObject, Error> {
        self.find_object(mrid)
            .ok_or_else(|| Error::not_found(format!("Object with id {mrid} not found.")))
    }

    /// Returns the object with the given `mRID`, or `None` if it is absent.
    pub fn find_object(&self, mrid: Uuid) -> Option<&NetworkObject> {
        self.object_indices.get(&mrid).map(|&i| &self.objects[i])
    }

    /// Returns the object with the given `mRID` as type `T`.
    ///
    /// Fails with a `NotFound` error if the object is absent or has another
    /// type.
    pub fn get_by_id<T: ObjectKind>(&self, mrid: Uuid) -> Result<&T, Error> {
        self.find_object(mrid)
            .and_then(T::from_object)
            .ok_or_else(|| {
                Error::not_found(format!("{} with id {mrid} not found.", T::TYPE_NAME))
            })
    }

    /// Returns an iterator over all objects in the graph.
    pub fn all_objects(&self) -> Objects<'_> {
        Objects {
            iter: self.objects.iter(),
        }
    }

    /// Returns an iterator over all equipment in the graph, in insertion order.
    pub fn equipment(&self) -> impl Iterator<Item = &ConductingEquipment> + '_ {
        self.objects.iter().filter_map(NetworkObject::as_equipment)
    }

    /// Returns the distinct equipment one connectivity hop away from the
    /// given equipment or connectivity node, excluding itself.
    pub fn neighbors(&self, mrid: Uuid) -> Result<Neighbors<'_>, Error> {
        let index = self.topology_index(mrid)?;
        let candidates = if self.is_equipment_node(index) {
            self.topology
                .neighbors(index)
                .flat_map(|node| self.topology.neighbors(node))
                .collect()
        } else {
            self.topology.neighbors(index).collect()
        };
        Ok(Neighbors::new(self, mrid, candidates))
    }

    /// Returns the terminal connections of the given equipment or
    /// connectivity node.
    pub fn connections(&self, mrid: Uuid) -> Result<Vec<TerminalConnection<'_>>, Error> {
        match self.object(mrid)? {
            NetworkObject::ConductingEquipment(_) => Ok(self
                .terminals_of(mrid)?
                .into_iter()
                .map(|terminal| TerminalConnection {
                    terminal,
                    equipment: mrid,
                    connectivity_node: self
                        .connectivity_node_of(terminal)
                        .map(|n| n.identity.mrid),
                })
                .collect()),
            NetworkObject::ConnectivityNode(_) => {
                let index = self.topology_index(mrid)?;
                let mut connections = Vec::new();
                for edge in self.topology.edges(index) {
                    let terminal = self.get_by_id::<Terminal>(*edge.weight())?;
                    connections.push(TerminalConnection {
                        terminal,
                        equipment: terminal.equipment,
                        connectivity_node: Some(mrid),
                    });
                }
                connections.sort_by_key(|c| (c.equipment, c.terminal.sequence_number));
                Ok(connections)
            }
            other => Err(Error::invalid_argument(format!(
                "{}:{mrid} has no terminal connections.",
                other.class_name()
            ))),
        }
    }

    /// Returns the terminals of the given equipment, ordered by sequence
    /// number.
    pub fn terminals_of(&self, equipment: Uuid) -> Result<Vec<&Terminal>, Error> {
        self.get_by_id::<ConductingEquipment>(equipment)?;
        self.equipment_terminals
            .get(&equipment)
            .map(|ids| ids.iter().map(|id| self.get_by_id::<Terminal>(*id)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// Returns the connectivity node of a terminal, or `None` if it is not
    /// connected or the node is missing.
    pub fn connectivity_node_of(&self, terminal: &Terminal) -> Option<&ConnectivityNode> {
        terminal
            .connectivity_node
            .and_then(|node| self.get_by_id::<ConnectivityNode>(node).ok())
    }

    /// Returns the ends of the given power transformer, ordered by end number.
    pub fn transformer_ends_of(&self, transformer: Uuid) -> Vec<&PowerTransformerEnd> {
        let mut ends: Vec<&PowerTransformerEnd> = self
            .transformer_ends
            .get(&transformer)
            .into_iter()
            .flatten()
            .filter_map(|id| self.get_by_id::<PowerTransformerEnd>(*id).ok())
            .collect();
        ends.sort_by_key(|e| e.end_number);
        ends
    }

    /// Returns the terminal on the low voltage side of a power transformer.
    ///
    /// That is the terminal of the end with the lowest rated voltage, or when
    /// no end has a rated voltage, the terminal with the highest sequence
    /// number.
    pub fn low_voltage_terminal(&self, transformer: Uuid) -> Result<Option<&Terminal>, Error> {
        let by_rating = self
            .transformer_ends_of(transformer)
            .into_iter()
            .filter_map(|end| Some((end.rated_u?, end.terminal?)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .and_then(|(_, terminal)| self.get_by_id::<Terminal>(terminal).ok());
        if by_rating.is_some() {
            return Ok(by_rating);
        }
        Ok(self
            .terminals_of(transformer)?
            .into_iter()
            .max_by_key(|t| t.sequence_number))
    }

    pub(crate) fn topology_index(&self, mrid: Uuid) -> Result<NodeIndex, Error> {
        if let Some(index) = self.topology_indices.get(&mrid) {
            return Ok(*index);
        }
        match self.find_object(mrid) {
            Some(other) => Err(Error::invalid_argument(format!(
                "{}:{mrid} is not part of the network topology.",
                other.class_name()
            ))),
            None => Err(Error::not_found(format!("Object with id {mrid} not found."))),
        }
    }

    pub(crate) fn is_equipment_node(&self, index: NodeIndex) -> bool {
        self.find_object(self.topology[index])
            .is_some_and(|o| o.as_equipment().is_some())
    }
}
