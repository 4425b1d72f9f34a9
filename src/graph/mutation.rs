// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The few mutations used by enrichment passes.  Each one keeps the terminal
//! and topology views of the graph consistent.

use uuid::Uuid;

use crate::model::{ConductingEquipment, ConnectivityNode, EquipmentContainer, NetworkObject, Terminal};
use crate::{Error, NetworkGraph};

impl NetworkGraph {
    /// Adds a single object and resolves its references.  Referenced objects
    /// must already be part of the graph.
    pub(crate) fn add_object(&mut self, object: impl Into<NetworkObject>) -> Result<Uuid, Error> {
        let index = self.insert_object(object.into())?;
        self.wire_object(index)?;
        Ok(self.objects[index].mrid())
    }

    /// Moves an equipment into another container.
    pub(crate) fn set_container(&mut self, equipment: Uuid, container: Uuid) -> Result<(), Error> {
        self.get_by_id::<EquipmentContainer>(container)?;
        let previous = self.get_by_id::<ConductingEquipment>(equipment)?.container;

        if let Some(previous) = previous {
            if let Some(children) = self.children.get_mut(&previous) {
                children.retain(|id| *id != equipment);
            }
        }
        self.children.entry(container).or_default().push(equipment);
        if let Some(NetworkObject::ConductingEquipment(e)) = self.object_mut(equipment) {
            e.container = Some(container);
        }
        Ok(())
    }

    /// Connects a terminal to the given connectivity node, detaching it from
    /// its previous node first.
    pub fn reconnect_terminal(&mut self, terminal: Uuid, node: Uuid) -> Result<(), Error> {
        let equipment = self.get_by_id::<Terminal>(terminal)?.equipment;
        self.get_by_id::<ConnectivityNode>(node)?;
        self.get_by_id::<ConductingEquipment>(equipment)?;

        self.disconnect_terminal(terminal)?;
        self.connect_edge(terminal, equipment, node)?;
        if let Some(NetworkObject::Terminal(t)) = self.object_mut(terminal) {
            t.connectivity_node = Some(node);
        }
        Ok(())
    }

    /// Detaches a terminal from its connectivity node.
    pub fn disconnect_terminal(&mut self, terminal: Uuid) -> Result<(), Error> {
        self.get_by_id::<Terminal>(terminal)?;
        if let Some(edge) = self.terminal_edges.remove(&terminal) {
            self.topology.remove_edge(edge);
        }
        if let Some(NetworkObject::Terminal(t)) = self.object_mut(terminal) {
            t.connectivity_node = None;
        }
        Ok(())
    }

    fn object_mut(&mut self, mrid: Uuid) -> Option<&mut NetworkObject> {
        let index = *self.object_indices.get(&mrid)?;
        self.objects.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_utils::NetworkBuilder;
    use crate::model::IdentifiedObject;
    use crate::EquipmentKind;

    #[test]
    fn test_reconnect_and_disconnect() -> Result<(), Error> {
        let mut builder = NetworkBuilder::new();
        let n1 = builder.node();
        let n2 = builder.node();
        let cable = builder.equipment(EquipmentKind::AcLineSegment, None);
        let fuse = builder.equipment(EquipmentKind::Fuse, None);
        builder.connect(cable, &[n1]);
        builder.connect(fuse, &[n1]);
        let mut graph = builder.build()?;

        let terminal = graph.terminals_of(fuse)?[0].identity.mrid;
        graph.reconnect_terminal(terminal, n2)?;
        assert_eq!(graph.neighbors(cable)?.count(), 0);
        assert_eq!(graph.neighbors(n2)?.map(|e| e.identity.mrid).collect::<Vec<_>>(), vec![fuse]);
        assert_eq!(graph.get_by_id::<Terminal>(terminal)?.connectivity_node, Some(n2));

        graph.disconnect_terminal(terminal)?;
        assert_eq!(graph.neighbors(n2)?.count(), 0);
        assert_eq!(graph.connections(fuse)?[0].connectivity_node, None);
        assert_eq!(graph.connections(n1)?.len(), 1);

        assert!(graph
            .reconnect_terminal(terminal, cable)
            .is_err_and(|e| e.is_not_found()));

        Ok(())
    }

    #[test]
    fn test_add_object_keeps_terminal_order() -> Result<(), Error> {
        let mut builder = NetworkBuilder::new();
        let n1 = builder.node();
        let n2 = builder.node();
        let cable = builder.equipment(EquipmentKind::AcLineSegment, None);
        builder.connect(cable, &[n1]);
        let mut graph = builder.build()?;

        let third = graph.add_object(Terminal::new(
            IdentifiedObject::new(Uuid::from_u128(100)),
            cable,
            Some(n2),
            3,
        ))?;
        let second = graph.add_object(Terminal::new(
            IdentifiedObject::new(Uuid::from_u128(101)),
            cable,
            None,
            2,
        ))?;

        let order: Vec<u32> = graph
            .terminals_of(cable)?
            .iter()
            .map(|t| t.sequence_number)
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(graph.terminals_of(cable)?[1].identity.mrid, second);
        assert_eq!(graph.terminals_of(cable)?[2].identity.mrid, third);

        Ok(())
    }
}
