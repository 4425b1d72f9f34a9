// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Enrichment passes that normalize the topology before any analysis runs.
//!
//! Synthetic objects get UUIDv5 ids derived from the object that caused them,
//! so enriching identical graphs produces identical ids.

use uuid::Uuid;

use crate::equipment_kind::KindPredicates;
use crate::model::{
    ConductingEquipment, ConnectivityNode, EquipmentContainer, IdentifiedObject, NetworkObject,
    Terminal,
};
use crate::{ContainerKind, EquipmentKind, Error, NetworkGraph};

/// The number of changes made by [`NetworkGraph::enrich`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub cleared_terminals: usize,
    pub added_bays: usize,
    pub added_disconnectors: usize,
}

impl NetworkGraph {
    /// Runs all enrichment passes, in order:
    ///
    /// 1. terminals pointing to missing connectivity nodes are disconnected,
    /// 2. switches sitting directly in a substation or voltage level get a
    ///    bay of their own,
    /// 3. breakers moved in step 2 that connect straight to a busbar get a
    ///    disconnector between them and the busbar.
    pub fn enrich(&mut self) -> Result<EnrichmentSummary, Error> {
        let cleared_terminals = self.clear_dangling_terminals()?;
        let moved = self.add_missing_bays()?;
        let added_disconnectors = self.add_missing_disconnectors(&moved)?;

        let summary = EnrichmentSummary {
            cleared_terminals,
            added_bays: moved.len(),
            added_disconnectors,
        };
        tracing::info!(
            "Enrichment done: {} terminals cleared, {} bays and {} disconnectors added.",
            summary.cleared_terminals,
            summary.added_bays,
            summary.added_disconnectors
        );
        Ok(summary)
    }

    fn clear_dangling_terminals(&mut self) -> Result<usize, Error> {
        let dangling: Vec<Uuid> = self
            .objects
            .iter()
            .filter_map(|o| match o {
                NetworkObject::Terminal(t) => Some(t),
                _ => None,
            })
            .filter(|t| t.connectivity_node.is_some() && self.connectivity_node_of(t).is_none())
            .map(|t| t.identity.mrid)
            .collect();

        for terminal in &dangling {
            self.disconnect_terminal(*terminal)?;
        }
        Ok(dangling.len())
    }

    /// Returns the switches that were moved into a new bay.
    fn add_missing_bays(&mut self) -> Result<Vec<Uuid>, Error> {
        let candidates: Vec<(Uuid, Uuid, Option<String>)> = self
            .equipment()
            .filter(|e| e.is_switch())
            .filter_map(|e| {
                let container = self.container_of(e.identity.mrid)?;
                matches!(
                    container.kind,
                    ContainerKind::Substation | ContainerKind::VoltageLevel
                )
                .then(|| {
                    (
                        e.identity.mrid,
                        container.identity.mrid,
                        e.identity.name.clone(),
                    )
                })
            })
            .collect();

        let mut moved = Vec::with_capacity(candidates.len());
        for (switch, container, name) in candidates {
            let bay_id = Uuid::new_v5(&switch, b"Bay");
            let mut bay = EquipmentContainer::new(
                IdentifiedObject {
                    name,
                    ..IdentifiedObject::new(bay_id)
                },
                ContainerKind::Bay,
            );
            bay.parent = Some(container);
            self.add_object(bay)?;
            self.set_container(switch, bay_id)?;
            tracing::debug!("Added bay {} for switch {}.", bay_id, switch);
            moved.push(switch);
        }
        Ok(moved)
    }

    fn add_missing_disconnectors(&mut self, switches: &[Uuid]) -> Result<usize, Error> {
        let mut added = 0;
        for &switch in switches {
            let breaker = self.get_by_id::<ConductingEquipment>(switch)?;
            if !breaker.is_breaker() {
                continue;
            }
            let name = breaker.identity.name.clone();
            let voltage = breaker.nominal_voltage;
            let bay = self.bay_of(switch).map(|b| b.identity.mrid);

            let busbar_terminal = self
                .terminals_of(switch)?
                .into_iter()
                .filter_map(|t| Some((t.identity.mrid, self.connectivity_node_of(t)?.identity.mrid)))
                .find(|(_, node)| {
                    self.neighbors(*node)
                        .is_ok_and(|mut n| n.any(|e| e.is_busbar()))
                });
            let Some((terminal, busbar_node)) = busbar_terminal else {
                continue;
            };

            let disconnector_id = Uuid::new_v5(&switch, b"Disconnector");
            let node_id = Uuid::new_v5(&terminal, b"ConnectivityNode");
            let mut disconnector = ConductingEquipment::new(
                IdentifiedObject {
                    name: name.map(|n| format!("{n}-DS")),
                    ..IdentifiedObject::new(disconnector_id)
                },
                EquipmentKind::Disconnector,
            );
            disconnector.container = bay;
            disconnector.nominal_voltage = voltage;

            self.add_object(ConnectivityNode::new(IdentifiedObject::new(node_id)))?;
            self.add_object(disconnector)?;
            self.add_object(Terminal::new(
                IdentifiedObject::new(Uuid::new_v5(&disconnector_id, b"Terminal1")),
                disconnector_id,
                Some(busbar_node),
                1,
            ))?;
            self.add_object(Terminal::new(
                IdentifiedObject::new(Uuid::new_v5(&disconnector_id, b"Terminal2")),
                disconnector_id,
                Some(node_id),
                2,
            ))?;
            self.reconnect_terminal(terminal, node_id)?;

            tracing::debug!(
                "Added disconnector {} between breaker {} and busbar node {}.",
                disconnector_id,
                switch,
                busbar_node
            );
            added += 1;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_utils::NetworkBuilder;

    /// A breaker placed directly in a voltage level, between a busbar and a
    /// cable.
    fn bare_breaker() -> (NetworkBuilder, Uuid, Uuid, Uuid, Uuid) {
        let mut builder = NetworkBuilder::new();
        let substation = builder.substation("A", "PrimarySubstation");
        let voltage_level = builder.voltage_level(substation, 10_000.0);
        let busbar_bay = builder.bay(voltage_level);
        let busbar = builder.equipment(EquipmentKind::BusbarSection, Some(busbar_bay));
        let breaker = builder.equipment(EquipmentKind::Breaker, Some(voltage_level));
        let cable = builder.equipment(EquipmentKind::AcLineSegment, None);
        let busbar_node = builder.node();
        let cable_node = builder.node();
        builder.connect(busbar, &[busbar_node]);
        builder.connect(breaker, &[busbar_node, cable_node]);
        builder.connect(cable, &[cable_node]);
        (builder, voltage_level, busbar, breaker, cable)
    }

    #[test]
    fn test_enrich_bare_breaker() -> Result<(), Error> {
        let (builder, voltage_level, busbar, breaker, cable) = bare_breaker();
        let mut graph = builder.build()?;

        let summary = graph.enrich()?;
        assert_eq!(
            summary,
            EnrichmentSummary {
                cleared_terminals: 0,
                added_bays: 1,
                added_disconnectors: 1,
            }
        );

        let bay = graph.bay_of(breaker).map(|b| b.identity.mrid);
        assert_eq!(bay, Some(Uuid::new_v5(&breaker, b"Bay")));
        assert_eq!(
            graph.container_of(bay.unwrap_or_default()).map(|c| c.identity.mrid),
            Some(voltage_level)
        );
        assert!(!graph
            .children_of(voltage_level)
            .iter()
            .any(|o| o.mrid() == breaker));

        let disconnector = Uuid::new_v5(&breaker, b"Disconnector");
        let busbar_neighbors: Vec<Uuid> = graph.neighbors(busbar)?.map(|e| e.identity.mrid).collect();
        assert_eq!(busbar_neighbors, vec![disconnector]);
        let breaker_neighbors: Vec<Uuid> =
            graph.neighbors(breaker)?.map(|e| e.identity.mrid).collect();
        assert!(breaker_neighbors.contains(&disconnector));
        assert!(breaker_neighbors.contains(&cable));
        assert_eq!(graph.bay_of(disconnector).map(|b| b.identity.mrid), bay);

        // A second run finds nothing left to do.
        assert_eq!(graph.enrich()?, EnrichmentSummary::default());

        Ok(())
    }

    #[test]
    fn test_enrichment_is_deterministic() -> Result<(), Error> {
        let (builder, ..) = bare_breaker();
        let mut first = builder.build()?;
        let mut second = builder.build()?;
        first.enrich()?;
        second.enrich()?;

        let ids = |g: &NetworkGraph| g.all_objects().map(|o| o.mrid()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));

        Ok(())
    }

    #[test]
    fn test_clear_dangling_terminals() -> Result<(), Error> {
        let mut builder = NetworkBuilder::new();
        let cable = builder.equipment(EquipmentKind::AcLineSegment, None);
        builder.connect(cable, &[Uuid::from_u128(999)]);
        let mut graph = builder.build()?;

        assert_eq!(graph.enrich()?.cleared_terminals, 1);
        assert_eq!(graph.connections(cable)?[0].terminal.connectivity_node, None);

        Ok(())
    }

    #[test]
    fn test_enrich_many_breakers_on_one_busbar() -> Result<(), Error> {
        let mut builder = NetworkBuilder::new();
        let substation = builder.substation("A", "PrimarySubstation");
        let voltage_level = builder.voltage_level(substation, 10_000.0);
        let busbar = builder.equipment(EquipmentKind::BusbarSection, Some(voltage_level));
        let busbar_node = builder.node();
        builder.connect(busbar, &[busbar_node]);
        let breakers: Vec<Uuid> = (0..500)
            .map(|_| {
                let breaker = builder.equipment(EquipmentKind::Breaker, Some(voltage_level));
                let out = builder.node();
                builder.connect(breaker, &[busbar_node, out]);
                breaker
            })
            .collect();
        let mut graph = builder.build()?;

        let summary = graph.enrich()?;
        assert_eq!(summary.added_bays, 500);
        assert_eq!(summary.added_disconnectors, 500);
        assert_eq!(graph.neighbors(busbar)?.count(), 500);
        for breaker in breakers {
            let order: Vec<u32> = graph
                .terminals_of(breaker)?
                .iter()
                .map(|t| t.sequence_number)
                .collect();
            assert_eq!(order, vec![1, 2]);
        }

        Ok(())
    }
}
