// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Traces feeders downstream from network injections and substation
//! transformers.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::equipment_kind::KindPredicates;
use crate::model::{ConductingEquipment, ConnectivityNode, EquipmentContainer};
use crate::{Error, NetworkGraph};

use super::{ConnectionPoint, Feeder, FeederMap, FeederType};

pub(crate) struct FeederTracer<'a> {
    graph: &'a NetworkGraph,
    feeders: FeederMap,
}

impl<'a> FeederTracer<'a> {
    pub(crate) fn new(graph: &'a NetworkGraph) -> Self {
        Self {
            graph,
            feeders: FeederMap::new(),
        }
    }

    pub(crate) fn trace(mut self) -> Result<FeederMap, Error> {
        let graph = self.graph;
        for equipment in graph.equipment() {
            if equipment.is_network_injection() {
                self.trace_network_injection(equipment)?;
            } else if equipment.is_power_transformer() {
                self.trace_transformer(equipment)?;
            }
        }

        tracing::info!(
            "Traced {} feeders over {} equipment.",
            self.feeders.values().map(Vec::len).sum::<usize>(),
            self.feeders.len()
        );
        Ok(self.feeders)
    }

    fn trace_network_injection(&mut self, injection: &ConductingEquipment) -> Result<(), Error> {
        let mrid = injection.identity.mrid;
        let point = ConnectionPoint {
            substation: self
                .graph
                .substation_of(mrid, false)?
                .map(|s| s.identity.mrid),
            bay: self.graph.bay_of(mrid).map(|b| b.identity.mrid),
            power_transformer: None,
            network_injection: Some(mrid),
        };
        self.trace_from(mrid, FeederType::NetworkInjection, point, |_| false)
    }

    fn trace_transformer(&mut self, transformer: &ConductingEquipment) -> Result<(), Error> {
        let graph = self.graph;
        let mrid = transformer.identity.mrid;

        let Some(substation) = graph.substation_of(mrid, false)? else {
            tracing::warn!("Power transformer {} is not inside a substation.", mrid);
            return Ok(());
        };
        let feeder_type = match self.feeder_type_of(substation) {
            Some(t @ (FeederType::PrimarySubstation | FeederType::SecondarySubstation)) => t,
            _ => {
                tracing::warn!(
                    "Power transformer {} is in substation {} of type {}, which does not feed.",
                    mrid,
                    substation.identity.mrid,
                    substation.type_name()
                );
                return Ok(());
            }
        };
        let Some(low_voltage) = graph.low_voltage_terminal(mrid)? else {
            tracing::warn!("Power transformer {} has no low voltage terminal.", mrid);
            return Ok(());
        };
        let low_voltage_node = low_voltage.connectivity_node;

        // The other windings are upstream and must not be walked into.
        let upstream_nodes: HashSet<Uuid> = graph
            .terminals_of(mrid)?
            .into_iter()
            .filter_map(|t| t.connectivity_node)
            .filter(|n| Some(*n) != low_voltage_node)
            .collect();

        let point = ConnectionPoint {
            substation: Some(substation.identity.mrid),
            bay: graph.bay_of(mrid).map(|b| b.identity.mrid),
            power_transformer: Some(mrid),
            network_injection: None,
        };
        self.trace_from(mrid, feeder_type, point, move |n| {
            upstream_nodes.contains(&n.identity.mrid)
        })
    }

    /// Walks from the source, stopping at transformers, network injections
    /// and open switches, and records a feeder on every equipment reached.
    fn trace_from(
        &mut self,
        source: Uuid,
        feeder_type: FeederType,
        point: ConnectionPoint,
        node_stop: impl FnMut(&ConnectivityNode) -> bool,
    ) -> Result<(), Error> {
        let graph = self.graph;
        let mut parents: HashMap<Uuid, Uuid> = HashMap::new();

        for step in graph.traverse_with_hops(
            source,
            |e| e.is_power_transformer() || e.is_network_injection() || e.is_open_switch(),
            node_stop,
            true,
        )? {
            let mrid = step.object.mrid();
            if let Some(parent) = step.parent {
                parents.insert(mrid, parent);
            }
            if step.object.as_equipment().is_none() {
                continue;
            }

            let mut path = vec![mrid];
            let mut current = mrid;
            while let Some(parent) = parents.get(&current) {
                if graph.get_by_id::<ConductingEquipment>(*parent).is_ok() {
                    path.push(*parent);
                }
                current = *parent;
            }
            path.reverse();

            self.feeders.entry(mrid).or_default().push(Feeder {
                feeder_type,
                connection_point: point.clone(),
                hops: step.hops,
                path,
            });
        }
        Ok(())
    }

    fn feeder_type_of(&self, substation: &EquipmentContainer) -> Option<FeederType> {
        let config = self.graph.config();
        let type_name = substation.type_name();
        if config.primary_substation_types.contains(&type_name) {
            Some(FeederType::PrimarySubstation)
        } else if config.secondary_substation_types.contains(&type_name) {
            Some(FeederType::SecondarySubstation)
        } else if config.cable_box_types.contains(&type_name) {
            Some(FeederType::CableBox)
        } else {
            None
        }
    }
}
