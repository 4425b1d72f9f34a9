// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Flattens traced feeders into [`FlatFeederInfo`] records and flags unfed
//! and multi-fed equipment.

use std::collections::HashSet;

use uuid::Uuid;

use crate::equipment_kind::KindPredicates;
use crate::model::ConductingEquipment;
use crate::{Error, NetworkGraph};

use super::{Feeder, FeederMap, FeederReport, FeederType, FlatFeederInfo};

pub(crate) struct FeederAnalyzer<'a> {
    graph: &'a NetworkGraph,
    feeders: &'a FeederMap,
}

impl<'a> FeederAnalyzer<'a> {
    pub(crate) fn new(graph: &'a NetworkGraph, feeders: &'a FeederMap) -> Self {
        Self { graph, feeders }
    }

    pub(crate) fn analyze(&self) -> Result<FeederReport, Error> {
        let mut report = FeederReport::default();

        for equipment in self.graph.equipment() {
            let voltage = self.graph.voltage_of(equipment.identity.mrid);
            let feeders = self
                .feeders
                .get(&equipment.identity.mrid)
                .filter(|f| !f.is_empty());

            let Some(feeders) = feeders else {
                report.records.push(FlatFeederInfo {
                    nofeed: true,
                    ..FlatFeederInfo::new(equipment, voltage)
                });
                continue;
            };

            let mut records = self.records_for(equipment, voltage, feeders);
            if records.is_empty() {
                report.records.push(FlatFeederInfo {
                    nofeed: true,
                    ..FlatFeederInfo::new(equipment, voltage)
                });
                continue;
            }

            let over_threshold = records.len() >= self.graph.config().multifeed_record_threshold;
            let secondaries: HashSet<Uuid> = records
                .iter()
                .filter_map(|r| r.secondary_transformer_id)
                .collect();
            let shared_tap = if over_threshold || secondaries.len() > 1 {
                self.shared_tap_cables(equipment)?
            } else {
                None
            };
            match shared_tap {
                Some(cables) => {
                    tracing::debug!(
                        "Consumer {} is on a shared tap of {} cables, not multi-fed.",
                        equipment.identity.mrid,
                        cables.len()
                    );
                    report.single_feed_cables.extend(cables);
                    records.iter_mut().for_each(|r| r.multifeed_allowed = true);
                }
                None if over_threshold => records.iter_mut().for_each(|r| r.multifeed = true),
                None => {}
            }
            report.records.extend(records);
        }

        tracing::info!(
            "Feeder analysis produced {} records, {} without feed, {} multi-fed.",
            report.records.len(),
            report.records.iter().filter(|r| r.nofeed).count(),
            report.records.iter().filter(|r| r.multifeed).count()
        );
        Ok(report)
    }

    fn records_for(
        &self,
        equipment: &ConductingEquipment,
        voltage: Option<f64>,
        feeders: &[Feeder],
    ) -> Vec<FlatFeederInfo> {
        let mut records = vec![];
        let of_type = |feeder_type: FeederType| {
            feeders
                .iter()
                .filter(move |f| f.feeder_type == feeder_type)
        };

        for secondary in of_type(FeederType::SecondarySubstation) {
            let Some(transformer) = secondary.connection_point.power_transformer else {
                continue;
            };
            let record = FlatFeederInfo {
                hops: Some(secondary.hops),
                ..FlatFeederInfo::new(equipment, voltage)
            }
            .with_secondary(&secondary.connection_point);

            let primaries: Vec<&Feeder> = self
                .upstream_feeders(transformer)
                .filter(|f| f.feeder_type == FeederType::PrimarySubstation)
                .collect();
            if primaries.is_empty() {
                records.push(record);
            } else {
                for primary in primaries {
                    records.push(record.clone().with_primary(&primary.connection_point));
                }
            }
        }

        for primary in of_type(FeederType::PrimarySubstation) {
            let Some(transformer) = primary.connection_point.power_transformer else {
                continue;
            };
            let upstream: Vec<&Feeder> = self.upstream_feeders(transformer).collect();
            let network_injection_id = match upstream.as_slice() {
                [only] if only.feeder_type == FeederType::NetworkInjection => {
                    only.connection_point.network_injection
                }
                _ => None,
            };
            records.push(
                FlatFeederInfo {
                    hops: Some(primary.hops),
                    network_injection_id,
                    ..FlatFeederInfo::new(equipment, voltage)
                }
                .with_primary(&primary.connection_point),
            );
        }

        for injection in of_type(FeederType::NetworkInjection) {
            records.push(FlatFeederInfo {
                hops: Some(injection.hops),
                network_injection_id: injection.connection_point.network_injection,
                ..FlatFeederInfo::new(equipment, voltage)
            });
        }

        records
    }

    /// Returns the feeders of a transformer coming from other sources.
    fn upstream_feeders(&self, transformer: Uuid) -> impl Iterator<Item = &'a Feeder> {
        let feeders = self.feeders;
        feeders
            .get(&transformer)
            .into_iter()
            .flatten()
            .filter(move |f| !f.is_self_feed(transformer))
    }

    /// Returns the cables of a consumer's shared tap: the consumer is
    /// connected through exactly one terminal, whose connectivity node has
    /// more than one cable neighbor.
    fn shared_tap_cables(&self, equipment: &ConductingEquipment) -> Result<Option<Vec<Uuid>>, Error> {
        if !equipment.is_energy_consumer() {
            return Ok(None);
        }
        let nodes: Vec<Uuid> = self
            .graph
            .terminals_of(equipment.identity.mrid)?
            .into_iter()
            .filter_map(|t| self.graph.connectivity_node_of(t))
            .map(|n| n.identity.mrid)
            .collect();
        let [node] = nodes.as_slice() else {
            return Ok(None);
        };

        let cables: Vec<Uuid> = self
            .graph
            .neighbors(*node)?
            .filter(|e| e.is_cable())
            .map(|e| e.identity.mrid)
            .collect();
        Ok((cables.len() > 1).then_some(cables))
    }
}
