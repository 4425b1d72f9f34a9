// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Feeders: the sources supplying each equipment, and their flattened report.

pub(super) mod analyzer;
pub(super) mod tracer;

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use uuid::Uuid;

use crate::model::ConductingEquipment;

/// The kind of source a feeder was traced from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FeederType {
    PrimarySubstation,
    SecondarySubstation,
    NetworkInjection,
    CableBox,
}

/// Where a feeder enters the network.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionPoint {
    pub substation: Option<Uuid>,
    pub bay: Option<Uuid>,
    pub power_transformer: Option<Uuid>,
    pub network_injection: Option<Uuid>,
}

/// One source reaching one equipment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feeder {
    pub feeder_type: FeederType,
    pub connection_point: ConnectionPoint,
    /// Equipment hops from the source to the fed equipment.
    pub hops: usize,
    /// The equipment on the way, starting with the source and ending with
    /// the fed equipment.
    pub path: Vec<Uuid>,
}

impl Feeder {
    /// Returns true if this feeder is the given transformer feeding itself.
    pub fn is_self_feed(&self, transformer: Uuid) -> bool {
        self.connection_point.power_transformer == Some(transformer)
    }
}

/// The feeders reaching each equipment, keyed by equipment `mRID`.
pub type FeederMap = HashMap<Uuid, Vec<Feeder>>;

/// One row per equipment and feeder.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase", tag = "$type")]
pub struct FlatFeederInfo {
    pub equipment_id: Uuid,
    pub equipment_class: String,
    pub equipment_voltage: Option<f64>,
    pub primary_substation_id: Option<Uuid>,
    pub primary_bay_id: Option<Uuid>,
    pub primary_transformer_id: Option<Uuid>,
    pub secondary_substation_id: Option<Uuid>,
    pub secondary_bay_id: Option<Uuid>,
    pub secondary_transformer_id: Option<Uuid>,
    pub hops: Option<usize>,
    pub network_injection_id: Option<Uuid>,
    pub nofeed: bool,
    pub multifeed: bool,
    pub multifeed_allowed: bool,
}

impl FlatFeederInfo {
    fn new(equipment: &ConductingEquipment, voltage: Option<f64>) -> Self {
        Self {
            equipment_id: equipment.identity.mrid,
            equipment_class: equipment.kind.to_string(),
            equipment_voltage: voltage,
            ..Default::default()
        }
    }

    fn with_primary(mut self, point: &ConnectionPoint) -> Self {
        self.primary_substation_id = point.substation;
        self.primary_bay_id = point.bay;
        self.primary_transformer_id = point.power_transformer;
        self
    }

    fn with_secondary(mut self, point: &ConnectionPoint) -> Self {
        self.secondary_substation_id = point.substation;
        self.secondary_bay_id = point.bay;
        self.secondary_transformer_id = point.power_transformer;
        self
    }
}

/// The result of a feeder analysis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeederReport {
    pub records: Vec<FlatFeederInfo>,
    /// Cables on the shared tap of a consumer whose multi-feed flag was
    /// suppressed.  They should be treated as single-fed when cross-checking.
    pub single_feed_cables: BTreeSet<Uuid>,
}

impl FeederReport {
    /// Returns the records of the given equipment.
    pub fn records_of(&self, equipment: Uuid) -> impl Iterator<Item = &FlatFeederInfo> {
        self.records
            .iter()
            .filter(move |r| r.equipment_id == equipment)
    }
}
