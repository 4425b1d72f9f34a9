// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the configuration options for the `NetworkGraph`.

/// Configuration options for the `NetworkGraph`.
#[derive(Clone, Debug)]
pub struct NetworkGraphConfig {
    /// Whether references to absent objects (terminal to connectivity node,
    /// equipment to container, ...) should fail graph creation.  When this is
    /// `false`, such references are logged and treated as absent by every
    /// non-required lookup.
    pub strict_references: bool,

    /// The substation type that marks a pass-through point.  Equipment inside
    /// such a container is not considered to be inside a substation.
    pub t_junction_type: String,

    /// Substation types whose transformers feed as primary substations.
    pub primary_substation_types: Vec<String>,

    /// Substation types whose transformers feed as secondary substations.
    pub secondary_substation_types: Vec<String>,

    /// Substation types that are cable boxes.
    pub cable_box_types: Vec<String>,

    /// Number of feeder records at which an equipment is flagged as
    /// multi-fed.
    pub multifeed_record_threshold: usize,
}

impl Default for NetworkGraphConfig {
    fn default() -> Self {
        Self {
            strict_references: false,
            t_junction_type: String::from("T-Junction"),
            primary_substation_types: vec![String::from("PrimarySubstation")],
            secondary_substation_types: vec![String::from("SecondarySubstation")],
            cable_box_types: vec![String::from("CableBox")],
            multifeed_record_threshold: 3,
        }
    }
}
