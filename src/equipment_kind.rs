// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `EquipmentKind` and `ContainerKind` enums, which
//! represent the closed set of equipment and container types in a network.

use crate::model::{ConductingEquipment, EquipmentContainer};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Represents the kind of a piece of conducting equipment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentKind {
    AcLineSegment,
    Breaker,
    BusbarSection,
    Disconnector,
    EnergyConsumer,
    ExternalNetworkInjection,
    Fuse,
    LoadBreakSwitch,
    PowerTransformer,
}

impl EquipmentKind {
    /// Returns true for equipment that can open the circuit.
    pub fn is_switch(&self) -> bool {
        matches!(
            self,
            EquipmentKind::Breaker
                | EquipmentKind::Disconnector
                | EquipmentKind::Fuse
                | EquipmentKind::LoadBreakSwitch
        )
    }
}

impl Display for EquipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EquipmentKind::AcLineSegment => write!(f, "ACLineSegment"),
            EquipmentKind::Breaker => write!(f, "Breaker"),
            EquipmentKind::BusbarSection => write!(f, "BusbarSection"),
            EquipmentKind::Disconnector => write!(f, "Disconnector"),
            EquipmentKind::EnergyConsumer => write!(f, "EnergyConsumer"),
            EquipmentKind::ExternalNetworkInjection => write!(f, "ExternalNetworkInjection"),
            EquipmentKind::Fuse => write!(f, "Fuse"),
            EquipmentKind::LoadBreakSwitch => write!(f, "LoadBreakSwitch"),
            EquipmentKind::PowerTransformer => write!(f, "PowerTransformer"),
        }
    }
}

/// Represents the kind of an equipment container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    Substation,
    VoltageLevel,
    Bay,
    Enclosure,
}

impl Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerKind::Substation => write!(f, "Substation"),
            ContainerKind::VoltageLevel => write!(f, "VoltageLevel"),
            ContainerKind::Bay => write!(f, "Bay"),
            ContainerKind::Enclosure => write!(f, "Enclosure"),
        }
    }
}

/// Predicates for checking the kind of a `ConductingEquipment`.
pub(crate) trait KindPredicates {
    fn kind(&self) -> EquipmentKind;

    fn is_cable(&self) -> bool {
        self.kind() == EquipmentKind::AcLineSegment
    }

    fn is_breaker(&self) -> bool {
        self.kind() == EquipmentKind::Breaker
    }

    fn is_busbar(&self) -> bool {
        self.kind() == EquipmentKind::BusbarSection
    }

    fn is_energy_consumer(&self) -> bool {
        self.kind() == EquipmentKind::EnergyConsumer
    }

    fn is_network_injection(&self) -> bool {
        self.kind() == EquipmentKind::ExternalNetworkInjection
    }

    fn is_power_transformer(&self) -> bool {
        self.kind() == EquipmentKind::PowerTransformer
    }

    fn is_switch(&self) -> bool {
        self.kind().is_switch()
    }
}

impl KindPredicates for ConductingEquipment {
    fn kind(&self) -> EquipmentKind {
        self.kind
    }
}

impl ConductingEquipment {
    /// Returns true if the equipment is a switch in its normally open
    /// position.
    pub fn is_open_switch(&self) -> bool {
        self.kind.is_switch() && self.normally_open
    }
}

impl EquipmentContainer {
    /// Returns true for containers that can be line endpoints, i.e.
    /// substations and enclosures.
    pub fn is_substation_like(&self) -> bool {
        matches!(self.kind, ContainerKind::Substation | ContainerKind::Enclosure)
    }

    /// Returns the type name used to classify the container: its PSR type if
    /// one is set, the container kind otherwise.
    pub fn type_name(&self) -> String {
        match &self.psr_type {
            Some(psr_type) if !psr_type.is_empty() => psr_type.clone(),
            _ => self.kind.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IdentifiedObject;
    use uuid::Uuid;

    #[test]
    fn test_switch_state() {
        let mut breaker = ConductingEquipment::new(
            IdentifiedObject::new(Uuid::from_u128(1)),
            EquipmentKind::Breaker,
        );
        assert!(breaker.is_switch());
        assert!(!breaker.is_open_switch());
        breaker.normally_open = true;
        assert!(breaker.is_open_switch());

        let mut cable = ConductingEquipment::new(
            IdentifiedObject::new(Uuid::from_u128(2)),
            EquipmentKind::AcLineSegment,
        );
        cable.normally_open = true;
        assert!(cable.is_cable());
        assert!(!cable.is_open_switch());
    }

    #[test]
    fn test_container_type_name() {
        let mut substation = EquipmentContainer::new(
            IdentifiedObject::new(Uuid::from_u128(1)),
            ContainerKind::Substation,
        );
        assert_eq!(substation.type_name(), "Substation");
        substation.psr_type = Some(String::from("T-Junction"));
        assert_eq!(substation.type_name(), "T-Junction");
        assert!(substation.is_substation_like());

        let bay = EquipmentContainer::new(IdentifiedObject::new(Uuid::from_u128(2)), ContainerKind::Bay);
        assert!(!bay.is_substation_like());
        assert_eq!(EquipmentKind::AcLineSegment.to_string(), "ACLineSegment");
    }
}
