// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The typed objects that make up a physical network model.
//!
//! Every object carries an [`IdentifiedObject`] with its globally unique
//! `mRID`.  Relations between objects are stored as `mRID` references, and
//! resolved by the [`NetworkGraph`][crate::NetworkGraph].

use crate::{ContainerKind, EquipmentKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The attributes shared by every object in the network model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedObject {
    /// The globally unique id of the object.
    #[serde(rename = "mRID")]
    pub mrid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Position of the object as `[x, y]` pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Vec<[f64; 2]>>,
}

impl IdentifiedObject {
    /// Creates an identity with only an `mRID`.
    pub fn new(mrid: Uuid) -> Self {
        Self {
            mrid,
            name: None,
            description: None,
            coordinates: None,
        }
    }

    /// Creates an identity with an `mRID` and a name.
    pub fn named(mrid: Uuid, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(mrid)
        }
    }
}

/// A physical apparatus: cable segment, switch, transformer, busbar, ...
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConductingEquipment {
    #[serde(flatten)]
    pub identity: IdentifiedObject,
    /// What the equipment is, e.g. a breaker.
    pub kind: EquipmentKind,
    /// Nominal voltage in volts.  When unset, it is inherited from the
    /// containers, see [`NetworkGraph::voltage_of`][crate::NetworkGraph::voltage_of].
    #[serde(default)]
    pub nominal_voltage: Option<f64>,
    /// The `mRID` of the directly containing container, usually a bay.
    #[serde(default)]
    pub container: Option<Uuid>,
    /// Only meaningful for switches.
    #[serde(default)]
    pub normally_open: bool,
}

impl ConductingEquipment {
    /// Creates closed, uncontained equipment without a nominal voltage.
    pub fn new(identity: IdentifiedObject, kind: EquipmentKind) -> Self {
        Self {
            identity,
            kind,
            nominal_voltage: None,
            container: None,
            normally_open: false,
        }
    }
}

/// A zero-impedance junction joining the terminals of different equipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityNode {
    #[serde(flatten)]
    pub identity: IdentifiedObject,
}

impl ConnectivityNode {
    /// Creates a connectivity node.
    pub fn new(identity: IdentifiedObject) -> Self {
        Self { identity }
    }
}

/// The connection point between one equipment and at most one connectivity
/// node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    #[serde(flatten)]
    pub identity: IdentifiedObject,
    /// The `mRID` of the equipment owning the terminal.
    pub equipment: Uuid,
    /// The `mRID` of the connected node, `None` when disconnected.
    #[serde(default)]
    pub connectivity_node: Option<Uuid>,
    /// Orders the terminals of one equipment, starting at 1.
    pub sequence_number: u32,
}

impl Terminal {
    /// Creates a terminal of the given equipment.
    pub fn new(
        identity: IdentifiedObject,
        equipment: Uuid,
        connectivity_node: Option<Uuid>,
        sequence_number: u32,
    ) -> Self {
        Self {
            identity,
            equipment,
            connectivity_node,
            sequence_number,
        }
    }
}

/// A containment grouping: substation, voltage level, bay or enclosure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquipmentContainer {
    #[serde(flatten)]
    pub identity: IdentifiedObject,
    /// What the container is, e.g. a bay.
    pub kind: ContainerKind,
    /// The finer classification of substations, e.g. `PrimarySubstation`,
    /// `Tower` or `T-Junction`.
    #[serde(default)]
    pub psr_type: Option<String>,
    /// The `mRID` of the enclosing container.
    #[serde(default)]
    pub parent: Option<Uuid>,
    /// Nominal voltage in volts, inherited by contained equipment.
    #[serde(default)]
    pub nominal_voltage: Option<f64>,
}

impl EquipmentContainer {
    /// Creates a top-level container without a PSR type or voltage.
    pub fn new(identity: IdentifiedObject, kind: ContainerKind) -> Self {
        Self {
            identity,
            kind,
            psr_type: None,
            parent: None,
            nominal_voltage: None,
        }
    }
}

/// One winding of a power transformer, attached through one of its
/// terminals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerTransformerEnd {
    #[serde(flatten)]
    pub identity: IdentifiedObject,
    /// The `mRID` of the transformer this winding belongs to.
    pub power_transformer: Uuid,
    /// The `mRID` of the transformer terminal of this winding.
    #[serde(default)]
    pub terminal: Option<Uuid>,
    /// Winding number, starting at 1.
    pub end_number: u32,
    /// Rated voltage in volts.
    #[serde(default)]
    pub rated_u: Option<f64>,
}

/// Any object that can be stored in a [`NetworkGraph`][crate::NetworkGraph].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum NetworkObject {
    ConductingEquipment(ConductingEquipment),
    ConnectivityNode(ConnectivityNode),
    Terminal(Terminal),
    EquipmentContainer(EquipmentContainer),
    PowerTransformerEnd(PowerTransformerEnd),
}

impl NetworkObject {
    /// Returns the identity of the object.
    pub fn identity(&self) -> &IdentifiedObject {
        match self {
            NetworkObject::ConductingEquipment(x) => &x.identity,
            NetworkObject::ConnectivityNode(x) => &x.identity,
            NetworkObject::Terminal(x) => &x.identity,
            NetworkObject::EquipmentContainer(x) => &x.identity,
            NetworkObject::PowerTransformerEnd(x) => &x.identity,
        }
    }

    /// Returns the `mRID` of the object.
    pub fn mrid(&self) -> Uuid {
        self.identity().mrid
    }

    /// Returns the concrete class of the object, e.g. `Breaker` for a breaker
    /// or `Bay` for a bay.
    pub fn class_name(&self) -> String {
        match self {
            NetworkObject::ConductingEquipment(x) => x.kind.to_string(),
            NetworkObject::ConnectivityNode(_) => String::from("ConnectivityNode"),
            NetworkObject::Terminal(_) => String::from("Terminal"),
            NetworkObject::EquipmentContainer(x) => x.kind.to_string(),
            NetworkObject::PowerTransformerEnd(_) => String::from("PowerTransformerEnd"),
        }
    }

    /// Returns the object as equipment, if it is one.
    pub fn as_equipment(&self) -> Option<&ConductingEquipment> {
        match self {
            NetworkObject::ConductingEquipment(x) => Some(x),
            _ => None,
        }
    }

    /// Returns the object as a connectivity node, if it is one.
    pub fn as_connectivity_node(&self) -> Option<&ConnectivityNode> {
        match self {
            NetworkObject::ConnectivityNode(x) => Some(x),
            _ => None,
        }
    }
}

impl From<ConductingEquipment> for NetworkObject {
    fn from(value: ConductingEquipment) -> Self {
        NetworkObject::ConductingEquipment(value)
    }
}

impl From<ConnectivityNode> for NetworkObject {
    fn from(value: ConnectivityNode) -> Self {
        NetworkObject::ConnectivityNode(value)
    }
}

impl From<Terminal> for NetworkObject {
    fn from(value: Terminal) -> Self {
        NetworkObject::Terminal(value)
    }
}

impl From<EquipmentContainer> for NetworkObject {
    fn from(value: EquipmentContainer) -> Self {
        NetworkObject::EquipmentContainer(value)
    }
}

impl From<PowerTransformerEnd> for NetworkObject {
    fn from(value: PowerTransformerEnd) -> Self {
        NetworkObject::PowerTransformerEnd(value)
    }
}
