// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains features
//! that are shared by all tests of the `graph` module.
//!
//! The `NetworkBuilder` can declaratively build network configurations, with
//! predictable ids, for use in tests.

use std::collections::HashMap;

use uuid::Uuid;

use crate::model::{
    ConductingEquipment, ConnectivityNode, EquipmentContainer, IdentifiedObject, NetworkObject,
    PowerTransformerEnd, Terminal,
};
use crate::{ContainerKind, EquipmentKind, Error, NetworkGraph, NetworkGraphConfig};

/// A builder for creating network configurations easily, for use in tests.
pub(crate) struct NetworkBuilder {
    objects: Vec<NetworkObject>,
    terminal_counts: HashMap<Uuid, u32>,
    next_id: u128,
}

impl NetworkBuilder {
    /// Creates a new `NetworkBuilder`.
    pub(crate) fn new() -> Self {
        NetworkBuilder {
            objects: Vec::new(),
            terminal_counts: HashMap::new(),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> Uuid {
        let id = Uuid::from_u128(self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds a connectivity node and returns its id.
    pub(crate) fn node(&mut self) -> Uuid {
        let id = self.next_id();
        self.objects
            .push(ConnectivityNode::new(IdentifiedObject::new(id)).into());
        id
    }

    /// Adds an equipment of the given kind, optionally inside a container, and
    /// returns its id.  It is named after its kind and id.
    pub(crate) fn equipment(&mut self, kind: EquipmentKind, container: Option<Uuid>) -> Uuid {
        let id = self.next_id();
        let mut equipment = ConductingEquipment::new(
            IdentifiedObject::named(id, format!("{kind}{}", id.as_u128())),
            kind,
        );
        equipment.container = container;
        self.objects.push(equipment.into());
        id
    }

    /// Adds a substation with the given name and PSR type.
    pub(crate) fn substation(&mut self, name: &str, psr_type: &str) -> Uuid {
        let id = self.next_id();
        let mut substation =
            EquipmentContainer::new(IdentifiedObject::named(id, name), ContainerKind::Substation);
        substation.psr_type = Some(psr_type.to_string());
        self.objects.push(substation.into());
        id
    }

    /// Adds a voltage level inside the given container.
    pub(crate) fn voltage_level(&mut self, parent: Uuid, voltage: f64) -> Uuid {
        let id = self.next_id();
        let mut voltage_level =
            EquipmentContainer::new(IdentifiedObject::new(id), ContainerKind::VoltageLevel);
        voltage_level.parent = Some(parent);
        voltage_level.nominal_voltage = Some(voltage);
        self.objects.push(voltage_level.into());
        id
    }

    /// Adds a bay inside the given container.
    pub(crate) fn bay(&mut self, parent: Uuid) -> Uuid {
        let id = self.next_id();
        let mut bay = EquipmentContainer::new(IdentifiedObject::new(id), ContainerKind::Bay);
        bay.parent = Some(parent);
        self.objects.push(bay.into());
        id
    }

    /// Adds a two winding power transformer between the given nodes.
    pub(crate) fn transformer(
        &mut self,
        container: Option<Uuid>,
        hv_node: Uuid,
        lv_node: Uuid,
        hv_voltage: f64,
        lv_voltage: f64,
    ) -> Uuid {
        let transformer = self.equipment(EquipmentKind::PowerTransformer, container);
        let terminals = self.connect(transformer, &[hv_node, lv_node]);
        for (end_number, (terminal, rated_u)) in
            terminals.into_iter().zip([hv_voltage, lv_voltage]).enumerate()
        {
            let id = self.next_id();
            self.objects.push(
                PowerTransformerEnd {
                    identity: IdentifiedObject::new(id),
                    power_transformer: transformer,
                    terminal: Some(terminal),
                    end_number: end_number as u32 + 1,
                    rated_u: Some(rated_u),
                }
                .into(),
            );
        }
        transformer
    }

    /// Connects the equipment to the given nodes, adding one terminal per
    /// node, and returns the terminal ids.
    pub(crate) fn connect(&mut self, equipment: Uuid, nodes: &[Uuid]) -> Vec<Uuid> {
        let mut terminals = vec![];
        for node in nodes {
            let id = self.next_id();
            let count = self.terminal_counts.entry(equipment).or_insert(0);
            *count += 1;
            self.objects.push(
                Terminal::new(IdentifiedObject::new(id), equipment, Some(*node), *count).into(),
            );
            terminals.push(id);
        }
        terminals
    }

    /// Sets the nominal voltage of an equipment.
    pub(crate) fn set_voltage(&mut self, id: Uuid, voltage: f64) -> &mut Self {
        if let Some(NetworkObject::ConductingEquipment(e)) =
            self.objects.iter_mut().find(|o| o.mrid() == id)
        {
            e.nominal_voltage = Some(voltage);
        }
        self
    }

    /// Marks a switch as normally open.
    pub(crate) fn open(&mut self, id: Uuid) -> &mut Self {
        if let Some(NetworkObject::ConductingEquipment(e)) =
            self.objects.iter_mut().find(|o| o.mrid() == id)
        {
            e.normally_open = true;
        }
        self
    }

    /// Returns the objects added so far.
    pub(crate) fn objects(&self) -> Vec<NetworkObject> {
        self.objects.clone()
    }

    /// Builds and returns the network graph with the default configuration.
    pub(crate) fn build(&self) -> Result<NetworkGraph, Error> {
        self.build_with(NetworkGraphConfig::default())
    }

    /// Builds and returns the network graph with the given configuration.
    pub(crate) fn build_with(&self, config: NetworkGraphConfig) -> Result<NetworkGraph, Error> {
        NetworkGraph::try_new(self.objects.clone(), config)
    }
}
