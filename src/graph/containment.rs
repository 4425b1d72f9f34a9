// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for resolving the container hierarchy of a [`NetworkGraph`].

use uuid::Uuid;

use crate::model::{EquipmentContainer, NetworkObject};
use crate::{ContainerKind, Error, NetworkGraph};

/// Container hierarchy lookups.
impl NetworkGraph {
    /// Returns the container directly holding the given object.
    ///
    /// For equipment that is its container, for containers their parent, and
    /// for terminals the container of their equipment.  Dangling references
    /// resolve to `None`.
    pub fn container_of(&self, mrid: Uuid) -> Option<&EquipmentContainer> {
        let container = match self.find_object(mrid)? {
            NetworkObject::ConductingEquipment(e) => e.container?,
            NetworkObject::EquipmentContainer(c) => c.parent?,
            NetworkObject::Terminal(t) => return self.container_of(t.equipment),
            _ => return None,
        };
        self.get_by_id::<EquipmentContainer>(container).ok()
    }

    /// Returns the containers of an object from the innermost outwards.  A
    /// container is not part of its own chain.
    pub fn container_chain(&self, mrid: Uuid) -> Vec<&EquipmentContainer> {
        let mut chain: Vec<&EquipmentContainer> = Vec::new();
        let mut current = self.container_of(mrid);
        while let Some(container) = current {
            if chain
                .iter()
                .any(|c| c.identity.mrid == container.identity.mrid)
            {
                break;
            }
            chain.push(container);
            current = self.container_of(container.identity.mrid);
        }
        chain
    }

    /// Returns the substation (or enclosure) transitively containing the given
    /// object.
    ///
    /// A substation resolves to itself.  A connectivity node resolves through
    /// its neighbor equipment: the substation of the first neighbor that has
    /// one.
    ///
    /// When `required` is `false`, `Ok(None)` is returned if nothing resolves,
    /// otherwise a `NotFound` error.
    pub fn substation_of(
        &self,
        mrid: Uuid,
        required: bool,
    ) -> Result<Option<&EquipmentContainer>, Error> {
        let substation = self.resolve_substation(mrid);
        if substation.is_none() && required {
            return Err(Error::not_found(format!(
                "No substation found for object {mrid}."
            )));
        }
        Ok(substation)
    }

    fn resolve_substation(&self, mrid: Uuid) -> Option<&EquipmentContainer> {
        match self.find_object(mrid)? {
            NetworkObject::EquipmentContainer(c) if c.is_substation_like() => Some(c),
            NetworkObject::ConnectivityNode(_) => self
                .neighbors(mrid)
                .ok()?
                .find_map(|e| self.resolve_substation(e.identity.mrid)),
            _ => self
                .container_chain(mrid)
                .into_iter()
                .find(|c| c.is_substation_like()),
        }
    }

    /// Returns the nearest bay containing the given object.
    pub fn bay_of(&self, mrid: Uuid) -> Option<&EquipmentContainer> {
        if let Some(NetworkObject::EquipmentContainer(c)) = self.find_object(mrid) {
            if c.kind == ContainerKind::Bay {
                return Some(c);
            }
        }
        self.container_chain(mrid)
            .into_iter()
            .find(|c| c.kind == ContainerKind::Bay)
    }

    /// Returns the nominal voltage of the given equipment.
    ///
    /// Equipment without an own voltage inherits it from the first container
    /// up its chain that has one.
    pub fn voltage_of(&self, mrid: Uuid) -> Option<f64> {
        let own = self
            .find_object(mrid)
            .and_then(NetworkObject::as_equipment)
            .and_then(|e| e.nominal_voltage);
        own.or_else(|| {
            self.container_chain(mrid)
                .into_iter()
                .find_map(|c| c.nominal_voltage)
        })
    }

    /// Returns the equipment and containers held directly by a container, in
    /// insertion order.
    pub fn children_of(&self, container: Uuid) -> Vec<&NetworkObject> {
        self.children
            .get(&container)
            .into_iter()
            .flatten()
            .filter_map(|id| self.find_object(*id))
            .collect()
    }

    /// Returns the substation of an object, ignoring T-junctions.
    pub(crate) fn enclosing_substation(&self, mrid: Uuid) -> Option<&EquipmentContainer> {
        self.container_chain(mrid)
            .into_iter()
            .find(|c| c.is_substation_like() && !self.is_t_junction(c))
    }

    /// Returns the substation of a connectivity node through its neighbors,
    /// ignoring T-junctions.
    pub(crate) fn enclosing_substation_of_node(&self, mrid: Uuid) -> Option<&EquipmentContainer> {
        self.neighbors(mrid)
            .ok()?
            .find_map(|e| self.enclosing_substation(e.identity.mrid))
    }

    pub(crate) fn is_t_junction(&self, container: &EquipmentContainer) -> bool {
        container.type_name() == self.config.t_junction_type
    }
}
