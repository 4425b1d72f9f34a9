// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the generic depth-first traversal over the network
//! topology.

use uuid::Uuid;

use crate::iterators::Traversal;
use crate::model::{ConductingEquipment, ConnectivityNode, NetworkObject};
use crate::{Error, NetworkGraph};

/// Traversal methods.
impl NetworkGraph {
    /// Walks the topology depth-first from `start`, annotating every object
    /// with its hop distance and the object it was reached from.
    ///
    /// Equipment for which `equipment_stop` returns `true`, and connectivity
    /// nodes for which `node_stop` returns `true`, are not expanded.  They are
    /// produced only when `include_boundary` is `true`.  The start object is
    /// always produced and expanded.
    ///
    /// Each call starts with a fresh visited set, so the walk terminates on
    /// rings and never produces an object twice.
    pub fn traverse_with_hops<'a, FE, FN>(
        &'a self,
        start: Uuid,
        equipment_stop: FE,
        node_stop: FN,
        include_boundary: bool,
    ) -> Result<Traversal<'a, FE, FN>, Error>
    where
        FE: FnMut(&ConductingEquipment) -> bool,
        FN: FnMut(&ConnectivityNode) -> bool,
    {
        let start = self.topology_index(start)?;
        Ok(Traversal::new(
            self,
            start,
            equipment_stop,
            node_stop,
            include_boundary,
        ))
    }

    /// Same as [`traverse_with_hops`][Self::traverse_with_hops], producing
    /// only the objects.
    pub fn traverse<'a, FE, FN>(
        &'a self,
        start: Uuid,
        equipment_stop: FE,
        node_stop: FN,
        include_boundary: bool,
    ) -> Result<impl Iterator<Item = &'a NetworkObject> + 'a, Error>
    where
        FE: FnMut(&ConductingEquipment) -> bool + 'a,
        FN: FnMut(&ConnectivityNode) -> bool + 'a,
    {
        Ok(self
            .traverse_with_hops(start, equipment_stop, node_stop, include_boundary)?
            .map(|step| step.object))
    }

    /// Returns the hop distance at which an unrestricted traversal from
    /// `from` reaches `to`, or `None` if `to` is not connected to `from`.
    pub fn hops_between(&self, from: Uuid, to: Uuid) -> Result<Option<usize>, Error> {
        self.topology_index(to)?;
        Ok(self
            .traverse_with_hops(from, |_| false, |_| false, true)?
            .find(|step| step.object.mrid() == to)
            .map(|step| step.hops))
    }

    /// Finds the first equipment satisfying the given predicate, walking
    /// through closed switches only.
    pub fn find_equipment(
        &self,
        from: Uuid,
        mut pred: impl FnMut(&ConductingEquipment) -> bool,
    ) -> Result<Option<&ConductingEquipment>, Error> {
        Ok(self
            .traverse(from, |e| e.is_open_switch(), |_| false, false)?
            .filter_map(NetworkObject::as_equipment)
            .find(|e| e.identity.mrid != from && pred(e)))
    }
}
