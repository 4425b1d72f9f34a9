// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for validating a [`NetworkGraph`].

use uuid::Uuid;

use crate::model::NetworkObject;
use crate::{Error, NetworkGraph};

impl NetworkGraph {
    pub(super) fn validate(&self) -> Result<(), Error> {
        self.validate_container_hierarchy()?;
        self.validate_terminal_wiring()?;
        Ok(())
    }

    /// Validates that the container hierarchy is a tree.
    ///
    /// If a cycle is detected, an error is returned, that lists the containers
    /// in the cycle.
    fn validate_container_hierarchy(&self) -> Result<(), Error> {
        for container in self.objects.iter().filter_map(|o| match o {
            NetworkObject::EquipmentContainer(c) => Some(c),
            _ => None,
        }) {
            let mut ancestors: Vec<Uuid> = vec![container.identity.mrid];
            let mut current = container.parent;
            while let Some(parent) = current {
                if let Some(first_occurrence) = ancestors.iter().position(|id| *id == parent) {
                    return Err(Error::invalid_graph(format!(
                        "Container cycle detected: {} -> {}",
                        ancestors[first_occurrence..]
                            .iter()
                            .map(|x| x.to_string())
                            .collect::<Vec<_>>()
                            .join(" -> "),
                        parent
                    )));
                }
                ancestors.push(parent);
                current = match self.find_object(parent) {
                    Some(NetworkObject::EquipmentContainer(c)) => c.parent,
                    _ => None,
                };
            }
        }
        Ok(())
    }

    /// Validates that every topology edge agrees with the terminal it stands
    /// for.
    fn validate_terminal_wiring(&self) -> Result<(), Error> {
        for (terminal_id, edge) in &self.terminal_edges {
            let terminal = self.get_by_id::<crate::model::Terminal>(*terminal_id)?;
            let Some((a, b)) = self.topology.edge_endpoints(*edge) else {
                return Err(Error::internal(format!(
                    "Edge of terminal {terminal_id} is missing."
                )));
            };
            let ends = [self.topology[a], self.topology[b]];
            let node_matches = terminal
                .connectivity_node
                .is_some_and(|n| ends.contains(&n));
            if !ends.contains(&terminal.equipment) || !node_matches {
                return Err(Error::internal(format!(
                    "Terminal {terminal_id} is not wired consistently."
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::test_utils::NetworkBuilder;
    use crate::model::{EquipmentContainer, IdentifiedObject, NetworkObject};
    use crate::{ContainerKind, Error, NetworkGraph, NetworkGraphConfig};
    use uuid::Uuid;

    #[test]
    fn test_container_cycle() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let c = Uuid::from_u128(3);
        let container = |id: Uuid, parent: Uuid| -> NetworkObject {
            let mut x = EquipmentContainer::new(IdentifiedObject::new(id), ContainerKind::Bay);
            x.parent = Some(parent);
            x.into()
        };

        assert!(NetworkGraph::try_new(
            vec![container(a, b), container(b, a)],
            NetworkGraphConfig::default()
        )
        .is_err_and(|e| e == Error::invalid_graph(format!("Container cycle detected: {a} -> {b} -> {a}"))));

        assert!(NetworkGraph::try_new(
            vec![container(a, b), container(b, c), container(c, b)],
            NetworkGraphConfig::default()
        )
        .is_err_and(|e| e == Error::invalid_graph(format!("Container cycle detected: {b} -> {c} -> {b}"))));
    }

    #[test]
    fn test_valid_hierarchy() -> Result<(), Error> {
        let mut builder = NetworkBuilder::new();
        let substation = builder.substation("A", "PrimarySubstation");
        let voltage_level = builder.voltage_level(substation, 10_000.0);
        builder.bay(voltage_level);
        builder.build()?;
        Ok(())
    }
}
