// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Detection of lines: runs of cable outside substations that connect exactly
//! two substations.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::equipment_kind::KindPredicates;
use crate::model::{EquipmentContainer, NetworkObject};
use crate::{Error, NetworkGraph};

/// A cable segment of a [`SimpleLine`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineSegment {
    pub equipment_id: Uuid,
    /// 1-based position, counted from the `from` end.
    pub order: usize,
    pub is_first: bool,
}

/// A line between two substations.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase", tag = "$type")]
pub struct SimpleLine {
    #[serde(rename = "mRID")]
    pub mrid: Uuid,
    pub name: String,
    pub from_substation: Uuid,
    pub from_bay: Option<Uuid>,
    pub to_substation: Uuid,
    pub to_bay: Option<Uuid>,
    pub children: Vec<LineSegment>,
}

/// A boundary object where a traced cable run enters a substation.
struct LineEndpoint<'a> {
    boundary: Uuid,
    substation: &'a EquipmentContainer,
    bay: Option<Uuid>,
}

impl LineEndpoint<'_> {
    fn name(&self) -> &str {
        self.substation.identity.name.as_deref().unwrap_or_default()
    }
}

pub(super) struct LineDetector<'a> {
    graph: &'a NetworkGraph,
    processed: HashSet<Uuid>,
}

impl<'a> LineDetector<'a> {
    pub(super) fn new(graph: &'a NetworkGraph) -> Self {
        Self {
            graph,
            processed: HashSet::new(),
        }
    }

    pub(super) fn detect(mut self) -> Result<Vec<SimpleLine>, Error> {
        let graph = self.graph;
        let cables: Vec<Uuid> = graph
            .equipment()
            .filter(|e| e.is_cable() && graph.enclosing_substation(e.identity.mrid).is_none())
            .map(|e| e.identity.mrid)
            .collect();

        let mut lines = vec![];
        for cable in cables {
            if self.processed.contains(&cable) {
                continue;
            }
            if let Some(line) = self.detect_from(cable)? {
                lines.push(line);
            }
        }

        tracing::info!("Detected {} lines.", lines.len());
        Ok(lines)
    }

    fn detect_from(&mut self, cable: Uuid) -> Result<Option<SimpleLine>, Error> {
        let graph = self.graph;
        let discovered: Vec<&NetworkObject> = graph
            .traverse(
                cable,
                move |e| graph.enclosing_substation(e.identity.mrid).is_some(),
                move |n| graph.enclosing_substation_of_node(n.identity.mrid).is_some(),
                true,
            )?
            .collect();

        let mut endpoints = vec![];
        for object in &discovered {
            self.processed.insert(object.mrid());
            if let Some(endpoint) = self.endpoint(object) {
                endpoints.push(endpoint);
            }
        }

        let [first, second]: [LineEndpoint; 2] = match endpoints.try_into() {
            Ok(pair) => pair,
            Err(endpoints) => {
                tracing::debug!(
                    "Cable run starting at {} reaches {} substations, not a line.",
                    cable,
                    endpoints.len()
                );
                return Ok(None);
            }
        };

        let (from, to) = if should_swap(
            (first.name(), first.substation.type_name().as_str()),
            (second.name(), second.substation.type_name().as_str()),
        ) {
            (second, first)
        } else {
            (first, second)
        };

        let discovered: HashSet<Uuid> = discovered.iter().map(|o| o.mrid()).collect();
        let children = self.ordered_segments(&from, &discovered)?;
        let Some(first_segment) = children.first() else {
            return Err(Error::invalid_topology(format!(
                "Line starting at {cable} has no cable segments."
            )));
        };

        let name = format!("{}-{}", from.name(), to.name());
        tracing::debug!("Line {} with {} segments.", name, children.len());
        Ok(Some(SimpleLine {
            mrid: Uuid::new_v5(&first_segment.equipment_id, b"SimpleLine"),
            name,
            from_substation: from.substation.identity.mrid,
            from_bay: from.bay,
            to_substation: to.substation.identity.mrid,
            to_bay: to.bay,
            children,
        }))
    }

    /// Returns the endpoint if the object is a traversal boundary, i.e. it is
    /// inside a substation that is not a T-junction.
    fn endpoint(&self, object: &NetworkObject) -> Option<LineEndpoint<'a>> {
        let graph = self.graph;
        let inside = match object {
            NetworkObject::ConductingEquipment(e) => e.identity.mrid,
            NetworkObject::ConnectivityNode(n) => graph
                .neighbors(n.identity.mrid)
                .ok()?
                .find(|e| graph.enclosing_substation(e.identity.mrid).is_some())?
                .identity
                .mrid,
            _ => return None,
        };
        let substation = graph.enclosing_substation(inside)?;
        Some(LineEndpoint {
            boundary: object.mrid(),
            substation,
            bay: graph.bay_of(inside).map(|b| b.identity.mrid),
        })
    }

    /// Collects the cable segments of the line in order, walking from the
    /// `from` endpoint.
    fn ordered_segments(
        &self,
        from: &LineEndpoint,
        discovered: &HashSet<Uuid>,
    ) -> Result<Vec<LineSegment>, Error> {
        let graph = self.graph;
        let entry = graph
            .neighbors(from.boundary)?
            .find(|e| discovered.contains(&e.identity.mrid))
            .ok_or_else(|| {
                Error::invalid_topology(format!(
                    "Line endpoint {} has no neighbor inside the traced cable run.",
                    from.boundary
                ))
            })?;

        Ok(graph
            .traverse(
                entry.identity.mrid,
                move |e| graph.enclosing_substation(e.identity.mrid).is_some(),
                move |n| graph.enclosing_substation_of_node(n.identity.mrid).is_some(),
                false,
            )?
            .filter_map(NetworkObject::as_equipment)
            .filter(|e| e.is_cable())
            .enumerate()
            .map(|(i, e)| LineSegment {
                equipment_id: e.identity.mrid,
                order: i + 1,
                is_first: i == 0,
            })
            .collect())
    }
}

/// Decides whether the second endpoint should become the `from` end.
///
/// Each endpoint is given as `(name, substation type)`.  In order of priority:
///  - a substation wins over a tower or enclosure,
///  - a non-numeric name wins over a numeric one,
///  - of two numeric names the smaller wins,
///  - of two non-numeric names the smaller first character wins,
///  - otherwise the order is kept.
fn should_swap(first: (&str, &str), second: (&str, &str)) -> bool {
    let is_substation = |type_name: &str| type_name.contains("Substation");
    let is_minor = |type_name: &str| type_name == "Tower" || type_name == "Enclosure";
    if is_substation(first.1) && !is_substation(second.1) && is_minor(second.1) {
        return false;
    }
    if is_substation(second.1) && !is_substation(first.1) && is_minor(first.1) {
        return true;
    }

    let first_number = first.0.trim().parse::<i64>().ok();
    let second_number = second.0.trim().parse::<i64>().ok();
    match (first_number, second_number) {
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (Some(a), Some(b)) => b < a,
        (None, None) => match (first.0.chars().next(), second.0.chars().next()) {
            (Some(a), Some(b)) => b < a,
            _ => false,
        },
    }
}
