// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# DSO Network Topology

This is a library for representing the physical model of a distribution
network (equipment, connectivity nodes, terminals and containers) as a graph,
and for analysing its topology: which substations a cable run connects, and
which sources feed every piece of equipment.

## Building a graph

The main struct is [`NetworkGraph`], instances of which can be created by
passing an iterator of [`NetworkObject`][model::NetworkObject]s to the
[`try_new`][NetworkGraph::try_new] method, together with a
[`NetworkGraphConfig`].

Equipment and connectivity nodes are the nodes of the topology, and every
terminal connecting an equipment to a connectivity node is an edge.
Containment (substations, voltage levels, bays) is kept alongside, and can be
queried with methods like [`substation_of`][NetworkGraph::substation_of],
[`bay_of`][NetworkGraph::bay_of] and [`voltage_of`][NetworkGraph::voltage_of].

## Validation

The [`try_new`][NetworkGraph::try_new] method runs several checks on the
objects, including checking that:

- No two objects share an `mRID`.
- Terminals are attached to conducting equipment.
- The container hierarchy has no cycles.
- References point to existing objects.  Missing references fail graph
  creation only when
  [`strict_references`][NetworkGraphConfig::strict_references] is set, and
  are logged otherwise.

## Enrichment

[`enrich`][NetworkGraph::enrich] normalizes the topology before analysis.
It disconnects dangling terminals and gives every switch sitting directly in
a substation a bay of their own.  Breakers moved into a new bay that connect
straight to a busbar also get a disconnector in front of them.

## Analyses

- [`traverse`][NetworkGraph::traverse] walks the topology from one object,
  with configurable stopping rules.
- [`detect_lines`][NetworkGraph::detect_lines] finds the cable runs that
  connect exactly two substations.
- [`trace_feeders`][NetworkGraph::trace_feeders] and
  [`analyze_feeders`][NetworkGraph::analyze_feeders] find the sources feeding
  every piece of equipment, and flag unfed and multi-fed equipment.

The [`ClosureFilter`] works on raw records instead of a graph, and finds all
the records related to a set of seed records.
*/

mod closure;
pub use closure::{ClosureFilter, ClosureFilterConfig, ClosureRecord, ClosureResult, JsonRecord};

mod config;
pub use config::NetworkGraphConfig;

mod equipment_kind;
pub use equipment_kind::{ContainerKind, EquipmentKind};

mod graph;
pub use graph::{
    iterators, ConnectionPoint, EnrichmentSummary, Feeder, FeederMap, FeederReport, FeederType,
    FlatFeederInfo, LineSegment, NetworkGraph, SimpleLine, TerminalConnection,
};

mod graph_traits;
pub use graph_traits::ObjectKind;

mod error;
pub use error::Error;

pub mod model;
