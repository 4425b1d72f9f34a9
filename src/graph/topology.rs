// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Topology analyses over a [`NetworkGraph`]: line detection and feeder
//! tracing.

mod feeders;
mod lines;


pub use feeders::{ConnectionPoint, Feeder, FeederMap, FeederReport, FeederType, FlatFeederInfo};
pub use lines::{LineSegment, SimpleLine};

use crate::{Error, NetworkGraph};

impl NetworkGraph {
    /// Returns the lines found outside substations, each connecting exactly
    /// two substations.
    pub fn detect_lines(&self) -> Result<Vec<SimpleLine>, Error> {
        lines::LineDetector::new(self).detect()
    }

    /// Traces every network injection and substation transformer downstream
    /// and returns the feeders reaching each equipment.
    pub fn trace_feeders(&self) -> Result<FeederMap, Error> {
        feeders::tracer::FeederTracer::new(self).trace()
    }

    /// Flattens the given feeders into one record per equipment and feeder,
    /// flagging unfed and multi-fed equipment.
    pub fn analyze_feeders(&self, feeders: &FeederMap) -> Result<FeederReport, Error> {
        feeders::analyzer::FeederAnalyzer::new(self, feeders).analyze()
    }

    /// Traces and analyzes feeders in one go.
    pub fn feeder_report(&self) -> Result<FeederReport, Error> {
        let feeders = self.trace_feeders()?;
        self.analyze_feeders(&feeders)
    }
}
