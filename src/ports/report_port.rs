//! Report output port trait.

use std::path::Path;

use crate::domain::error::DtiTraderError;
use crate::domain::metrics::PerformanceSummary;
use crate::domain::position::{ClosedTrade, DailyValuation};
use crate::domain::simulator::SkippedSignal;

/// Borrowed view over everything a simulation run produced.
#[derive(Debug, Clone, Copy)]
pub struct SimulationReport<'a> {
    pub trades: &'a [ClosedTrade],
    pub valuations: &'a [DailyValuation],
    pub summary: &'a PerformanceSummary,
    pub skipped: &'a [SkippedSignal],
}

/// Port for handing simulation artifacts to a display/alerting collaborator.
pub trait ReportPort {
    fn write(&self, report: &SimulationReport<'_>, output_dir: &Path) -> Result<(), DtiTraderError>;
}
