//! Reports describing each planning request and the observers receiving them.
//!
//! The [crate::prelude::Planner] builds a [PathReport] after every search,
//! successful or not, and forwards it to its observer if one is attached.
//!
//! With the `csv` feature enabled [CsvTelemetry] writes one row per report
//! with the columns:
//!
//! ```text
//! timestamp,algorithm,execution_time_ms,nodes_explored,path_length_m,path_cost,height_difference_m,path_points,success,avg_segment_length_m
//! ```
//!

use std::time::Duration;

use crate::prelude::*;
use bevy::prelude::*;

/// Outcome of a single planning request
#[derive(Clone, Debug, PartialEq)]
pub struct PathReport {
	/// Planner that served the request
	algorithm: Algorithm,
	/// Requested start position
	start: Vec3,
	/// Requested target position
	target: Vec3,
	/// Wall clock time spent inside the planner
	execution_time: Duration,
	/// Voxels the planner explored
	nodes_explored: usize,
	/// Number of waypoints produced, zero on failure
	waypoint_count: usize,
	/// Measurements of the route, only present on success
	metrics: Option<PathMetrics>,
}

impl PathReport {
	/// Create a new instance of [PathReport]
	pub fn new(
		algorithm: Algorithm,
		start: Vec3,
		target: Vec3,
		execution_time: Duration,
		nodes_explored: usize,
		waypoints: Option<&[Vec3]>,
	) -> Self {
		PathReport {
			algorithm,
			start,
			target,
			execution_time,
			nodes_explored,
			waypoint_count: waypoints.map_or(0, |w| w.len()),
			metrics: waypoints.map(PathMetrics::from_waypoints),
		}
	}
	pub fn get_algorithm(&self) -> Algorithm {
		self.algorithm
	}
	pub fn get_start(&self) -> Vec3 {
		self.start
	}
	pub fn get_target(&self) -> Vec3 {
		self.target
	}
	pub fn get_execution_time(&self) -> Duration {
		self.execution_time
	}
	pub fn get_nodes_explored(&self) -> usize {
		self.nodes_explored
	}
	pub fn get_waypoint_count(&self) -> usize {
		self.waypoint_count
	}
	pub fn get_metrics(&self) -> Option<&PathMetrics> {
		self.metrics.as_ref()
	}
	/// Whether a route was produced
	pub fn is_success(&self) -> bool {
		self.metrics.is_some()
	}
}

/// Receives a [PathReport] after every planning request
pub trait PathfindingObserver {
	/// Handle the report of a finished request
	fn record(&mut self, report: &PathReport);
}

/// Keeps every report in memory
#[derive(Clone, Debug, Default)]
pub struct ReportHistory {
	/// Reports in the order they were received
	reports: Vec<PathReport>,
}

impl ReportHistory {
	/// Create a new empty instance of [ReportHistory]
	pub fn new() -> Self {
		ReportHistory::default()
	}
	pub fn get_reports(&self) -> &[PathReport] {
		&self.reports
	}
	/// Fraction of reports that produced a route, `None` when empty
	pub fn success_rate(&self) -> Option<f32> {
		if self.reports.is_empty() {
			return None;
		}
		let successes = self.reports.iter().filter(|r| r.is_success()).count();
		Some(successes as f32 / self.reports.len() as f32)
	}
	pub fn clear(&mut self) {
		self.reports.clear();
	}
}

impl PathfindingObserver for ReportHistory {
	fn record(&mut self, report: &PathReport) {
		self.reports.push(report.clone());
	}
}

/// Layout of the timestamp column
#[cfg(feature = "csv")]
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single CSV row, fractional columns carry three decimals
#[cfg(feature = "csv")]
#[derive(serde::Serialize)]
struct CsvRow {
	/// Local time the row was written
	timestamp: String,
	/// Name of the planner
	algorithm: String,
	/// Planner run time
	execution_time_ms: String,
	/// Voxels explored
	nodes_explored: usize,
	/// Route length
	path_length_m: String,
	/// Route cost
	path_cost: String,
	/// Height range of the route
	height_difference_m: String,
	/// Waypoint count
	path_points: usize,
	/// `1` when a route was produced
	success: u8,
	/// Mean waypoint spacing
	avg_segment_length_m: String,
}

#[cfg(feature = "csv")]
impl CsvRow {
	/// Flatten a report into a row
	fn from_report(report: &PathReport) -> Self {
		let metrics = report.get_metrics().copied().unwrap_or_default();
		CsvRow {
			timestamp: chrono::Local::now()
				.format(CSV_TIMESTAMP_FORMAT)
				.to_string(),
			algorithm: report.get_algorithm().to_string(),
			execution_time_ms: format!("{:.3}", report.get_execution_time().as_secs_f64() * 1000.0),
			nodes_explored: report.get_nodes_explored(),
			path_length_m: format!("{:.3}", metrics.get_length()),
			path_cost: format!("{:.3}", metrics.get_cost()),
			height_difference_m: format!("{:.3}", metrics.get_height_range()),
			path_points: report.get_waypoint_count(),
			success: u8::from(report.is_success()),
			avg_segment_length_m: format!(
				"{:.3}",
				metrics.get_average_segment_length(report.get_waypoint_count())
			),
		}
	}
}

/// Writes a CSV row for every report
#[cfg(feature = "csv")]
pub struct CsvTelemetry<W: std::io::Write> {
	/// Destination of the rows, the header is written with the first row
	writer: csv::Writer<W>,
}

#[cfg(feature = "csv")]
impl CsvTelemetry<std::fs::File> {
	/// Create or truncate a CSV file at `path`
	pub fn from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self, csv::Error> {
		Ok(CsvTelemetry {
			writer: csv::Writer::from_path(path)?,
		})
	}
}

#[cfg(feature = "csv")]
impl<W: std::io::Write> CsvTelemetry<W> {
	/// Create a new instance of [CsvTelemetry] writing into `writer`
	pub fn new(writer: W) -> Self {
		CsvTelemetry {
			writer: csv::Writer::from_writer(writer),
		}
	}
	/// Flush and return the underlying writer
	pub fn into_inner(self) -> Result<W, ConfigError> {
		self.writer
			.into_inner()
			.map_err(|e| ConfigError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))
	}
}

#[cfg(feature = "csv")]
impl<W: std::io::Write> PathfindingObserver for CsvTelemetry<W> {
	fn record(&mut self, report: &PathReport) {
		if let Err(e) = self.writer.serialize(CsvRow::from_report(report)) {
			error!("Failed writing telemetry row: {}", e);
			return;
		}
		if let Err(e) = self.writer.flush() {
			error!("Failed flushing telemetry: {}", e);
		}
	}
}
