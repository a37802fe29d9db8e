//! The [Planner] holds one instance of every algorithm and serves requests
//! with whichever is selected.
//!
//! Each request is timed, measured and logged, and a [PathReport] is
//! forwarded to an optional [PathfindingObserver] before the result is
//! handed back.
//!

use std::time::Instant;

use crate::prelude::*;
use bevy::prelude::*;

/// Selects and runs a planner over a grid
#[derive(Component)]
pub struct Planner {
	/// Planner used by [Planner::find_path]
	algorithm: Algorithm,
	/// Informed search
	astar: AStar,
	/// Local search
	hill_climbing: HillClimbing,
	/// Tree search
	rrt: Rrt,
	/// Beam search
	beam_search: BeamSearch,
	/// Receives a report of every request
	observer: Option<Box<dyn PathfindingObserver + Send + Sync>>,
	/// Report of the most recent request
	last_report: Option<PathReport>,
}

impl Default for Planner {
	fn default() -> Self {
		Planner::new()
	}
}

impl Planner {
	/// Create a new instance of [Planner] using [AStar] and default
	/// parameters, the random planners are seeded from the operating system
	pub fn new() -> Self {
		Planner {
			algorithm: Algorithm::default(),
			astar: AStar::new(),
			hill_climbing: HillClimbing::new(),
			rrt: Rrt::new(),
			beam_search: BeamSearch::new(),
			observer: None,
			last_report: None,
		}
	}
	/// Create a new instance of [Planner] from [PlannerSettings]
	pub fn from_settings(settings: &PlannerSettings) -> Self {
		let (hill_climbing, rrt) = match settings.seed {
			Some(seed) => (
				HillClimbing::with_seed(seed),
				// offset so both planners draw different streams
				Rrt::with_seed(seed.wrapping_add(1)),
			),
			None => (HillClimbing::new(), Rrt::new()),
		};
		let mut planner = Planner {
			algorithm: settings.algorithm,
			astar: AStar::new(),
			hill_climbing,
			rrt,
			beam_search: BeamSearch::new(),
			observer: None,
			last_report: None,
		};
		planner.apply_settings(settings);
		planner
	}
	/// Adopt the algorithm and parameter sets of [PlannerSettings]
	pub fn apply_settings(&mut self, settings: &PlannerSettings) {
		self.algorithm = settings.algorithm;
		*self.astar.get_params_mut() = settings.astar;
		*self.hill_climbing.get_params_mut() = settings.hill_climbing;
		*self.rrt.get_params_mut() = settings.rrt;
		*self.beam_search.get_params_mut() = settings.beam_search;
	}
	pub fn get_algorithm(&self) -> Algorithm {
		self.algorithm
	}
	pub fn set_algorithm(&mut self, algorithm: Algorithm) {
		self.algorithm = algorithm;
	}
	pub fn get_astar(&self) -> &AStar {
		&self.astar
	}
	pub fn get_astar_mut(&mut self) -> &mut AStar {
		&mut self.astar
	}
	pub fn get_hill_climbing(&self) -> &HillClimbing {
		&self.hill_climbing
	}
	pub fn get_hill_climbing_mut(&mut self) -> &mut HillClimbing {
		&mut self.hill_climbing
	}
	pub fn get_rrt(&self) -> &Rrt {
		&self.rrt
	}
	pub fn get_rrt_mut(&mut self) -> &mut Rrt {
		&mut self.rrt
	}
	pub fn get_beam_search(&self) -> &BeamSearch {
		&self.beam_search
	}
	pub fn get_beam_search_mut(&mut self) -> &mut BeamSearch {
		&mut self.beam_search
	}
	/// The planner implementing `algorithm`
	pub fn get_planner(&self, algorithm: Algorithm) -> &dyn PathPlanner {
		match algorithm {
			Algorithm::AStar => &self.astar,
			Algorithm::HillClimbing => &self.hill_climbing,
			Algorithm::Rrt => &self.rrt,
			Algorithm::BeamSearch => &self.beam_search,
		}
	}
	/// The planner implementing `algorithm`
	pub fn get_planner_mut(&mut self, algorithm: Algorithm) -> &mut dyn PathPlanner {
		match algorithm {
			Algorithm::AStar => &mut self.astar,
			Algorithm::HillClimbing => &mut self.hill_climbing,
			Algorithm::Rrt => &mut self.rrt,
			Algorithm::BeamSearch => &mut self.beam_search,
		}
	}
	/// Voxels explored by the most recent search of `algorithm`
	pub fn nodes_explored(&self, algorithm: Algorithm) -> usize {
		self.get_planner(algorithm).nodes_explored()
	}
	/// Attach an observer, replacing any previous one
	pub fn set_observer(&mut self, observer: Box<dyn PathfindingObserver + Send + Sync>) {
		self.observer = Some(observer);
	}
	/// Detach and return the current observer
	pub fn take_observer(&mut self) -> Option<Box<dyn PathfindingObserver + Send + Sync>> {
		self.observer.take()
	}
	/// Report of the most recent request
	pub fn get_last_report(&self) -> Option<&PathReport> {
		self.last_report.as_ref()
	}
	/// Plan a route with the selected algorithm
	pub fn find_path(
		&mut self,
		grid: &VoxelGrid,
		obstacles: &dyn ObstacleQuery,
		start: Vec3,
		target: Vec3,
	) -> Result<Vec<Vec3>, PathfindingError> {
		self.find_path_with(self.algorithm, grid, obstacles, start, target)
	}
	/// Plan a route with a specific algorithm
	pub fn find_path_with(
		&mut self,
		algorithm: Algorithm,
		grid: &VoxelGrid,
		obstacles: &dyn ObstacleQuery,
		start: Vec3,
		target: Vec3,
	) -> Result<Vec<Vec3>, PathfindingError> {
		let space = SearchSpace::new(grid, obstacles);
		let planner = self.get_planner_mut(algorithm);
		let timer = Instant::now();
		let result = planner.find_path(&space, start, target);
		let elapsed = timer.elapsed();
		let report = PathReport::new(
			algorithm,
			start,
			target,
			elapsed,
			planner.nodes_explored(),
			result.as_ref().ok().map(|waypoints| waypoints.as_slice()),
		);
		match (&result, report.get_metrics()) {
			(Ok(waypoints), Some(metrics)) => info!(
				"{} found a path of {} points in {:?}, length {:.2}, cost {:.2}, height range {:.2}, explored {}",
				algorithm,
				waypoints.len(),
				elapsed,
				metrics.get_length(),
				metrics.get_cost(),
				metrics.get_height_range(),
				report.get_nodes_explored()
			),
			(Err(e), _) => debug!(
				"{} found no path from {} to {} in {:?}: {}",
				algorithm, start, target, elapsed, e
			),
			_ => {}
		}
		if let Some(observer) = self.observer.as_mut() {
			observer.record(&report);
		}
		self.last_report = Some(report);
		result
	}
	/// Update a parameter of one algorithm by name
	pub fn update_parameter(
		&mut self,
		algorithm: Algorithm,
		name: &str,
		value: f32,
	) -> Result<(), ConfigError> {
		self.get_planner_mut(algorithm).set_parameter(name, value)
	}
	/// Restore every parameter set to its defaults
	pub fn reset_parameters(&mut self) {
		*self.astar.get_params_mut() = AStarParams::default();
		*self.hill_climbing.get_params_mut() = HillClimbingParams::default();
		*self.rrt.get_params_mut() = RrtParams::default();
		*self.beam_search.get_params_mut() = BeamSearchParams::default();
	}
	/// Clear the exploration records of every planner
	pub fn reset_planners(&mut self) {
		for algorithm in Algorithm::ALL {
			self.get_planner_mut(algorithm).reset();
		}
		self.last_report = None;
	}
}
