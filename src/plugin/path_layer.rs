//! Logic relating to serving path requests
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Change the algorithm every [Planner] uses for requests that do not name one
#[derive(Event)]
pub struct EventSelectAlgorithm(pub Algorithm);

/// Ask for a route between two world positions. The answer arrives as an
/// [EventPathResult] addressed to `requester`
#[derive(Event)]
pub struct EventPathRequest {
	/// Entity that wants the route
	requester: Entity,
	/// World position to start from
	start: Vec3,
	/// World position to reach
	target: Vec3,
	/// Planner to use instead of the selected one
	algorithm: Option<Algorithm>,
}

impl EventPathRequest {
	pub fn new(requester: Entity, start: Vec3, target: Vec3) -> Self {
		EventPathRequest {
			requester,
			start,
			target,
			algorithm: None,
		}
	}
	/// Serve the request with a specific planner
	pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
		self.algorithm = Some(algorithm);
		self
	}
	pub fn get_requester(&self) -> Entity {
		self.requester
	}
	pub fn get_start(&self) -> Vec3 {
		self.start
	}
	pub fn get_target(&self) -> Vec3 {
		self.target
	}
	pub fn get_algorithm(&self) -> Option<Algorithm> {
		self.algorithm
	}
}

/// The answer to an [EventPathRequest]
#[derive(Event, Debug)]
pub struct EventPathResult {
	/// Entity that asked for the route
	requester: Entity,
	/// Planner that produced the outcome
	algorithm: Algorithm,
	/// Waypoints from start to target, or why there are none
	result: Result<Vec<Vec3>, PathfindingError>,
}

impl EventPathResult {
	pub fn get_requester(&self) -> Entity {
		self.requester
	}
	pub fn get_algorithm(&self) -> Algorithm {
		self.algorithm
	}
	pub fn get_result(&self) -> &Result<Vec<Vec3>, PathfindingError> {
		&self.result
	}
	/// Take ownership of the outcome
	pub fn into_result(self) -> Result<Vec<Vec3>, PathfindingError> {
		self.result
	}
}

/// Handle [EventSelectAlgorithm]
#[cfg(not(tarpaulin_include))]
pub fn select_algorithm(
	mut events: EventReader<EventSelectAlgorithm>,
	mut planner_q: Query<&mut Planner>,
) {
	for event in events.read() {
		for mut planner in planner_q.iter_mut() {
			debug!("Switching planner to {}", event.0);
			planner.set_algorithm(event.0);
		}
	}
}

/// Handle [EventPathRequest] by searching each grid and sending back an [EventPathResult]
#[cfg(not(tarpaulin_include))]
pub fn process_path_requests(
	mut requests: EventReader<EventPathRequest>,
	mut grid_q: Query<(&VoxelGrid, &Obstacles, &mut Planner)>,
	mut results: EventWriter<EventPathResult>,
) {
	for request in requests.read() {
		for (grid, obstacles, mut planner) in grid_q.iter_mut() {
			let algorithm = request.algorithm.unwrap_or(planner.get_algorithm());
			let result =
				planner.find_path_with(algorithm, grid, obstacles, request.start, request.target);
			results.write(EventPathResult {
				requester: request.requester,
				algorithm,
				result,
			});
		}
	}
}
