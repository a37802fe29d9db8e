//! The planners able to search a [crate::prelude::VoxelGrid].
//!
//! Each planner owns its parameters and the records of its most recent
//! search, the grid itself is only ever read.
//!

pub mod astar;
pub mod beam_search;
pub mod hill_climbing;
pub mod priority_queue;
pub mod rrt;
