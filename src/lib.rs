//! This is a plugin for Bevy game engine to voxelise a 3D world and plan routes through it with A*, hill-climbing, RRT or beam search
//!

pub mod bundle;
pub mod pathfinding;
pub mod plugin;

pub mod prelude;
