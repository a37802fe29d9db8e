//! A [Voxel] is a single cell of the 3D grid. It knows where it sits, whether
//! it can be traversed and which other voxels border it.
//!
//! Search bookkeeping (cost-so-far, heuristic, predecessor) is not stored on
//! the voxel, each planner keeps its own record keyed by [VoxelId] and the
//! grid stays read-only while a search runs.
//!

use bevy::prelude::*;

/// Unique ID of a voxel, the flat index into the dense voxel array of a [crate::prelude::VoxelGrid]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct VoxelId(usize);

impl VoxelId {
	/// Create a new instance of [VoxelId]
	pub fn new(index: usize) -> Self {
		VoxelId(index)
	}
	/// Get the flat index
	pub fn get(&self) -> usize {
		self.0
	}
}

/// A unit cell of the grid
#[derive(Clone, Debug)]
pub struct Voxel {
	/// Integer `(x, y, z)` coordinate within the grid
	coord: IVec3,
	/// World-space centre of the cell
	position: Vec3,
	/// Whether an agent may occupy this cell
	walkable: bool,
	/// Every in-bounds voxel among the 26 surrounding coordinates, fixed once the grid is built
	neighbours: Vec<VoxelId>,
}

impl Voxel {
	/// Create a new instance of [Voxel] without any neighbours
	pub fn new(coord: IVec3, position: Vec3, walkable: bool) -> Self {
		Voxel {
			coord,
			position,
			walkable,
			neighbours: Vec::new(),
		}
	}
	/// Get the grid coordinate
	pub fn get_coord(&self) -> IVec3 {
		self.coord
	}
	/// Get the world-space centre
	pub fn get_position(&self) -> Vec3 {
		self.position
	}
	pub fn is_walkable(&self) -> bool {
		self.walkable
	}
	/// Mark the voxel as traversable or blocked
	pub fn set_walkable(&mut self, walkable: bool) {
		self.walkable = walkable;
	}
	/// Get the structural neighbours of this voxel
	pub fn get_neighbours(&self) -> &[VoxelId] {
		&self.neighbours
	}
	/// Link the voxel to its neighbours, only used while the grid is being built
	pub(crate) fn set_neighbours(&mut self, neighbours: Vec<VoxelId>) {
		self.neighbours = neighbours;
	}
}

/// Offsets to the 26 surrounding coordinates in generation order (`dx`, then `dy`, then `dz`, each from `-1` to `1`)
pub fn neighbour_offsets() -> impl Iterator<Item = IVec3> {
	(-1..=1).flat_map(|dx| {
		(-1..=1).flat_map(move |dy| {
			(-1..=1)
				.map(move |dz| IVec3::new(dx, dy, dz))
				.filter(|offset| *offset != IVec3::ZERO)
		})
	})
}
