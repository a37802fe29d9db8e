//! The world is divided into a dense 3D grid of cubic [Voxel]s. Each voxel is
//! classified as walkable or blocked once when the grid is built and is linked
//! to every in-bounds voxel among the 26 coordinates surrounding it.
//!
//! ```text
//!            y
//!            |
//!            |____ ____ ____
//!           /    /    /    /|
//!          /____/____/____/ |
//!         /    /    /    /| |
//!        /____/____/____/ |/|
//!        |    |    |    | / |
//!        |____|____|____|/| |____ x
//!        |    |    |    | |/
//!        |____|____|____|/
//!       /
//!      z
//! ```
//!
//! The grid begins at a world origin offset and a position maps onto exactly
//! one voxel coordinate by flooring `(position - origin) / cell_size` on each
//! axis. Coordinates outside of the voxel counts have no voxel.
//!

pub mod obstacles;
pub mod spatial_hash;
pub mod voxel;

use crate::prelude::*;
use bevy::prelude::*;

/// Fraction of the cell size used as the radius of the sphere that classifies a voxel as blocked
pub const WALKABLE_PROBE_RADIUS_FACTOR: f32 = 0.4;

/// The extent of the world and how finely it is divided
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridDimensions {
	/// Size of the world along each axis
	world_size: Vec3,
	/// World position of the minimum corner of the grid
	world_origin: Vec3,
	/// Length of each side of a voxel
	cell_size: f32,
	/// Number of voxels along each axis
	voxel_counts: UVec3,
}

impl GridDimensions {
	/// Create a new instance of [GridDimensions]. The number of voxels along
	/// each axis is `world_size / cell_size` rounded to the nearest integer
	/// (halves round to even)
	pub fn new(world_size: Vec3, world_origin: Vec3, cell_size: f32) -> Result<Self, GridError> {
		if !cell_size.is_finite() || cell_size <= 0.0 {
			return Err(GridError::InvalidCellSize(cell_size));
		}
		if !world_origin.is_finite() {
			return Err(GridError::NonFiniteOrigin(world_origin));
		}
		let ratio = world_size / cell_size;
		let counts = Vec3::new(
			ratio.x.round_ties_even(),
			ratio.y.round_ties_even(),
			ratio.z.round_ties_even(),
		);
		if !counts.is_finite() || counts.min_element() < 1.0 {
			return Err(GridError::EmptyAxis {
				world_size,
				cell_size,
			});
		}
		Ok(GridDimensions {
			world_size,
			world_origin,
			cell_size,
			voxel_counts: counts.as_uvec3(),
		})
	}
	/// Create a new instance of [GridDimensions] from [GridSettings]
	pub fn from_settings(settings: &GridSettings) -> Result<Self, GridError> {
		GridDimensions::new(
			settings.world_size,
			settings.world_origin,
			settings.cell_size,
		)
	}
	pub fn get_world_size(&self) -> Vec3 {
		self.world_size
	}
	pub fn get_world_origin(&self) -> Vec3 {
		self.world_origin
	}
	pub fn get_cell_size(&self) -> f32 {
		self.cell_size
	}
	/// Number of voxels along the `x`, `y` and `z` axes
	pub fn get_voxel_counts(&self) -> UVec3 {
		self.voxel_counts
	}
	/// Total number of voxels
	pub fn get_voxel_total(&self) -> usize {
		self.voxel_counts.x as usize * self.voxel_counts.y as usize * self.voxel_counts.z as usize
	}
	/// Minimum corner of the world bounds
	pub fn get_min(&self) -> Vec3 {
		self.world_origin
	}
	/// Maximum corner of the world bounds
	pub fn get_max(&self) -> Vec3 {
		self.world_origin + self.world_size
	}
	/// Centre of the world bounds
	pub fn get_centre(&self) -> Vec3 {
		self.world_origin + self.world_size * 0.5
	}
	/// Whether a world position lies within the world bounds, boundaries included
	pub fn contains_point(&self, position: Vec3) -> bool {
		let local = position - self.world_origin;
		local.cmpge(Vec3::ZERO).all() && local.cmple(self.world_size).all()
	}
	/// Whether an integer coordinate has a voxel
	pub fn is_in_bounds(&self, coord: IVec3) -> bool {
		coord.cmpge(IVec3::ZERO).all() && coord.as_uvec3().cmplt(self.voxel_counts).all()
	}
	/// World position to the coordinate of the cell containing it
	pub fn world_to_grid(&self, position: Vec3) -> IVec3 {
		((position - self.world_origin) / self.cell_size)
			.floor()
			.as_ivec3()
	}
	/// Coordinate to the world-space centre of its cell
	pub fn grid_to_world(&self, coord: IVec3) -> Vec3 {
		self.world_origin + (coord.as_vec3() + Vec3::splat(0.5)) * self.cell_size
	}
	/// Flat index of an in-bounds coordinate
	fn flat_index(&self, coord: IVec3) -> Option<usize> {
		if !self.is_in_bounds(coord) {
			return None;
		}
		let counts = self.voxel_counts;
		Some(
			(coord.x as usize * counts.y as usize + coord.y as usize) * counts.z as usize
				+ coord.z as usize,
		)
	}
}

/// Owns every [Voxel] of the world in a dense array
#[derive(Component, Clone, Debug)]
pub struct VoxelGrid {
	/// Extent and resolution of the grid
	dimensions: GridDimensions,
	/// Voxels indexed by [VoxelId]
	voxels: Vec<Voxel>,
}

impl VoxelGrid {
	/// Create a new instance of [VoxelGrid]. Each voxel is marked walkable
	/// when a sphere at its centre of radius `0.4 * cell_size` overlaps no
	/// obstacle, then linked to its in-bounds neighbours
	pub fn new(dimensions: GridDimensions, obstacles: &dyn ObstacleQuery) -> Self {
		let probe_radius = dimensions.get_cell_size() * WALKABLE_PROBE_RADIUS_FACTOR;
		let counts = dimensions.get_voxel_counts().as_ivec3();
		let mut voxels = Vec::with_capacity(dimensions.get_voxel_total());
		for x in 0..counts.x {
			for y in 0..counts.y {
				for z in 0..counts.z {
					let coord = IVec3::new(x, y, z);
					let position = dimensions.grid_to_world(coord);
					let walkable = !obstacles.check_sphere(position, probe_radius);
					voxels.push(Voxel::new(coord, position, walkable));
				}
			}
		}
		for voxel in voxels.iter_mut() {
			let coord = voxel.get_coord();
			let neighbours = neighbour_offsets()
				.filter_map(|offset| dimensions.flat_index(coord + offset))
				.map(VoxelId::new)
				.collect();
			voxel.set_neighbours(neighbours);
		}
		let blocked = voxels.iter().filter(|v| !v.is_walkable()).count();
		debug!(
			"Built voxel grid of {} voxels, {} blocked",
			voxels.len(),
			blocked
		);
		VoxelGrid { dimensions, voxels }
	}
	/// Create a new instance of [VoxelGrid] from [GridSettings]
	pub fn from_settings(
		settings: &GridSettings,
		obstacles: &dyn ObstacleQuery,
	) -> Result<Self, GridError> {
		let dimensions = GridDimensions::from_settings(settings)?;
		Ok(VoxelGrid::new(dimensions, obstacles))
	}
	/// Discard every voxel and build them again with new dimensions
	pub fn rebuild(&mut self, dimensions: GridDimensions, obstacles: &dyn ObstacleQuery) {
		*self = VoxelGrid::new(dimensions, obstacles);
	}
	pub fn get_dimensions(&self) -> &GridDimensions {
		&self.dimensions
	}
	/// Get every voxel
	pub fn get_voxels(&self) -> &[Voxel] {
		&self.voxels
	}
	/// Number of voxels in the grid
	pub fn len(&self) -> usize {
		self.voxels.len()
	}
	/// A grid built from valid [GridDimensions] is never empty
	pub fn is_empty(&self) -> bool {
		self.voxels.is_empty()
	}
	/// Get a voxel by ID. IDs handed out by this grid are always valid so this
	/// panics on an ID from a different grid
	pub fn get_voxel(&self, id: VoxelId) -> &Voxel {
		&self.voxels[id.get()]
	}
	/// Get the world-space centre of a voxel
	pub fn get_position(&self, id: VoxelId) -> Vec3 {
		self.voxels[id.get()].get_position()
	}
	/// Whether the voxel may be traversed
	pub fn is_walkable(&self, id: VoxelId) -> bool {
		self.voxels[id.get()].is_walkable()
	}
	/// Structural neighbours of a voxel
	pub fn get_neighbours(&self, id: VoxelId) -> &[VoxelId] {
		self.voxels[id.get()].get_neighbours()
	}
	/// Toggle walkability of a voxel after the grid has been built. Neighbour links are unaffected
	pub fn set_walkable(&mut self, id: VoxelId, walkable: bool) {
		if let Some(voxel) = self.voxels.get_mut(id.get()) {
			voxel.set_walkable(walkable);
		}
	}
	/// World position to the coordinate of the cell containing it
	pub fn world_to_grid(&self, position: Vec3) -> IVec3 {
		self.dimensions.world_to_grid(position)
	}
	/// Coordinate to the world-space centre of its cell
	pub fn grid_to_world(&self, coord: IVec3) -> Vec3 {
		self.dimensions.grid_to_world(coord)
	}
	/// ID of the voxel at a grid coordinate if it is in bounds
	pub fn voxel_id_at_coord(&self, coord: IVec3) -> Option<VoxelId> {
		self.dimensions.flat_index(coord).map(VoxelId::new)
	}
	/// ID of the voxel whose cell contains `position`, `None` when outside of the grid
	pub fn voxel_id_at(&self, position: Vec3) -> Option<VoxelId> {
		self.voxel_id_at_coord(self.world_to_grid(position))
	}
	/// The voxel whose cell contains `position`, `None` when outside of the grid
	pub fn voxel_at(&self, position: Vec3) -> Option<&Voxel> {
		self.voxel_id_at(position).map(|id| self.get_voxel(id))
	}
	/// Index every voxel into a [SpatialHash] with cells twice the size of a voxel
	pub fn build_spatial_hash(&self) -> SpatialHash {
		let mut hash = SpatialHash::new(self.dimensions.get_cell_size());
		for (i, voxel) in self.voxels.iter().enumerate() {
			hash.insert(VoxelId::new(i), voxel.get_position());
		}
		hash
	}
}
