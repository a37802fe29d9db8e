//! A coarse spatial hash used for radius queries around a point.
//!
//! The dense [crate::prelude::VoxelGrid] answers "which voxel contains this
//! point" by direct indexing, the [SpatialHash] instead answers "which voxels
//! lie within some distance of this point". Buckets are twice the size of a
//! voxel so a small radius touches only a handful of them.
//!
//! Bucket keys come from hashing the integer bucket coordinate, distinct
//! buckets may therefore share a key and are then treated as one.
//!

use std::collections::{HashMap, HashSet};

use crate::prelude::*;
use bevy::prelude::*;

/// Multiplier applied to the voxel size to produce the bucket size
pub const SPATIAL_HASH_CELL_FACTOR: f32 = 2.0;

/// Large odd primes used to mix the `x`, `y` and `z` bucket coordinates
const HASH_PRIMES: (i32, i32, i32) = (73_856_093, 19_349_663, 83_492_791);

/// Buckets of voxels keyed by a hash of their coarse cell
#[derive(Clone, Debug)]
pub struct SpatialHash {
	/// Side length of a bucket
	cell_size: f32,
	/// Voxels and their positions within each bucket
	buckets: HashMap<i32, Vec<(VoxelId, Vec3)>>,
}

impl SpatialHash {
	/// Create a new instance of [SpatialHash] for a grid whose voxels measure `node_size`
	pub fn new(node_size: f32) -> Self {
		SpatialHash {
			cell_size: node_size * SPATIAL_HASH_CELL_FACTOR,
			buckets: HashMap::new(),
		}
	}
	/// Side length of a bucket
	pub fn get_cell_size(&self) -> f32 {
		self.cell_size
	}
	/// Number of entries across all buckets
	pub fn len(&self) -> usize {
		self.buckets.values().map(|b| b.len()).sum()
	}
	/// Whether nothing has been inserted
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
	/// Add a voxel at `position` to the bucket containing it
	pub fn insert(&mut self, id: VoxelId, position: Vec3) {
		let key = hash_cell(self.cell_of(position));
		self.buckets.entry(key).or_default().push((id, position));
	}
	/// Move a voxel to `position`. Every bucket is scanned for the old entry
	pub fn update(&mut self, id: VoxelId, position: Vec3) {
		for bucket in self.buckets.values_mut() {
			bucket.retain(|(existing, _)| *existing != id);
		}
		self.insert(id, position);
	}
	/// Find every voxel within `radius` (inclusive) of `centre`
	pub fn query_radius(&self, centre: Vec3, radius: f32) -> Vec<VoxelId> {
		let mut found = Vec::new();
		let mut checked = HashSet::new();
		let reach = (radius / self.cell_size).ceil() as i32;
		let centre_cell = self.cell_of(centre);
		for x in -reach..=reach {
			for y in -reach..=reach {
				for z in -reach..=reach {
					let key = hash_cell(centre_cell + IVec3::new(x, y, z));
					if !checked.insert(key) {
						continue;
					}
					if let Some(bucket) = self.buckets.get(&key) {
						for (id, position) in bucket.iter() {
							if centre.distance(*position) <= radius {
								found.push(*id);
							}
						}
					}
				}
			}
		}
		found
	}
	/// Coarse cell containing a position
	fn cell_of(&self, position: Vec3) -> IVec3 {
		(position / self.cell_size).floor().as_ivec3()
	}
}

/// Mix a bucket coordinate into a key, wrapping on overflow
fn hash_cell(cell: IVec3) -> i32 {
	let mixed = cell.x.wrapping_mul(HASH_PRIMES.0)
		^ cell.y.wrapping_mul(HASH_PRIMES.1)
		^ cell.z.wrapping_mul(HASH_PRIMES.2);
	mixed % i32::MAX
}

impl VoxelGrid {
	/// Find every voxel within `radius` of `centre` by building a [SpatialHash] over the grid
	pub fn voxels_within(&self, centre: Vec3, radius: f32) -> Vec<VoxelId> {
		self.build_spatial_hash().query_radius(centre, radius)
	}
}
