//! Binary min-heap of voxels ordered by their combined (cost-so-far plus
//! heuristic) cost, used as the A* frontier.
//!
//! Unlike [std::collections::BinaryHeap] a queued voxel can have its key
//! lowered in place, a secondary index from [VoxelId] to heap slot makes the
//! membership test and the key decrease constant time lookups.
//!
//! Ties are resolved by heap order, there is no stable FIFO behaviour between
//! voxels of equal cost.
//!

use std::collections::HashMap;

use crate::prelude::*;

/// An entry of the heap
#[derive(Clone, Copy, Debug)]
struct HeapItem {
	/// Voxel queued for expansion
	id: VoxelId,
	/// Combined cost at the time of the last insert or key decrease
	key: f32,
}

/// Min-heap of [VoxelId] keyed by combined cost
#[derive(Clone, Debug, Default)]
pub struct VoxelHeap {
	/// Heap ordered items
	items: Vec<HeapItem>,
	/// Slot of each queued voxel within `items`
	slots: HashMap<VoxelId, usize>,
}

impl VoxelHeap {
	/// Create a new empty instance of [VoxelHeap]
	pub fn new() -> Self {
		VoxelHeap::default()
	}
	/// Number of queued voxels
	pub fn len(&self) -> usize {
		self.items.len()
	}
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
	/// Remove everything from the heap
	pub fn clear(&mut self) {
		self.items.clear();
		self.slots.clear();
	}
	/// Whether the voxel is currently queued
	pub fn contains(&self, id: VoxelId) -> bool {
		self.slots.contains_key(&id)
	}
	/// Queue a voxel with a combined cost of `key`
	pub fn insert(&mut self, id: VoxelId, key: f32) {
		self.items.push(HeapItem { id, key });
		let slot = self.items.len() - 1;
		self.slots.insert(id, slot);
		self.sift_up(slot);
	}
	/// Remove and return the voxel of lowest combined cost
	pub fn extract_min(&mut self) -> Option<VoxelId> {
		if self.items.is_empty() {
			return None;
		}
		let last = self.items.len() - 1;
		self.swap(0, last);
		let min = self.items.pop()?;
		self.slots.remove(&min.id);
		if !self.items.is_empty() {
			self.sift_down(0);
		}
		Some(min.id)
	}
	/// Lower the key of a queued voxel and restore heap order. The new key
	/// must not be larger than the current one, raising a key leaves the
	/// heap unordered
	pub fn decrease_key(&mut self, id: VoxelId, key: f32) {
		if let Some(&slot) = self.slots.get(&id) {
			self.items[slot].key = key;
			self.sift_up(slot);
		}
	}
	/// Move the item at `slot` towards the root while it is cheaper than its parent
	fn sift_up(&mut self, mut slot: usize) {
		while slot > 0 {
			let parent = (slot - 1) / 2;
			if self.items[slot].key < self.items[parent].key {
				self.swap(slot, parent);
				slot = parent;
			} else {
				break;
			}
		}
	}
	/// Move the item at `slot` towards the leaves while a child is cheaper
	fn sift_down(&mut self, mut slot: usize) {
		loop {
			let left = slot * 2 + 1;
			let right = left + 1;
			if left >= self.items.len() {
				return;
			}
			let mut child = left;
			if right < self.items.len() && self.items[right].key < self.items[left].key {
				child = right;
			}
			if self.items[child].key < self.items[slot].key {
				self.swap(slot, child);
				slot = child;
			} else {
				return;
			}
		}
	}
	/// Swap two items and keep the slot index in step
	fn swap(&mut self, a: usize, b: usize) {
		self.items.swap(a, b);
		self.slots.insert(self.items[a].id, a);
		self.slots.insert(self.items[b].id, b);
	}
}
