//! Folds consecutive size classes sharing a chunk size into allocators.

use getset::{
  CopyGetters,
  Getters,
};
use serde::Serialize;
use tracing::trace;

use crate::{
  chunk::ChunkGeometry,
  classes::{
    SizeClass,
    SizeClassIndex,
  },
  config::AllocatorBudget,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, CopyGetters)]
pub struct AllocatorGroup {
  #[getset(get_copy = "pub")]
  index: usize,
  #[getset(get_copy = "pub")]
  chunk_size: usize,
  #[getset(get = "pub")]
  members: Vec<SizeClassIndex>,
  #[getset(get_copy = "pub")]
  min_size: usize,
  #[getset(get_copy = "pub")]
  max_size: usize,
  /// Address space reserved for the chunks of this allocator.
  #[getset(get_copy = "pub")]
  memory_range: usize,
  /// Chunks that fit in `memory_range`.
  #[getset(get_copy = "pub")]
  chunk_count: usize,
}

impl AllocatorGroup {
  fn open(index: usize, class: &SizeClass, chunk_size: usize, budget: AllocatorBudget) -> Self {
    let memory_range = budget.range_for(chunk_size);
    Self {
      index,
      chunk_size,
      members: vec![class.index()],
      min_size: class.size(),
      max_size: class.size(),
      memory_range,
      chunk_count: memory_range / chunk_size,
    }
  }
}

/// Single left-to-right pass over classes in increasing size order.
#[derive(Debug, Default)]
pub struct AllocatorGrouper {
  budget: AllocatorBudget,
  groups: Vec<AllocatorGroup>,
}

impl AllocatorGrouper {
  pub fn new(budget: AllocatorBudget) -> Self {
    Self {
      budget,
      groups: Vec::new(),
    }
  }

  /// Adds the next class and returns the allocator it was assigned to.
  pub fn push(&mut self, class: &SizeClass, geometry: &ChunkGeometry) -> usize {
    debug_assert_eq!(class.index(), geometry.class());

    if let Some(group) = self.groups.last_mut() {
      debug_assert!(group.max_size < class.size(), "classes must be pushed in order");
      if group.chunk_size == geometry.chunk_size() {
        group.members.push(class.index());
        group.max_size = class.size();
        return group.index;
      }
    }

    let index = self.groups.len();
    let group = AllocatorGroup::open(index, class, geometry.chunk_size(), self.budget);
    trace!(
      allocator = index,
      chunk_size = group.chunk_size,
      chunks = group.chunk_count,
      first = class.size(),
      "opened allocator"
    );
    self.groups.push(group);
    index
  }

  pub fn finish(self) -> Vec<AllocatorGroup> {
    self.groups
  }
}

/// Groups `classes` (sorted by size) with their matching `geometries`.
pub fn build_allocators(
  budget: AllocatorBudget,
  classes: &[SizeClass],
  geometries: &[ChunkGeometry],
) -> Vec<AllocatorGroup> {
  debug_assert_eq!(classes.len(), geometries.len());
  let mut grouper = AllocatorGrouper::new(budget);
  for (class, geometry) in classes.iter().zip(geometries) {
    grouper.push(class, geometry);
  }
  grouper.finish()
}
