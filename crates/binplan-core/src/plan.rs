use binplan_bitmap::BitmapLayout;
use getset::{
  CopyGetters,
  Getters,
};
use serde::Serialize;
use tracing::debug;

use crate::{
  chunk::{
    ChunkGeometry,
    ChunkSizer,
  },
  classes::{
    SizeClass,
    SizeClassIndex,
    SizeClassIndexer,
  },
  config::PlannerConfig,
  error::{
    PlanError,
    PlanResult,
  },
  group::{
    AllocatorGroup,
    AllocatorGrouper,
  },
};

/// Everything planned for one size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ClassPlan {
  class: SizeClass,
  geometry: ChunkGeometry,
  bitmap: BitmapLayout,
  allocator: usize,
}

/// One requested size and where it landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PlanEntry {
  requested: usize,
  class: SizeClassIndex,
  position: usize,
  allocator: usize,
}

/// Output tuple for a single requested size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTuple<'p> {
  pub requested: usize,
  pub bin: SizeClassIndex,
  pub canonical_size: usize,
  pub geometry: &'p ChunkGeometry,
  pub bitmap: &'p BitmapLayout,
  pub allocator: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
#[getset(get = "pub")]
pub struct Plan {
  classes: Vec<ClassPlan>,
  allocators: Vec<AllocatorGroup>,
  entries: Vec<PlanEntry>,
}

impl Plan {
  pub fn tuples(&self) -> impl Iterator<Item = PlanTuple<'_>> {
    self.entries.iter().map(|entry| {
      let planned = &self.classes[entry.position];
      PlanTuple {
        requested: entry.requested,
        bin: entry.class,
        canonical_size: planned.class.size(),
        geometry: &planned.geometry,
        bitmap: &planned.bitmap,
        allocator: entry.allocator,
      }
    })
  }

  /// Smallest planned class able to hold `size` bytes.
  pub fn lookup(&self, size: usize) -> Option<&ClassPlan> {
    let position = self
      .classes
      .partition_point(|planned| planned.class.size() < size);
    self.classes.get(position)
  }

  /// Classes whose chunk came from the bracket fallback.
  pub fn over_tolerance(&self) -> impl Iterator<Item = &ClassPlan> {
    self
      .classes
      .iter()
      .filter(|planned| !planned.geometry.within_tolerance())
  }

  /// Bitmap bytes needed for one chunk of every planned class.
  pub fn metadata_bytes(&self) -> usize {
    self
      .classes
      .iter()
      .map(|planned| planned.bitmap.footprint_bytes())
      .sum()
  }
}

#[derive(Debug, Clone)]
pub struct Planner {
  config: PlannerConfig,
  indexer: SizeClassIndexer,
}

impl Planner {
  pub fn new(config: PlannerConfig) -> PlanResult<Self> {
    config.validate()?;
    let indexer = SizeClassIndexer::from_config(&config);

    let largest = indexer.class_for(config.max_size()).size();
    if largest > config.max_chunk_size() {
      return Err(PlanError::ClassExceedsChunk {
        size: largest,
        chunk_size: config.max_chunk_size(),
      });
    }

    Ok(Self { config, indexer })
  }

  #[inline]
  pub fn config(&self) -> &PlannerConfig {
    &self.config
  }

  #[inline]
  pub fn indexer(&self) -> &SizeClassIndexer {
    &self.indexer
  }

  pub fn plan_class(&self, class: SizeClass) -> (ChunkGeometry, BitmapLayout) {
    let geometry = ChunkSizer::new(&self.config).plan(class);
    let bitmap = if geometry.is_dedicated() {
      BitmapLayout::dedicated()
    } else {
      BitmapLayout::plan(geometry.slots())
    };
    (geometry, bitmap)
  }

  /// Plans `sizes`, which must be strictly increasing and within
  /// `1..=max_size`.
  pub fn plan(&self, sizes: &[usize]) -> PlanResult<Plan> {
    let max = self.config.max_size();
    let mut previous: Option<usize> = None;
    let mut requested = Vec::with_capacity(sizes.len());

    for &size in sizes {
      if size == 0 || size > max {
        return Err(PlanError::SizeOutOfRange { size, max });
      }
      if let Some(previous) = previous.filter(|&previous| previous >= size) {
        return Err(PlanError::NotIncreasing { previous, size });
      }
      previous = Some(size);
      requested.push((size, self.indexer.class_for(size)));
    }

    Ok(self.assemble(requested))
  }

  /// Plans every size class of the configured domain.
  pub fn plan_all(&self) -> Plan {
    let requested = self
      .indexer
      .classes()
      .map(|class| (class.size(), class))
      .collect();
    self.assemble(requested)
  }

  fn assemble(&self, requested: Vec<(usize, SizeClass)>) -> Plan {
    let mut classes: Vec<ClassPlan> = Vec::new();
    let mut entries = Vec::with_capacity(requested.len());
    let mut grouper = AllocatorGrouper::new(self.config.budget());

    for (size, class) in requested {
      let reuse = classes
        .last()
        .is_some_and(|last| last.class.index() == class.index());
      if !reuse {
        let (geometry, bitmap) = self.plan_class(class);
        let allocator = grouper.push(&class, &geometry);
        classes.push(ClassPlan {
          class,
          geometry,
          bitmap,
          allocator,
        });
      }

      let position = classes.len() - 1;
      entries.push(PlanEntry {
        requested: size,
        class: class.index(),
        position,
        allocator: classes[position].allocator,
      });
    }

    let allocators = grouper.finish();
    debug!(
      requested = entries.len(),
      classes = classes.len(),
      allocators = allocators.len(),
      "plan complete"
    );

    Plan {
      classes,
      allocators,
      entries,
    }
  }
}
