use binplan_sys::prim::{
  page_size,
  word_width,
};
use getset::{
  CopyGetters,
  Getters,
};

use crate::error::{
  PlanError,
  PlanResult,
};

pub const KIB: usize = 1 << 10;
pub const MIB: usize = 1 << 20;
pub const GIB: usize = 1 << 30;

pub const DEFAULT_PAGE_SIZE: usize = 64 * KIB;
pub const DEFAULT_MAX_CHUNK_SIZE: usize = GIB;
pub const DEFAULT_GRANULARITY: usize = 8;
pub const DEFAULT_MAX_SIZE: usize = 256 * MIB;
pub const DEFAULT_SUBDIVISIONS: usize = 16;
pub const DEFAULT_WASTE_PERCENT: usize = 1;
pub const DEFAULT_ALLOCATOR_RANGE: usize = GIB;
pub const DEFAULT_MIN_CHUNKS: usize = 16;

/// Chunk size used for every class up to `max_size` when the ladder search
/// finds nothing within tolerance. Also caps the ladder for those classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBracket {
  pub max_size: usize,
  pub chunk_size: usize,
}

impl ChunkBracket {
  pub const fn new(max_size: usize, chunk_size: usize) -> Self {
    Self {
      max_size,
      chunk_size,
    }
  }
}

pub const DEFAULT_BRACKETS: [ChunkBracket; 6] = [
  ChunkBracket::new(256, 64 * KIB),
  ChunkBracket::new(2 * KIB, 512 * KIB),
  ChunkBracket::new(32 * KIB, 4 * MIB),
  ChunkBracket::new(512 * KIB - 1, 32 * MIB),
  ChunkBracket::new(16 * MIB - 1, 64 * MIB),
  ChunkBracket::new(usize::MAX, GIB),
];

/// Address space reserved for each allocator. An allocator gets
/// `memory_range` bytes, or room for `min_chunks` chunks when its chunks are
/// large enough that the range would hold fewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorBudget {
  pub memory_range: usize,
  pub min_chunks: usize,
}

impl AllocatorBudget {
  pub const fn new(memory_range: usize, min_chunks: usize) -> Self {
    Self {
      memory_range,
      min_chunks,
    }
  }

  /// Bytes reserved for an allocator serving `chunk_size` byte chunks.
  pub const fn range_for(&self, chunk_size: usize) -> usize {
    let floor = chunk_size.saturating_mul(self.min_chunks);
    if floor > self.memory_range {
      floor
    } else {
      self.memory_range
    }
  }
}

impl Default for AllocatorBudget {
  fn default() -> Self {
    Self::new(DEFAULT_ALLOCATOR_RANGE, DEFAULT_MIN_CHUNKS)
  }
}

/// How the chunk ladder is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPolicy {
  /// Smallest chunk among those with the lowest in-tolerance waste.
  #[default]
  MinimumWithinTolerance,
  /// Largest chunk whose waste is within tolerance.
  FirstWithinTolerance,
}

#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct PlannerConfig {
  #[getset(get_copy = "pub")]
  page_size: usize,
  #[getset(get_copy = "pub")]
  max_chunk_size: usize,
  #[getset(get_copy = "pub")]
  granularity: usize,
  #[getset(get_copy = "pub")]
  max_size: usize,
  #[getset(get_copy = "pub")]
  subdivisions: usize,
  #[getset(get_copy = "pub")]
  waste_percent: usize,
  #[getset(get_copy = "pub")]
  policy: SearchPolicy,
  #[getset(get_copy = "pub")]
  budget: AllocatorBudget,
  #[getset(get = "pub")]
  brackets: Vec<ChunkBracket>,
}

impl Default for PlannerConfig {
  fn default() -> Self {
    Self {
      page_size: DEFAULT_PAGE_SIZE,
      max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
      granularity: DEFAULT_GRANULARITY,
      max_size: DEFAULT_MAX_SIZE,
      subdivisions: DEFAULT_SUBDIVISIONS,
      waste_percent: DEFAULT_WASTE_PERCENT,
      policy: SearchPolicy::default(),
      budget: AllocatorBudget::default(),
      brackets: DEFAULT_BRACKETS.to_vec(),
    }
  }
}

impl PlannerConfig {
  /// Default configuration using the page size and word width of the
  /// running host.
  pub fn host() -> Self {
    Self::default()
      .with_page_size(page_size())
      .with_granularity(word_width())
  }

  #[must_use]
  pub fn with_page_size(mut self, page_size: usize) -> Self {
    self.page_size = page_size;
    self
  }

  #[must_use]
  pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
    self.max_chunk_size = max_chunk_size;
    self
  }

  #[must_use]
  pub fn with_granularity(mut self, granularity: usize) -> Self {
    self.granularity = granularity;
    self
  }

  #[must_use]
  pub fn with_max_size(mut self, max_size: usize) -> Self {
    self.max_size = max_size;
    self
  }

  #[must_use]
  pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
    self.subdivisions = subdivisions;
    self
  }

  #[must_use]
  pub fn with_waste_percent(mut self, waste_percent: usize) -> Self {
    self.waste_percent = waste_percent;
    self
  }

  #[must_use]
  pub fn with_policy(mut self, policy: SearchPolicy) -> Self {
    self.policy = policy;
    self
  }

  #[must_use]
  pub fn with_budget(mut self, budget: AllocatorBudget) -> Self {
    self.budget = budget;
    self
  }

  #[must_use]
  pub fn with_brackets(mut self, brackets: Vec<ChunkBracket>) -> Self {
    self.brackets = brackets;
    self
  }

  /// Default chunk size for a class of `size` bytes, if a bracket covers it.
  pub fn bracket_chunk(&self, size: usize) -> Option<usize> {
    self
      .brackets
      .iter()
      .find(|bracket| size <= bracket.max_size)
      .map(|bracket| bracket.chunk_size)
  }

  pub fn validate(&self) -> PlanResult<()> {
    if !self.page_size.is_power_of_two() {
      return Err(PlanError::InvalidPageSize {
        page_size: self.page_size,
      });
    }
    if !self.max_chunk_size.is_power_of_two() || self.max_chunk_size < self.page_size {
      return Err(PlanError::InvalidChunkSize {
        chunk_size: self.max_chunk_size,
        page_size: self.page_size,
      });
    }
    if !self.granularity.is_power_of_two() {
      return Err(PlanError::InvalidGranularity {
        granularity: self.granularity,
      });
    }
    if !self.subdivisions.is_power_of_two() {
      return Err(PlanError::InvalidSubdivisions {
        subdivisions: self.subdivisions,
      });
    }
    if self.waste_percent > 100 {
      return Err(PlanError::InvalidTolerance {
        percent: self.waste_percent,
      });
    }
    if self.max_size < self.granularity {
      return Err(PlanError::InvalidMaxSize {
        max_size: self.max_size,
        granularity: self.granularity,
      });
    }
    if self.max_size > self.max_chunk_size {
      return Err(PlanError::ClassExceedsChunk {
        size: self.max_size,
        chunk_size: self.max_chunk_size,
      });
    }
    if self.budget.memory_range == 0 || self.budget.min_chunks == 0 {
      return Err(PlanError::InvalidBudget {
        memory_range: self.budget.memory_range,
        min_chunks: self.budget.min_chunks,
      });
    }
    if let Some(bracket) = self
      .brackets
      .iter()
      .find(|bracket| !bracket.chunk_size.is_power_of_two())
    {
      return Err(PlanError::InvalidBracket {
        chunk_size: bracket.chunk_size,
      });
    }
    Ok(())
  }
}
