//! Log-linear size classes.
//!
//! Sizes up to `granularity * subdivisions` are binned linearly in
//! `granularity` steps. Above that every power-of-two octave `(f, 2f]` is
//! split into `subdivisions` equal steps of `f / subdivisions` bytes. Sizes
//! always round up to their class, never down.

use binplan_sys::math::{
  align_up,
  count_leading_zeros,
  floor_pow2,
  log2_floor,
};
use serde::Serialize;

use crate::config::PlannerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SizeClassIndex(usize);

impl SizeClassIndex {
  #[inline]
  pub const fn get(self) -> usize {
    self.0
  }
}

impl From<SizeClassIndex> for usize {
  fn from(index: SizeClassIndex) -> Self {
    index.0
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SizeClass {
  index: SizeClassIndex,
  size: usize,
}

impl SizeClass {
  #[inline]
  pub const fn index(&self) -> SizeClassIndex {
    self.index
  }

  /// Canonical byte size served by this class.
  #[inline]
  pub const fn size(&self) -> usize {
    self.size
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeClassIndexer {
  granularity: usize,
  granularity_shift: u32,
  subdivisions: usize,
  subdivision_shift: u32,
  linear_shift: u32,
  max_size: usize,
}

impl SizeClassIndexer {
  /// `granularity` and `subdivisions` must be powers of two.
  pub const fn new(granularity: usize, subdivisions: usize, max_size: usize) -> Self {
    let granularity_shift = granularity.trailing_zeros();
    let subdivision_shift = subdivisions.trailing_zeros();
    Self {
      granularity,
      granularity_shift,
      subdivisions,
      subdivision_shift,
      linear_shift: granularity_shift + subdivision_shift,
      max_size,
    }
  }

  pub fn from_config(config: &PlannerConfig) -> Self {
    Self::new(config.granularity(), config.subdivisions(), config.max_size())
  }

  #[inline]
  pub const fn max_size(&self) -> usize {
    self.max_size
  }

  #[inline]
  const fn linear_limit(&self) -> usize {
    1 << self.linear_shift
  }

  /// Class index for `size`. Sizes below the granularity share class 0.
  pub fn index(&self, size: usize) -> SizeClassIndex {
    let size = size.max(self.granularity);
    if size <= self.linear_limit() {
      return SizeClassIndex((size - 1) >> self.granularity_shift);
    }

    // Classes cover (f, 2f], so classify by the octave of `size - 1`.
    let v = size - 1;
    let f = floor_pow2(v);
    let octave = u64::BITS - 1 - count_leading_zeros(f as u64);
    let shift = octave - self.subdivision_shift;
    let position = (v >> shift) & (self.subdivisions - 1);
    let bracket = (octave - self.linear_shift) as usize;

    SizeClassIndex(self.subdivisions + (bracket << self.subdivision_shift) + position)
  }

  /// Canonical size of `index`: the largest size that maps to it. Saturates
  /// at `usize::MAX` for the top octave of the address space.
  pub fn size_of(&self, index: SizeClassIndex) -> usize {
    let index = index.0;
    if index < self.subdivisions {
      return (index + 1) << self.granularity_shift;
    }

    let log_index = index - self.subdivisions;
    let position = log_index & (self.subdivisions - 1);
    u32::try_from(log_index >> self.subdivision_shift)
      .ok()
      .and_then(|bracket| 1usize.checked_shl(bracket + self.granularity_shift))
      .and_then(|step| step.checked_mul(self.subdivisions + position + 1))
      .unwrap_or(usize::MAX)
  }

  pub fn class_for(&self, size: usize) -> SizeClass {
    let index = self.index(size);
    SizeClass {
      index,
      size: self.size_of(index),
    }
  }

  /// Class for a request that must also honour `align`. Returns `None` for
  /// a non power-of-two alignment or when no class up to `max_size` is
  /// aligned.
  pub fn class_for_aligned(&self, size: usize, align: usize) -> Option<SizeClass> {
    let size = align_up(size, align)?;
    let mut class = self.class(self.index(size).0)?;
    // Every class size is a multiple of its step, and steps are powers of
    // two, so walking up reaches an aligned size quickly.
    while class.size % align != 0 {
      class = self.class(class.index.0 + 1)?;
    }
    Some(class)
  }

  pub fn class(&self, index: usize) -> Option<SizeClass> {
    if index >= self.class_count() {
      return None;
    }
    let index = SizeClassIndex(index);
    Some(SizeClass {
      index,
      size: self.size_of(index),
    })
  }

  /// Number of classes needed to cover `1..=max_size`.
  pub fn class_count(&self) -> usize {
    self.index(self.max_size).0 + 1
  }

  pub fn classes(&self) -> impl Iterator<Item = SizeClass> + '_ {
    (0..self.class_count()).filter_map(|index| self.class(index))
  }

  /// Octave of `size`, counted from the end of the linear region.
  pub fn octave(&self, size: usize) -> Option<u32> {
    let size = size.max(self.granularity);
    if size <= self.linear_limit() {
      return None;
    }
    Some(log2_floor(size - 1) - self.linear_shift)
  }
}

impl Default for SizeClassIndexer {
  fn default() -> Self {
    Self::from_config(&PlannerConfig::default())
  }
}
