use binplan_sys::math::ceil_pow2;
use getset::CopyGetters;
use serde::Serialize;
use tracing::{
  debug,
  trace,
};

use crate::{
  classes::{
    SizeClass,
    SizeClassIndex,
  },
  config::{
    PlannerConfig,
    SearchPolicy,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChunkKind {
  /// Many slots per chunk, tracked by a bitmap.
  Slab,
  /// The chunk holds a single allocation.
  Dedicated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ChunkGeometry {
  class: SizeClassIndex,
  slot_size: usize,
  chunk_size: usize,
  page_size: usize,
  slots: usize,
  used_pages: usize,
  waste: usize,
  kind: ChunkKind,
  within_tolerance: bool,
}

impl ChunkGeometry {
  fn new(class: SizeClass, chunk_size: usize, page_size: usize, within_tolerance: bool) -> Self {
    let slots = chunk_size / class.size();
    let kind = if slots <= 1 {
      ChunkKind::Dedicated
    } else {
      ChunkKind::Slab
    };

    Self {
      class: class.index(),
      slot_size: class.size(),
      chunk_size,
      page_size,
      slots,
      used_pages: chunk_size / page_size,
      waste: chunk_size % class.size(),
      kind,
      within_tolerance,
    }
  }

  #[inline]
  pub const fn is_dedicated(&self) -> bool {
    matches!(self.kind, ChunkKind::Dedicated)
  }

  /// Bytes covered by whole slots.
  #[inline]
  pub const fn slot_bytes(&self) -> usize {
    self.slots * self.slot_size
  }

  /// Pages touched by whole slots; the rest of the chunk never needs to be
  /// committed.
  pub const fn committed_pages(&self) -> usize {
    self.slot_bytes().div_ceil(self.page_size)
  }

  /// Bytes past the last committed page.
  pub const fn tail_bytes(&self) -> usize {
    self.chunk_size - self.committed_pages() * self.page_size
  }

  pub const fn waste_per_mille(&self) -> usize {
    self.waste * 1000 / self.chunk_size
  }

  /// Largest slot count whose bytes end exactly on a page boundary, with the
  /// number of pages it spans. `None` when even a single page cannot be
  /// filled exactly.
  pub const fn exact_fit(&self) -> Option<(usize, usize)> {
    let step = self.page_size / gcd(self.slot_size, self.page_size);
    let count = self.slots - self.slots % step;
    if count == 0 {
      return None;
    }
    Some((count, count * self.slot_size / self.page_size))
  }
}

const fn gcd(mut a: usize, mut b: usize) -> usize {
  while b != 0 {
    let t = b;
    b = a % b;
    a = t;
  }
  a
}

/// Picks the chunk size for each size class.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSizer<'cfg> {
  config: &'cfg PlannerConfig,
}

impl<'cfg> ChunkSizer<'cfg> {
  pub const fn new(config: &'cfg PlannerConfig) -> Self {
    Self { config }
  }

  /// Smallest chunk able to hold one slot of `size` bytes.
  pub fn floor(&self, size: usize) -> usize {
    ceil_pow2(size).max(self.config.page_size())
  }

  /// Largest chunk considered for `size`: the bracket default, clamped to the
  /// configured maximum and never below [`ChunkSizer::floor`].
  pub fn ceiling(&self, size: usize) -> usize {
    let max = self.config.max_chunk_size();
    let bracket = self.config.bracket_chunk(size).unwrap_or(max);
    bracket.min(max).max(self.floor(size))
  }

  /// Candidate chunk sizes for `size`, largest first.
  pub fn candidates(&self, size: usize) -> impl Iterator<Item = usize> {
    let floor = self.floor(size);
    core::iter::successors(Some(self.ceiling(size)), move |&cs| {
      (cs / 2 >= floor).then_some(cs / 2)
    })
  }

  #[inline]
  pub fn within_tolerance(&self, chunk_size: usize, waste: usize) -> bool {
    let limit = (chunk_size as u128 * self.config.waste_percent() as u128) / 100;
    waste as u128 <= limit
  }

  /// Chunk size chosen by the ladder search, or `None` if no candidate keeps
  /// the waste within tolerance.
  pub fn search(&self, size: usize) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for cs in self.candidates(size) {
      let waste = cs % size;
      if !self.within_tolerance(cs, waste) {
        trace!(size, chunk_size = cs, waste, "candidate over tolerance");
        continue;
      }
      match self.config.policy() {
        SearchPolicy::FirstWithinTolerance => return Some(cs),
        SearchPolicy::MinimumWithinTolerance => {
          if best.is_none_or(|(_, lowest)| waste <= lowest) {
            best = Some((cs, waste));
          }
        }
      }
    }
    best.map(|(cs, _)| cs)
  }

  pub fn plan(&self, class: SizeClass) -> ChunkGeometry {
    let page_size = self.config.page_size();
    let geometry = match self.search(class.size()) {
      Some(cs) => ChunkGeometry::new(class, cs, page_size, true),
      None => {
        let cs = self.ceiling(class.size());
        debug!(
          size = class.size(),
          chunk_size = cs,
          waste = cs % class.size(),
          "no chunk within waste tolerance, using bracket default"
        );
        ChunkGeometry::new(class, cs, page_size, false)
      }
    };

    debug!(
      class = class.index().get(),
      size = class.size(),
      chunk_size = geometry.chunk_size,
      slots = geometry.slots,
      waste = geometry.waste,
      "planned chunk"
    );
    geometry
  }
}
