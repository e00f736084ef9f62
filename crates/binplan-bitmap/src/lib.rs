#![cfg_attr(not(test), no_std)]

//! Sizing of the two-level occupancy bitmap that tracks the slots of a chunk.
//!
//! Small chunks (at most [`INLINE_SLOTS`] slots) are tracked by the single
//! summary word that lives in the chunk header. Larger chunks get an L2
//! detail level (one bit per slot) and an L1 level with one bit per L2 word,
//! so a free slot is found with at most three bit scans.

use binplan_sys::math::{
  align_down,
  align_to,
  ceil_pow2,
};
use getset::CopyGetters;
use serde::Serialize;


/// Slots a single inline summary word can track.
pub const INLINE_SLOTS: usize = 32;
/// Width of an L1 word and of a regular L2 word.
pub const NARROW_WORD_BITS: usize = 16;
/// Width of an L2 word once the detail level is compacted.
pub const WIDE_WORD_BITS: usize = 64;
/// Bytes of the fixed bitmap header (the inline summary word).
pub const HEADER_BYTES: usize = 4;

const L2_WORD_ALIGN: usize = 4;
const MIN_L1_WORDS: usize = 2;
/// Narrow L2 words past which the detail level is compacted into wide words.
const COMPACT_THRESHOLD: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tracking {
  /// One allocation per chunk, nothing to track.
  Dedicated,
  /// The inline summary word covers every slot.
  Inline,
  /// L1 summary words over L2 detail words.
  TwoLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, CopyGetters)]
pub struct BitmapLayout {
  #[getset(get_copy = "pub")]
  slots: usize,
  #[getset(get_copy = "pub")]
  tracking: Tracking,
  #[getset(get_copy = "pub")]
  l1_words: usize,
  #[getset(get_copy = "pub")]
  l2_words: usize,
  #[getset(get_copy = "pub")]
  l2_word_bits: usize,
}

impl BitmapLayout {
  /// Layout of a chunk that holds exactly one allocation.
  pub const fn dedicated() -> Self {
    Self {
      slots: 1,
      tracking: Tracking::Dedicated,
      l1_words: 0,
      l2_words: 0,
      l2_word_bits: 0,
    }
  }

  const fn inline(slots: usize) -> Self {
    Self {
      slots,
      tracking: Tracking::Inline,
      l1_words: 0,
      l2_words: 0,
      l2_word_bits: 0,
    }
  }

  pub fn plan(slots: usize) -> Self {
    if slots <= INLINE_SLOTS {
      return Self::inline(slots);
    }

    let narrow = align_to(slots.div_ceil(NARROW_WORD_BITS), L2_WORD_ALIGN);
    let (l2, l2_word_bits) = if slots / NARROW_WORD_BITS > COMPACT_THRESHOLD {
      // Four narrow words fold into one wide word. Rounding down must not
      // drop slots off the end of the level.
      let folded = align_down(narrow / L2_WORD_ALIGN, L2_WORD_ALIGN).unwrap_or(0);
      (folded.max(slots.div_ceil(WIDE_WORD_BITS)), WIDE_WORD_BITS)
    } else {
      (narrow, NARROW_WORD_BITS)
    };
    let l1 = (l2 + NARROW_WORD_BITS - 1)
      .div_ceil(NARROW_WORD_BITS)
      .max(MIN_L1_WORDS);

    Self {
      slots,
      tracking: Tracking::TwoLevel,
      l1_words: ceil_pow2(l1),
      l2_words: ceil_pow2(l2),
      l2_word_bits,
    }
  }

  /// Estimated metadata bytes for one chunk using this layout.
  pub const fn footprint_bytes(&self) -> usize {
    match self.tracking {
      Tracking::Dedicated => 0,
      Tracking::Inline => HEADER_BYTES,
      Tracking::TwoLevel => HEADER_BYTES + 2 * (self.l1_words + self.l2_words),
    }
  }

  /// Number of slots the layout is able to address.
  pub const fn capacity(&self) -> usize {
    match self.tracking {
      Tracking::Dedicated => 1,
      Tracking::Inline => INLINE_SLOTS,
      Tracking::TwoLevel => self.l2_words * self.l2_word_bits,
    }
  }

  #[inline]
  pub const fn is_hierarchical(&self) -> bool {
    matches!(self.tracking, Tracking::TwoLevel)
  }
}

/// Plans the bitmap for a chunk of `slots` slots.
#[inline]
pub fn plan_bitmap(slots: usize) -> BitmapLayout {
  BitmapLayout::plan(slots)
}
