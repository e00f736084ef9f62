#![cfg_attr(not(test), no_std)]

pub mod math;
pub mod prim;

pub mod prelude {
  pub use super::{
    math::{
      align_down,
      align_to,
      align_up,
      ceil_pow2,
      count_leading_zeros,
      count_trailing_zeros,
      floor_pow2,
      is_aligned,
      log2_floor,
    },
    prim::{
      page_size,
      word_width,
    },
  };
}
