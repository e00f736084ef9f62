const U64_BITS: u32 = u64::BITS;

/// Largest power of two that is `<= value`. `value` must be non-zero.
#[inline]
pub const fn floor_pow2(value: usize) -> usize {
  debug_assert!(value != 0, "floor_pow2 of zero");
  1usize << (usize::BITS - 1 - value.leading_zeros())
}

/// Smallest power of two that is `>= value`. `value` must be non-zero.
#[inline]
pub const fn ceil_pow2(value: usize) -> usize {
  debug_assert!(value != 0, "ceil_pow2 of zero");
  value.next_power_of_two()
}

/// `floor(log2(value))`. `value` must be non-zero.
#[inline]
pub const fn log2_floor(value: usize) -> u32 {
  debug_assert!(value != 0, "log2_floor of zero");
  U64_BITS - 1 - count_leading_zeros(value as u64)
}

#[inline]
pub const fn count_leading_zeros(value: u64) -> u32 {
  value.leading_zeros()
}

#[inline]
pub const fn count_trailing_zeros(value: u64) -> u32 {
  value.trailing_zeros()
}

pub const fn is_aligned(value: usize, align: usize) -> Option<bool> {
  if !align.is_power_of_two() {
    return None;
  }
  Some((value & (align - 1)) == 0)
}

pub const fn align_up(value: usize, align: usize) -> Option<usize> {
  if !align.is_power_of_two() {
    return None;
  }

  let mask = align - 1;
  if let Some(sum) = value.checked_add(mask) {
    return Some(sum & !mask);
  }

  None
}

pub const fn align_down(value: usize, align: usize) -> Option<usize> {
  if !align.is_power_of_two() {
    return None;
  }

  Some(value & !(align - 1))
}

/// Unchecked [`align_up`] for alignments known to be powers of two.
#[inline]
pub const fn align_to(value: usize, align: usize) -> usize {
  debug_assert!(align.is_power_of_two());
  (value + (align - 1)) & !(align - 1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_floor_pow2() {
    assert_eq!(floor_pow2(1), 1);
    assert_eq!(floor_pow2(2), 2);
    assert_eq!(floor_pow2(3), 2);
    assert_eq!(floor_pow2(8), 8);
    assert_eq!(floor_pow2(15), 8);
    assert_eq!(floor_pow2(16), 16);
    assert_eq!(floor_pow2(196_607), 131_072);
    assert_eq!(floor_pow2(usize::MAX), 1usize << (usize::BITS - 1));
  }

  #[test]
  fn test_ceil_pow2() {
    assert_eq!(ceil_pow2(1), 1);
    assert_eq!(ceil_pow2(2), 2);
    assert_eq!(ceil_pow2(3), 4);
    assert_eq!(ceil_pow2(9), 16);
    assert_eq!(ceil_pow2(16), 16);
    assert_eq!(ceil_pow2(196_608), 262_144);
  }

  #[test]
  fn test_log2_floor() {
    assert_eq!(log2_floor(1), 0);
    assert_eq!(log2_floor(2), 1);
    assert_eq!(log2_floor(255), 7);
    assert_eq!(log2_floor(256), 8);
    assert_eq!(log2_floor(256 * 1024 * 1024), 28);
  }

  #[test]
  fn test_bit_scans() {
    assert_eq!(count_leading_zeros(0), 64);
    assert_eq!(count_trailing_zeros(0), 64);
    assert_eq!(count_leading_zeros(1), 63);
    assert_eq!(count_trailing_zeros(1), 0);
    assert_eq!(count_leading_zeros(u64::MAX), 0);
    assert_eq!(count_trailing_zeros(0x8000_0000_0000_0000), 63);
    assert_eq!(count_leading_zeros(0x10), 59);
    assert_eq!(count_trailing_zeros(0x10), 4);
  }

  #[test]
  fn test_is_aligned() {
    assert_eq!(is_aligned(0, 1), Some(true));
    assert_eq!(is_aligned(0, 8), Some(true));

    assert_eq!(is_aligned(1, 1), Some(true));
    assert_eq!(is_aligned(1, 2), Some(false));

    assert_eq!(is_aligned(4, 4), Some(true));
    assert_eq!(is_aligned(4, 8), Some(false));

    assert_eq!(is_aligned(65_536, 65_536), Some(true));
    assert_eq!(is_aligned(65_535, 65_536), Some(false));

    assert_eq!(is_aligned(100, 3), None);
    assert_eq!(is_aligned(100, 6), None);
  }

  #[test]
  fn test_align_up() {
    assert_eq!(align_up(0, 1), Some(0));
    assert_eq!(align_up(0, 8), Some(0));

    assert_eq!(align_up(1, 8), Some(8));
    assert_eq!(align_up(7, 8), Some(8));
    assert_eq!(align_up(8, 8), Some(8));
    assert_eq!(align_up(9, 8), Some(16));

    assert_eq!(align_up(3, 4), Some(4));
    assert_eq!(align_up(5, 4), Some(8));

    assert_eq!(align_up(100, 3), None);
    assert_eq!(align_up(100, 5), None);
  }

  #[test]
  fn test_align_down() {
    assert_eq!(align_down(0, 8), Some(0));
    assert_eq!(align_down(7, 8), Some(0));
    assert_eq!(align_down(8, 8), Some(8));
    assert_eq!(align_down(15, 8), Some(8));
    assert_eq!(align_down(123, 64), Some(64));

    assert_eq!(align_down(100, 3), None);
  }

  #[test]
  fn test_align_to() {
    assert_eq!(align_to(0, 4), 0);
    assert_eq!(align_to(1, 4), 4);
    assert_eq!(align_to(4, 4), 4);
    assert_eq!(align_to(513, 4), 516);
    assert_eq!(align_to(65_537, 65_536), 131_072);
  }

  #[test]
  fn test_alignment_edge_cases() {
    assert_eq!(align_up(usize::MAX - 6, 8), None);
    assert_eq!(align_up(usize::MAX, 8), None);

    let max_align = 1usize << (usize::BITS - 1);
    assert_eq!(is_aligned(0, max_align), Some(true));
    assert_eq!(is_aligned(1, max_align), Some(false));
    assert_eq!(align_up(1, max_align), Some(max_align));
    assert_eq!(align_up(max_align + 1, max_align), None);
  }
}
