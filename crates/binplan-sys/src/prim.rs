use core::sync::atomic::{
  AtomicBool,
  AtomicUsize,
  Ordering,
};

#[cfg(not(unix))]
const COMMON_PAGE_SIZE: usize = 4096;

/// Bytes in a machine word.
pub const fn word_width() -> usize {
  core::mem::size_of::<usize>()
}

#[cfg(unix)]
fn page_size_helper() -> usize {
  // SAFETY: sysconf has no preconditions.
  let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
  if size <= 0 { 4096 } else { size as usize }
}

#[cfg(not(unix))]
fn page_size_helper() -> usize {
  COMMON_PAGE_SIZE
}

/// Page size of the host, queried once.
pub fn page_size() -> usize {
  static PAGE_SIZE: AtomicUsize = AtomicUsize::new(0);
  static INIT: AtomicBool = AtomicBool::new(false);

  if !INIT.load(Ordering::Acquire) {
    let size = page_size_helper();
    PAGE_SIZE.store(size, Ordering::Release);
    INIT.store(true, Ordering::Release);
    size
  } else {
    PAGE_SIZE.load(Ordering::Acquire)
  }
}
