use thiserror::Error;

pub type PlanResult<T> = Result<T, PlanError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
  #[error("page size {page_size} is not a power of two")]
  InvalidPageSize { page_size: usize },

  #[error("maximum chunk size {chunk_size} must be a power of two of at least one page ({page_size})")]
  InvalidChunkSize { chunk_size: usize, page_size: usize },

  #[error("granularity {granularity} is not a power of two")]
  InvalidGranularity { granularity: usize },

  #[error("subdivisions per octave {subdivisions} is not a power of two")]
  InvalidSubdivisions { subdivisions: usize },

  #[error("waste tolerance {percent}% is out of range (0..=100)")]
  InvalidTolerance { percent: usize },

  #[error("bracket chunk size {chunk_size} is not a power of two")]
  InvalidBracket { chunk_size: usize },

  #[error("maximum size {max_size} is below the granularity {granularity}")]
  InvalidMaxSize { max_size: usize, granularity: usize },

  #[error("allocator budget of {memory_range} bytes and {min_chunks} chunks must be non-zero")]
  InvalidBudget { memory_range: usize, min_chunks: usize },

  #[error("largest size class ({size} bytes) does not fit a {chunk_size} byte chunk")]
  ClassExceedsChunk { size: usize, chunk_size: usize },

  #[error("size {size} is outside of 1..={max}")]
  SizeOutOfRange { size: usize, max: usize },

  #[error("sizes must be strictly increasing ({size} follows {previous})")]
  NotIncreasing { previous: usize, size: usize },
}
