//! Plans size classes, chunk geometry, occupancy bitmaps and allocator
//! groups for a slab allocator.

pub use binplan_core::{
  chunk,
  classes,
  config,
  error,
  group,
  plan,
};

pub mod prelude {
  pub use binplan_core::prelude::*;
  pub use binplan_sys::prelude::*;
}

use binplan_core::{
  config::PlannerConfig,
  error::PlanResult,
  plan::{
    Plan,
    Planner,
  },
};

/// Plans `sizes` with the default configuration.
pub fn plan(sizes: &[usize]) -> PlanResult<Plan> {
  Planner::new(PlannerConfig::default())?.plan(sizes)
}
