//! Size-class binning and chunk layout planning.
//!
//! A [`plan::Planner`] classifies requested sizes into log-linear size
//! classes, picks a chunk size for each class, sizes the occupancy bitmap of
//! that chunk and folds classes sharing a chunk size into allocators. The
//! result is a plain [`plan::Plan`] value owned by the caller.

pub mod chunk;
pub mod classes;
pub mod config;
pub mod error;
pub mod group;
pub mod plan;


pub mod prelude {
  pub use binplan_bitmap::{
    BitmapLayout,
    Tracking,
    plan_bitmap,
  };

  pub use super::{
    chunk::{
      ChunkGeometry,
      ChunkKind,
      ChunkSizer,
    },
    classes::{
      SizeClass,
      SizeClassIndex,
      SizeClassIndexer,
    },
    config::{
      AllocatorBudget,
      ChunkBracket,
      GIB,
      KIB,
      MIB,
      PlannerConfig,
      SearchPolicy,
    },
    error::{
      PlanError,
      PlanResult,
    },
    group::{
      AllocatorGroup,
      AllocatorGrouper,
      build_allocators,
    },
    plan::{
      ClassPlan,
      Plan,
      PlanEntry,
      PlanTuple,
      Planner,
    },
  };
}
