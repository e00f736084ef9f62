use binplan::prelude::*;
use rand::{
  Rng,
  SeedableRng,
  rngs::StdRng,
};

const MAX_SIZE: usize = 256 * MIB;

fn configs() -> Vec<PlannerConfig> {
  vec![
    PlannerConfig::default(),
    PlannerConfig::host(),
    PlannerConfig::default().with_subdivisions(4),
    PlannerConfig::default().with_subdivisions(8),
    PlannerConfig::default().with_policy(SearchPolicy::FirstWithinTolerance),
    PlannerConfig::default().with_page_size(4 * KIB),
    PlannerConfig::default().with_waste_percent(0),
  ]
}

fn sorted_samples(seed: u64, count: usize) -> Vec<usize> {
  let mut rng = StdRng::seed_from_u64(seed);
  let mut sizes: Vec<usize> = (0..count)
    .map(|_| {
      // Spread samples over the octaves instead of the linear range.
      let octave = rng.random_range(0..=28u32);
      rng.random_range(1..=(1usize << octave)).min(MAX_SIZE)
    })
    .collect();
  sizes.sort_unstable();
  sizes.dedup();
  sizes
}

#[test]
fn canonical_size_never_under_allocates() {
  let indexer = SizeClassIndexer::default();
  let sizes = sorted_samples(0x5eed, 20_000);

  let mut last = indexer.index(1);
  for size in sizes {
    let index = indexer.index(size);
    assert!(indexer.size_of(index) >= size, "class too small for {size}");
    assert!(index >= last, "index decreased at {size}");
    last = index;
  }
}

#[test]
fn bins_are_contiguous_ranges() {
  for config in configs() {
    let indexer = SizeClassIndexer::from_config(&config);
    let mut previous_size = 0;
    for class in indexer.classes() {
      let index = class.index().get();
      assert!(class.size() > previous_size);
      assert_eq!(indexer.index(class.size()), class.index());
      assert_eq!(indexer.index(previous_size + 1), class.index());
      assert_eq!(indexer.index(class.size() + 1).get(), index + 1);
      previous_size = class.size();
    }
    assert!(previous_size >= config.max_size());
  }
}

#[test]
fn geometry_is_page_consistent() {
  for config in configs() {
    let planner = Planner::new(config.clone()).unwrap();
    let page = config.page_size();
    for planned in planner.plan_all().classes() {
      let geometry = planned.geometry();
      let used = geometry.used_pages() * page;
      assert_eq!(used % page, 0);
      assert!(geometry.slots() >= 1);
      assert!(geometry.slots() * planned.class().size() <= used);
      assert_eq!(geometry.slots() * planned.class().size() + geometry.waste(), used);
      assert!(used <= geometry.chunk_size());
      assert!(geometry.chunk_size().is_power_of_two());
      assert_eq!(geometry.is_dedicated(), geometry.slots() == 1);
    }
  }
}

#[test]
fn bitmaps_are_power_of_two_sized() {
  for config in configs() {
    let planner = Planner::new(config).unwrap();
    for planned in planner.plan_all().classes() {
      let bitmap = planned.bitmap();
      let slots = planned.geometry().slots();
      assert_eq!(bitmap.slots(), slots);
      assert!(bitmap.capacity() >= slots);
      if planned.geometry().is_dedicated() {
        assert_eq!(bitmap.tracking(), Tracking::Dedicated);
      } else if slots <= 32 {
        assert_eq!(bitmap.tracking(), Tracking::Inline);
        assert_eq!((bitmap.l1_words(), bitmap.l2_words()), (0, 0));
      } else {
        assert!(bitmap.l1_words().is_power_of_two());
        assert!(bitmap.l2_words().is_power_of_two());
        assert!(bitmap.l1_words() >= 2);
      }
    }
  }
}

#[test]
fn allocators_group_contiguous_classes() {
  for config in configs() {
    let planner = Planner::new(config).unwrap();
    let plan = planner.plan_all();

    let mut position = 0;
    for group in plan.allocators() {
      assert!(!group.members().is_empty());
      for member in group.members() {
        let planned = &plan.classes()[position];
        assert_eq!(planned.class().index(), *member);
        assert_eq!(planned.allocator(), group.index());
        assert_eq!(planned.geometry().chunk_size(), group.chunk_size());
        position += 1;
      }
      assert_eq!(group.chunk_count() * group.chunk_size(), group.memory_range());
      let first = plan.lookup(group.min_size()).unwrap();
      assert_eq!(first.class().index(), group.members()[0]);
    }
    assert_eq!(position, plan.classes().len());
  }
}

#[test]
fn planning_is_idempotent() {
  let planner = Planner::new(PlannerConfig::default()).unwrap();

  let first = serde_json::to_string(&planner.plan_all()).unwrap();
  let second = serde_json::to_string(&planner.plan_all()).unwrap();
  assert_eq!(first, second);

  let sizes = sorted_samples(42, 500);
  let first = serde_json::to_string(&planner.plan(&sizes).unwrap()).unwrap();
  let fresh = Planner::new(PlannerConfig::default()).unwrap();
  let second = serde_json::to_string(&fresh.plan(&sizes).unwrap()).unwrap();
  assert_eq!(first, second);
}

#[test]
fn tuples_follow_input_order() {
  let sizes = sorted_samples(7, 300);
  let plan = binplan::plan(&sizes).unwrap();
  let indexer = SizeClassIndexer::default();

  let tuples: Vec<PlanTuple<'_>> = plan.tuples().collect();
  assert_eq!(tuples.len(), sizes.len());
  for (tuple, &size) in tuples.iter().zip(&sizes) {
    assert_eq!(tuple.requested, size);
    assert_eq!(tuple.bin, indexer.index(size));
    assert_eq!(tuple.canonical_size, indexer.size_of(tuple.bin));
    assert_eq!(tuple.geometry.class(), tuple.bin);
    assert!(tuple.allocator < plan.allocators().len());
  }
}

#[test]
fn documented_scenarios() {
  let plan = binplan::plan(&[8, 192 * KIB, 256 * MIB]).unwrap();
  let tuples: Vec<PlanTuple<'_>> = plan.tuples().collect();

  let small = &tuples[0];
  assert_eq!((small.bin.get(), small.canonical_size), (0, 8));
  assert_eq!(small.geometry.chunk_size(), 64 * KIB);
  assert_eq!(small.geometry.slots(), 8192);
  assert!(small.bitmap.l1_words() > 0 && small.bitmap.l2_words() > 0);

  let medium = &tuples[1];
  assert_eq!(medium.canonical_size, 192 * KIB);
  assert!(medium.geometry.chunk_size() >= 192 * KIB);
  assert!(medium.geometry.slots() >= 1);

  let large = &tuples[2];
  assert!(large.geometry.is_dedicated());
  assert_eq!((large.bitmap.l1_words(), large.bitmap.l2_words()), (0, 0));

  assert_eq!(plan.allocators().len(), 3);
}
