use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex, OnceLock,
        atomic::{AtomicBool, AtomicI64, Ordering},
        mpsc,
    },
    thread::scope,
    time::{Duration, Instant},
};

use crate::{
    BitLayout, Clock, Epoch, Generator, IdGenStatus, MonotonicClock, TimeSource, time::UNIT_NANOS,
};

struct MockTime {
    nanos: i64,
}

impl TimeSource for MockTime {
    fn current_nanos(&self) -> i64 {
        self.nanos
    }
}

#[derive(Clone)]
struct SharedMockStepTime {
    nanos: Arc<AtomicI64>,
}

impl SharedMockStepTime {
    fn at_unit(unit: i64) -> Self {
        Self {
            nanos: Arc::new(AtomicI64::new(unit * UNIT_NANOS)),
        }
    }

    fn set_unit(&self, unit: i64) {
        self.nanos.store(unit * UNIT_NANOS, Ordering::Relaxed);
    }
}

impl TimeSource for SharedMockStepTime {
    fn current_nanos(&self) -> i64 {
        self.nanos.load(Ordering::Relaxed)
    }
}

fn at_unit(unit: i64) -> Clock<MockTime> {
    Clock::new(
        MockTime {
            nanos: unit * UNIT_NANOS,
        },
        Epoch::UNIX,
    )
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> i64;
    fn unwrap_pending(self) -> Duration;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> i64 {
        match self {
            Self::Ready { id } => id,
            other => panic!("unexpected {other:?}"),
        }
    }

    fn unwrap_pending(self) -> Duration {
        match self {
            Self::Pending { yield_for } => yield_for,
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test]
fn sequence_increments_within_same_unit() {
    let generator = Generator::with_clock(BitLayout::common(9), at_unit(42));
    let layout = *generator.layout();

    let id1 = generator.poll_id().unwrap_ready();
    let id2 = generator.poll_id().unwrap_ready();
    let id3 = generator.poll_id().unwrap_ready();

    for (id, seq) in [(id1, 0), (id2, 1), (id3, 2)] {
        assert_eq!(layout.time_unit_of(id), 42);
        assert_eq!(layout.sequence_of(id), seq);
        assert_eq!(layout.discriminator_of(id), 9);
    }
    assert!(id1 < id2 && id2 < id3);
    assert_eq!(generator.last_issued(), id3);
}

#[test]
fn first_id_at_unit_zero_starts_at_sequence_one() {
    // The empty register reads as unit 0, sequence 0.
    let generator = Generator::with_clock(BitLayout::common(0), at_unit(0));
    let id = generator.poll_id().unwrap_ready();
    assert_eq!(id, generator.layout().pack(0, 1));
}

#[test]
fn pending_when_sequence_exhausted() {
    let layout = BitLayout::common(1);
    let generator =
        Generator::with_last_issued(layout, at_unit(42), layout.pack(42, layout.seq_mask()));

    let yield_for = generator.poll_id().unwrap_pending();
    assert_eq!(yield_for, Duration::from_nanos(UNIT_NANOS as u64));
    // A pending attempt leaves the register untouched.
    assert_eq!(generator.last_issued(), layout.pack(42, layout.seq_mask()));
}

#[test]
fn pending_waits_only_for_the_rest_of_the_unit() {
    let layout = BitLayout::common(1);
    let clock = Clock::new(
        MockTime {
            nanos: 42 * UNIT_NANOS + 1_000,
        },
        Epoch::UNIX,
    );
    let generator = Generator::with_last_issued(layout, clock, layout.pack(42, layout.seq_mask()));

    let yield_for = generator.poll_id().unwrap_pending();
    assert_eq!(yield_for, Duration::from_nanos(UNIT_NANOS as u64 - 1_000));
}

#[test]
fn handles_rollover() {
    let time = SharedMockStepTime::at_unit(42);
    let generator = Generator::with_clock(BitLayout::common(1), Clock::new(time.clone(), Epoch::UNIX));
    let layout = *generator.layout();

    for seq in 0..=layout.seq_mask() {
        let id = generator.poll_id().unwrap_ready();
        assert_eq!(layout.sequence_of(id), seq);
        assert_eq!(layout.time_unit_of(id), 42);
    }
    generator.poll_id().unwrap_pending();

    time.set_unit(43);

    let id = generator.poll_id().unwrap_ready();
    assert_eq!(layout.time_unit_of(id), 43);
    assert_eq!(layout.sequence_of(id), 0);
}

#[test]
fn wrapped_timestamp_restarts_sequence() {
    // 16 time units, two identifiers per unit.
    let layout = BitLayout::new(4, 1, 0, 0).unwrap();
    let time = SharedMockStepTime::at_unit(15);
    let generator = Generator::with_clock(layout, Clock::new(time.clone(), Epoch::UNIX));

    assert_eq!(generator.poll_id().unwrap_ready(), layout.pack(15, 0));
    assert_eq!(generator.poll_id().unwrap_ready(), layout.pack(15, 1));
    generator.poll_id().unwrap_pending();

    // Unit 16 masks back to 0.
    time.set_unit(16);
    assert_eq!(generator.next_id_within(1), Some(layout.pack(0, 0)));
    assert_eq!(generator.next_id_within(1), Some(layout.pack(0, 1)));

    time.set_unit(20);
    assert_eq!(generator.next_id_within(1), Some(layout.pack(4, 0)));
}

#[test]
fn reaching_a_future_epoch_restarts_sequence() {
    let layout = BitLayout::common(1);
    let time = SharedMockStepTime::at_unit(0);
    let epoch = Epoch::from_nanos(2 * UNIT_NANOS);
    let generator = Generator::with_clock(layout, Clock::new(time.clone(), epoch));

    // Before the epoch the unit is negative and masks near the top of the field.
    let early = generator.poll_id().unwrap_ready();
    assert_eq!(layout.time_unit_of(early), layout.max_time_unit() - 1);
    while let IdGenStatus::Ready { .. } = generator.poll_id() {}
    generator.poll_id().unwrap_pending();

    time.set_unit(2);
    let ids: Vec<i64> = (0..layout.ids_per_unit())
        .map(|_| generator.next_id_within(1).unwrap())
        .collect();
    assert!(ids.iter().all(|&id| layout.time_unit_of(id) == 0));
    assert_eq!(layout.sequence_of(ids[0]), 0);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    generator.poll_id().unwrap_pending();

    time.set_unit(3);
    assert_eq!(generator.next_id_within(1), Some(layout.pack(1, 0)));
}

#[test]
fn register_ahead_of_clock_restarts_sequence() {
    // Register seeded ahead of the clock, as after a wrap.
    let layout = BitLayout::benchmark(3);
    let generator =
        Generator::with_last_issued(layout, at_unit(42), layout.pack(50, layout.seq_mask()));

    let id = generator.poll_id().unwrap_ready();
    assert_eq!(id, layout.pack(42, 0));
}

#[test]
fn time_unit_is_relative_to_epoch() {
    let epoch = Epoch::DEFAULT;
    let clock = Clock::new(
        MockTime {
            nanos: epoch.as_nanos() + 1_000 * UNIT_NANOS + 5,
        },
        epoch,
    );
    let generator = Generator::with_clock(BitLayout::common(0), clock);
    let id = generator.poll_id().unwrap_ready();
    assert_eq!(generator.layout().time_unit_of(id), 1_000);
}

/// Issues one identifier from `target` the first time it is read, so the
/// caller's compare-and-swap is guaranteed to lose.
struct RacingTime {
    target: Arc<OnceLock<Arc<Generator<RacingTime>>>>,
    fired: AtomicBool,
}

impl TimeSource for RacingTime {
    fn current_nanos(&self) -> i64 {
        if !self.fired.swap(true, Ordering::Relaxed) {
            if let Some(generator) = self.target.get() {
                generator.poll_id().unwrap_ready();
            }
        }
        7 * UNIT_NANOS
    }
}

#[test]
fn lost_race_reports_contended_then_recovers() {
    let slot = Arc::new(OnceLock::new());
    let time = RacingTime {
        target: Arc::clone(&slot),
        fired: AtomicBool::new(false),
    };
    let generator = Arc::new(Generator::with_clock(
        BitLayout::common(2),
        Clock::new(time, Epoch::UNIX),
    ));
    assert!(slot.set(Arc::clone(&generator)).is_ok());
    let layout = *generator.layout();

    assert_eq!(generator.poll_id(), IdGenStatus::Contended);
    // The racing call issued sequence 0.
    assert_eq!(generator.last_issued(), layout.pack(7, 0));

    let id = generator.poll_id().unwrap_ready();
    assert_eq!(id, layout.pack(7, 1));
}

#[test]
fn next_id_within_gives_up_on_frozen_clock() {
    let layout = BitLayout::common(1);
    let generator =
        Generator::with_last_issued(layout, at_unit(42), layout.pack(42, layout.seq_mask()));
    assert_eq!(generator.next_id_within(3), None);
    assert_eq!(generator.next_id_within(0), None);
}

#[test]
fn next_id_within_issues_when_available() {
    let generator = Generator::with_clock(BitLayout::common(1), at_unit(42));
    let id = generator.next_id_within(1).unwrap();
    assert_eq!(generator.layout().sequence_of(id), 0);
}

#[test]
fn next_id_blocks_across_sequence_rollover() {
    // Two identifiers per time unit.
    let layout = BitLayout::new(40, 1, 8, 1).unwrap();
    let generator = Generator::new(layout, Epoch::DEFAULT);

    let ids: Vec<i64> = (0..20).map(|_| generator.next_id()).collect();

    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    let units: HashSet<i64> = ids.iter().map(|&id| layout.time_unit_of(id)).collect();
    assert!(units.len() >= 10, "only {} units for 20 ids", units.len());
    assert!(ids.iter().all(|&id| layout.sequence_of(id) <= 1));
}

#[test]
fn monotonic_clock_sequence_increments() {
    let generator = Generator::new(BitLayout::benchmark(1), Epoch::DEFAULT);
    let layout = *generator.layout();

    let mut last_unit = 0;
    let mut sequence = 0;
    for _ in 0..(1 << 17) {
        let id = generator.next_id();
        let unit = layout.time_unit_of(id);
        if unit > last_unit {
            sequence = 0;
        }

        assert!(unit >= last_unit);
        assert_eq!(layout.discriminator_of(id), 1);
        assert_eq!(layout.sequence_of(id), sequence);

        last_unit = unit;
        sequence += 1;
    }
}

#[test]
fn concurrent_callers_get_distinct_ids() {
    const THREADS: usize = 100;
    const IDS_PER_THREAD: usize = 100;
    const BUDGET: Duration = Duration::from_secs(2);

    let generator = Generator::new(BitLayout::common(1), Epoch::DEFAULT);
    let start = Instant::now();

    let seen = scope(|s| {
        let (tx, rx) = mpsc::channel();
        for _ in 0..THREADS {
            let tx = tx.clone();
            let generator = &generator;
            s.spawn(move || {
                for _ in 0..IDS_PER_THREAD {
                    if tx.send(generator.next_id()).is_err() {
                        return;
                    }
                }
            });
        }
        drop(tx);

        // Drain while the producers run so the budget covers generation.
        let mut seen = HashSet::with_capacity(THREADS * IDS_PER_THREAD);
        for i in 0..THREADS * IDS_PER_THREAD {
            let remaining = BUDGET.saturating_sub(start.elapsed());
            let id = rx
                .recv_timeout(remaining)
                .unwrap_or_else(|_| panic!("expected {} ids within {BUDGET:?}, got {i}", THREADS * IDS_PER_THREAD));
            assert!(seen.insert(id), "duplicate id {id:#x}");
        }
        seen
    });

    assert!(start.elapsed() < BUDGET, "took {:?}", start.elapsed());
    assert_eq!(seen.len(), THREADS * IDS_PER_THREAD);
}

#[test]
fn ids_increase_in_success_order() {
    const THREADS: usize = 8;
    const IDS_PER_THREAD: usize = 4096;

    let generator = Arc::new(Generator::new(BitLayout::benchmark(0), Epoch::DEFAULT));
    let per_thread = Arc::new(Mutex::new(Vec::with_capacity(THREADS)));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = Arc::clone(&generator);
            let per_thread = Arc::clone(&per_thread);
            s.spawn(move || {
                let ids: Vec<i64> = (0..IDS_PER_THREAD).map(|_| generator.next_id()).collect();
                per_thread.lock().unwrap().push(ids);
            });
        }
    });

    let per_thread = per_thread.lock().unwrap();
    let mut all = HashSet::new();
    for ids in per_thread.iter() {
        // A thread's successive successes are ordered, so its ids must be too.
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        all.extend(ids.iter().copied());
    }
    assert_eq!(all.len(), THREADS * IDS_PER_THREAD);
    assert_eq!(Some(&generator.last_issued()), all.iter().max());
}

#[test]
fn independent_generators_do_not_share_state() {
    let clock = MonotonicClock::new();
    let a = Generator::with_clock(BitLayout::common(1), Clock::new(clock, Epoch::DEFAULT));
    let b = Generator::with_clock(BitLayout::common(2), Clock::new(clock, Epoch::DEFAULT));

    let from_a: HashSet<i64> = (0..1_000).map(|_| a.next_id()).collect();
    let from_b: HashSet<i64> = (0..1_000).map(|_| b.next_id()).collect();

    assert_eq!(from_a.len(), 1_000);
    assert_eq!(from_b.len(), 1_000);
    assert!(from_a.is_disjoint(&from_b));
    assert_ne!(a.last_issued(), b.last_issued());
}
