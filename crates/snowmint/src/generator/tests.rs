use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::scope;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{
    error::Error,
    generator::{MAX_SEQUENCE, Poll, SnowflakeGenerator, State},
    id::{NodeId, SnowflakeId},
    time::{DEFAULT_EPOCH, SystemClock, TimeSource},
};

const EPOCH_MS: u64 = 1_609_459_200_000;

struct FixedTime {
    millis: u64,
}

impl TimeSource for FixedTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// A clock the test moves by hand.
#[derive(Default)]
struct ManualTime {
    millis: AtomicU64,
}

impl ManualTime {
    fn at(millis: u64) -> Arc<Self> {
        Arc::new(Self {
            millis: AtomicU64::new(millis),
        })
    }

    fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    fn advance(&self) {
        self.millis.fetch_add(1, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

fn node(dc: u8, worker: u8) -> NodeId {
    NodeId::new(dc, worker).unwrap()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

trait PollExt {
    fn unwrap_ready(self) -> SnowflakeId;
    fn unwrap_pending(self) -> u64;
}

impl PollExt for Poll {
    fn unwrap_ready(self) -> SnowflakeId {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

#[test]
fn accepts_every_valid_identity() {
    for dc in 0..=31 {
        for worker in 0..=31 {
            let generator = SnowflakeGenerator::new(dc, worker).unwrap();
            assert_eq!(generator.datacenter_id(), dc);
            assert_eq!(generator.worker_id(), worker);
            assert_eq!(generator.epoch(), DEFAULT_EPOCH);
        }
    }
}

#[test]
fn rejects_out_of_range_identity() {
    for (dc, worker) in [(32, 0), (0, 32), (200, 7)] {
        let err = SnowflakeGenerator::new(dc, worker).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidIdentity {
                datacenter_id: i64::from(dc),
                worker_id: i64::from(worker),
            }
        );
    }
}

#[test]
fn fresh_generator_starts_with_sentinel_state() {
    let generator = SnowflakeGenerator::new(0, 0).unwrap();
    assert_eq!(
        generator.state().unwrap(),
        State {
            last_timestamp: None,
            sequence: 0,
        }
    );
}

#[test]
fn sequence_increments_within_same_millisecond() {
    let t = EPOCH_MS + 42;
    let generator =
        SnowflakeGenerator::with_time(node(1, 1), DEFAULT_EPOCH, FixedTime { millis: t });

    let id1 = generator.next_id().unwrap();
    let id2 = generator.next_id().unwrap();
    let id3 = generator.next_id().unwrap();

    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    for id in [id1, id2, id3] {
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.datacenter_id(), 1);
        assert_eq!(id.worker_id(), 1);
        assert_eq!(id.to_raw() >> 12, id1.to_raw() >> 12);
    }
    assert_eq!(id1.to_raw(), (42 << 22) | (1 << 17) | (1 << 12));
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn pending_when_sequence_exhausted() {
    let t = EPOCH_MS + 7;
    let generator = SnowflakeGenerator::from_components(
        node(0, 0),
        DEFAULT_EPOCH,
        Some(t),
        MAX_SEQUENCE,
        FixedTime { millis: t },
    );

    assert_eq!(generator.poll_id().unwrap().unwrap_pending(), 1);
    assert_eq!(
        generator.state().unwrap(),
        State {
            last_timestamp: Some(t),
            sequence: MAX_SEQUENCE,
        }
    );
}

#[test]
fn rolls_over_to_next_millisecond() {
    let time = ManualTime::at(EPOCH_MS + 42);
    let generator = SnowflakeGenerator::with_time(node(0, 1), DEFAULT_EPOCH, Arc::clone(&time));

    for i in 0..=MAX_SEQUENCE {
        let id = generator.poll_id().unwrap().unwrap_ready();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 42);
    }
    assert_eq!(generator.poll_id().unwrap().unwrap_pending(), 1);

    time.advance();

    let id = generator.poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn five_thousand_ids_in_one_millisecond_wait_once() {
    let time = ManualTime::at(EPOCH_MS + 1_000);
    let generator = SnowflakeGenerator::with_time(node(2, 3), DEFAULT_EPOCH, Arc::clone(&time));
    let waits = AtomicUsize::new(0);
    let mut seen = HashSet::with_capacity(5_000);

    for _ in 0..5_000 {
        let id = generator
            .next_id_with(|yield_for| {
                assert_eq!(yield_for, 1);
                waits.fetch_add(1, Ordering::SeqCst);
                time.advance();
            })
            .unwrap();
        assert!(seen.insert(id), "duplicate id {id:?}");
    }

    assert_eq!(seen.len(), 5_000);
    assert_eq!(waits.load(Ordering::SeqCst), 1);

    let state = generator.state().unwrap();
    assert_eq!(state.last_timestamp, Some(EPOCH_MS + 1_001));
    assert_eq!(state.sequence, (5_000 - 4_096 - 1) as u16);
}

#[test]
fn clock_regression_is_an_error_and_mutates_nothing() {
    let time = ManualTime::at(EPOCH_MS + 100);
    let generator = SnowflakeGenerator::with_time(node(1, 2), DEFAULT_EPOCH, Arc::clone(&time));

    let first = generator.next_id().unwrap();
    let second = generator.next_id().unwrap();
    let before = generator.state().unwrap();
    assert_eq!(before.sequence, 1);

    time.set(EPOCH_MS + 95);
    let err = generator.next_id().unwrap_err();
    assert_eq!(
        err,
        Error::ClockRegression {
            last_ms: EPOCH_MS + 100,
            now_ms: EPOCH_MS + 95,
            behind_ms: 5,
        }
    );
    assert_eq!(generator.state().unwrap(), before);

    // Still an error on every retry while the clock stays behind.
    assert!(matches!(
        generator.next_id(),
        Err(Error::ClockRegression { behind_ms: 5, .. })
    ));

    time.set(EPOCH_MS + 100);
    let third = generator.next_id().unwrap();
    assert_eq!(third.sequence(), 2);
    assert!(first < second && second < third);
}

#[test]
fn restored_high_water_mark_detects_regression() {
    let generator = SnowflakeGenerator::from_components(
        node(0, 0),
        DEFAULT_EPOCH,
        Some(EPOCH_MS + 500),
        3,
        FixedTime {
            millis: EPOCH_MS + 499,
        },
    );
    assert!(matches!(
        generator.next_id(),
        Err(Error::ClockRegression { behind_ms: 1, .. })
    ));
}

#[test]
fn clock_before_epoch_is_an_error() {
    let generator = SnowflakeGenerator::with_time(
        node(0, 0),
        DEFAULT_EPOCH,
        FixedTime {
            millis: EPOCH_MS - 1,
        },
    );
    assert_eq!(
        generator.next_id().unwrap_err(),
        Error::ClockBeforeEpoch {
            now_ms: EPOCH_MS - 1,
            epoch_ms: EPOCH_MS,
        }
    );
    assert_eq!(generator.state().unwrap().last_timestamp, None);
}

#[test]
fn timestamp_past_41_bits_is_an_error() {
    let generator = SnowflakeGenerator::with_time(
        node(0, 0),
        Duration::ZERO,
        FixedTime {
            millis: SnowflakeId::TIMESTAMP_MASK + 1,
        },
    );
    assert!(matches!(
        generator.next_id(),
        Err(Error::TimestampOverflow { .. })
    ));

    let generator = SnowflakeGenerator::with_time(
        node(0, 0),
        Duration::ZERO,
        FixedTime {
            millis: SnowflakeId::TIMESTAMP_MASK,
        },
    );
    let id = generator.next_id().unwrap();
    assert_eq!(id.timestamp(), SnowflakeId::TIMESTAMP_MASK);
    assert!(id.is_valid());
}

#[test]
fn sequential_ids_strictly_increase_and_decode() {
    let constructed_at = unix_now();
    let generator = SnowflakeGenerator::new(5, 9).unwrap();
    let mut last: Option<SnowflakeId> = None;

    for _ in 0..4096 * 16 {
        let id = generator.next_id().unwrap();
        if let Some(prev) = last {
            assert!(id > prev, "{id:?} <= {prev:?}");
            assert!(u64::from(id) > u64::from(prev));
        }
        assert!(id.sequence() <= MAX_SEQUENCE);
        assert_eq!(id.worker_id(), 9);
        assert_eq!(id.datacenter_id(), 5);
        assert!(id.timestamp() >= constructed_at - EPOCH_MS);
        assert!(id.is_valid());
        last = Some(id);
    }
}

#[test]
fn threaded_ids_are_unique() {
    let threads = num_cpus::get().clamp(2, 8);
    let ids_per_thread = 4096 * 16;
    let generator = SnowflakeGenerator::new(0, 0).unwrap();
    let seen_ids = Mutex::new(HashSet::with_capacity(threads * ids_per_thread));

    scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                let mut local = Vec::with_capacity(ids_per_thread);
                let mut last = None;
                for _ in 0..ids_per_thread {
                    let id = generator
                        .next_id_with(|_| std::thread::yield_now())
                        .unwrap();
                    // Per-thread view is increasing too: the lock orders calls.
                    if let Some(prev) = last {
                        assert!(id > prev);
                    }
                    last = Some(id);
                    local.push(id);
                }
                seen_ids.lock().unwrap().extend(local);
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(
        final_count,
        threads * ids_per_thread,
        "Expected {} unique IDs",
        threads * ids_per_thread
    );
}

#[test]
fn threaded_same_millisecond_never_collides() {
    let time = ManualTime::at(EPOCH_MS + 10);
    let generator = SnowflakeGenerator::with_time(node(4, 4), DEFAULT_EPOCH, Arc::clone(&time));
    let seen_ids = Mutex::new(HashSet::new());

    scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..3_000 {
                    let id = generator.next_id_with(|_| time.advance()).unwrap();
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    assert_eq!(seen_ids.lock().unwrap().len(), 12_000);
}

#[test]
fn system_clock_generator_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SnowflakeGenerator<SystemClock>>();
    assert_send_sync::<SnowflakeGenerator<Arc<ManualTime>>>();
}

#[cfg(not(feature = "parking-lot"))]
#[test]
fn poisoned_lock_is_reported() {
    let generator = SnowflakeGenerator::with_time(
        node(1, 1),
        DEFAULT_EPOCH,
        FixedTime {
            millis: EPOCH_MS + 1,
        },
    );

    scope(|s| {
        let handle = s.spawn(|| {
            let _guard = generator.state.lock().unwrap();
            panic!("panic while holding the generator lock");
        });
        assert!(handle.join().is_err());
    });

    assert_eq!(generator.poll_id().unwrap_err(), Error::LockPoisoned);
    assert_eq!(generator.next_id().unwrap_err(), Error::LockPoisoned);
}
