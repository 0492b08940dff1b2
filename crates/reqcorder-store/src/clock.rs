use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use reqcorder_types::ResponseId;

/// Source of fresh [`ResponseId`]s.
///
/// Injected into the record store at construction so the ID stream is owned
/// by the store instead of living in process-global state. Implementations
/// must be safe to call from the store's concurrent write tasks.
pub trait IdSource: Send + Sync {
    /// Mint the next identifier. Each call returns a value distinct from, and
    /// lexicographically greater than, every earlier value from this source
    /// (until the four-digit counter wraps within one millisecond).
    fn next_id(&self) -> ResponseId;
}

/// Clock state shared by both sources.
struct IdState {
    /// Last millisecond handed out.
    last_ms: i64,
    /// Monotonic counter; only the low four digits appear in IDs.
    counter: u64,
}

impl IdState {
    fn new() -> Self {
        Self {
            last_ms: i64::MIN,
            counter: 0,
        }
    }

    /// Advance past `wall`, never moving backwards, and bump the counter.
    fn advance(&mut self, wall: DateTime<Utc>) -> (DateTime<Utc>, u64) {
        let wall_ms = wall.timestamp_millis();
        let at = if wall_ms >= self.last_ms {
            self.last_ms = wall_ms;
            wall
        } else {
            DateTime::from_timestamp_millis(self.last_ms).unwrap_or(wall)
        };
        self.counter += 1;
        (at, self.counter)
    }
}

/// Wall-clock ID source.
///
/// Combines UTC time with a counter that increments on every call. Should the
/// wall clock step backwards, the last observed millisecond is reused so IDs
/// from one source never go back in time. Uniqueness holds within a process
/// only: two processes can mint the same ID in the same millisecond.
pub struct SystemIdSource {
    state: Mutex<IdState>,
}

impl SystemIdSource {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(IdState::new()),
        }
    }
}

impl Default for SystemIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SystemIdSource {
    fn next_id(&self) -> ResponseId {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (at, counter) = state.advance(Utc::now());
        ResponseId::from_parts(at, counter)
    }
}

/// Deterministic ID source for tests and replays.
///
/// Starts at a fixed instant and moves forward by a fixed step on every call.
pub struct ManualIdSource {
    state: Mutex<(DateTime<Utc>, IdState)>,
    step: Duration,
}

impl ManualIdSource {
    /// A source starting at `start`, advancing one millisecond per ID.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self::with_step(start, Duration::milliseconds(1))
    }

    pub fn with_step(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            state: Mutex::new((start, IdState::new())),
            step,
        }
    }
}

impl IdSource for ManualIdSource {
    fn next_id(&self) -> ResponseId {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (now, state) = &mut *guard;
        let (at, counter) = state.advance(*now);
        *now += self.step;
        ResponseId::from_parts(at, counter)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use chrono::TimeZone;

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap()
    }

    #[test]
    fn manual_source_is_deterministic() {
        let source = ManualIdSource::new(start());
        assert_eq!(source.next_id().as_str(), "20240115_103045_000_0001");
        assert_eq!(source.next_id().as_str(), "20240115_103045_001_0002");
    }

    #[test]
    fn zero_step_breaks_ties_with_counter() {
        let source = ManualIdSource::with_step(start(), Duration::zero());
        let a = source.next_id();
        let b = source.next_id();
        assert!(a < b);
        assert_eq!(a.timestamp().unwrap(), b.timestamp().unwrap());
    }

    #[test]
    fn backwards_clock_does_not_regress() {
        let source = ManualIdSource::with_step(start(), Duration::milliseconds(-5));
        let a = source.next_id();
        let b = source.next_id();
        assert!(a < b);
        assert_eq!(a.timestamp().unwrap(), b.timestamp().unwrap());
    }

    #[test]
    fn system_source_ids_are_monotonic() {
        let source = SystemIdSource::new();
        let mut previous = source.next_id();
        for _ in 0..500 {
            let next = source.next_id();
            assert!(next > previous, "{next} should sort after {previous}");
            previous = next;
        }
    }

    #[test]
    fn system_source_timestamp_parses() {
        let id = SystemIdSource::new().next_id();
        let parsed = id.timestamp().unwrap();
        let drift = (Utc::now() - parsed).num_seconds().abs();
        assert!(drift < 5);
    }

    #[test]
    fn poisoned_source_keeps_minting() {
        let source = Arc::new(ManualIdSource::new(start()));
        let first = source.next_id();
        let poisoner = Arc::clone(&source);
        let _ = thread::spawn(move || {
            let _guard = poisoner.state.lock().unwrap();
            panic!("poison the id source");
        })
        .join();
        assert!(source.state.is_poisoned());

        let next = source.next_id();
        assert!(next > first);
        assert_eq!(next.as_str(), "20240115_103045_001_0002");
    }

    #[test]
    fn concurrent_ids_are_unique() {
        let source = Arc::new(SystemIdSource::new());
        let mut handles = vec![];
        for _ in 0..8 {
            let s = Arc::clone(&source);
            handles.push(thread::spawn(move || {
                (0..200).map(|_| s.next_id()).collect::<Vec<_>>()
            }));
        }
        let mut all = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(all.insert(id), "duplicate response id");
            }
        }
        assert_eq!(all.len(), 1600);
    }
}
