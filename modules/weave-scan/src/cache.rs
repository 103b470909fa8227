//! Coalescing read cache for external fetches.
//!
//! Sits in front of the contact directory and feedback store so that
//! near-simultaneous callers don't trigger duplicate fetches: a short TTL
//! serves repeat reads, and an in-flight shared future means a second caller
//! awaits the first caller's fetch instead of issuing its own.
//!
//! Entries are invalidated purely by TTL expiry. Errors are never cached —
//! a failed fetch degrades to fetch-fresh for the next caller. The clock is
//! injected so tests control time deterministically.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use weave_common::WeaveError;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, Arc<WeaveError>>>>;

struct State<T> {
    value: Option<(T, Instant)>,
    in_flight: Option<SharedFetch<T>>,
}

pub struct CoalescingCache<T: Clone + Send + Sync + 'static> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<State<T>>,
}

impl<T: Clone + Send + Sync + 'static> CoalescingCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            state: Mutex::new(State {
                value: None,
                in_flight: None,
            }),
        }
    }

    /// Return the cached value if fresh; otherwise run (or join) a fetch.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T, WeaveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, WeaveError>> + Send + 'static,
    {
        let shared = {
            let mut state = self.state.lock().await;
            if let Some((value, cached_at)) = &state.value {
                if self.clock.now().duration_since(*cached_at) < self.ttl {
                    return Ok(value.clone());
                }
            }
            match &state.in_flight {
                Some(existing) => existing.clone(),
                None => {
                    let fut: SharedFetch<T> =
                        fetch().map(|r| r.map_err(Arc::new)).boxed().shared();
                    state.in_flight = Some(fut.clone());
                    fut
                }
            }
        };

        let result = shared.clone().await;

        let mut state = self.state.lock().await;
        // Only clear the slot we populated; a newer fetch may already be up.
        if state
            .in_flight
            .as_ref()
            .is_some_and(|f| f.ptr_eq(&shared))
        {
            state.in_flight = None;
        }
        match result {
            Ok(value) => {
                state.value = Some((value.clone(), self.clock.now()));
                Ok(value)
            }
            Err(e) => Err(WeaveError::from(e)),
        }
    }

    /// Drop any cached value. In-flight fetches are left to complete.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.value = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex as StdMutex;

    struct ManualClock {
        now: StdMutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: StdMutex::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn fresh_value_is_served_without_refetch() {
        let clock = Arc::new(ManualClock::new());
        let cache: CoalescingCache<u32> = CoalescingCache::new(Duration::from_secs(30), clock);
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let got = cache
                .get_or_fetch(move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
            assert_eq!(got, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ttl_expiry_refetches() {
        let clock = Arc::new(ManualClock::new());
        let cache: CoalescingCache<u32> =
            CoalescingCache::new(Duration::from_secs(30), clock.clone());
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            cache
                .get_or_fetch(move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(31));
        let calls2 = calls.clone();
        cache
            .get_or_fetch(move || async move {
                calls2.fetch_add(1, Ordering::SeqCst);
                Ok(8)
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let clock = Arc::new(ManualClock::new());
        let cache: Arc<CoalescingCache<u32>> =
            Arc::new(CoalescingCache::new(Duration::from_secs(30), clock));
        let calls = Arc::new(AtomicU32::new(0));

        async fn slow_fetch(calls: Arc<AtomicU32>) -> Result<u32, WeaveError> {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(42)
        }

        let (c1, c2) = (calls.clone(), calls.clone());
        let (a, b) = tokio::join!(
            cache.get_or_fetch(move || slow_fetch(c1)),
            cache.get_or_fetch(move || slow_fetch(c2)),
        );
        assert_eq!(a.unwrap(), 42);
        assert_eq!(b.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let clock = Arc::new(ManualClock::new());
        let cache: CoalescingCache<u32> = CoalescingCache::new(Duration::from_secs(30), clock);
        let calls = Arc::new(AtomicU32::new(0));

        let calls1 = calls.clone();
        let err = cache
            .get_or_fetch(move || async move {
                calls1.fetch_add(1, Ordering::SeqCst);
                Err(WeaveError::DataSource("directory offline".into()))
            })
            .await;
        assert!(err.is_err());

        let calls2 = calls.clone();
        let got = cache
            .get_or_fetch(move || async move {
                calls2.fetch_add(1, Ordering::SeqCst);
                Ok(9)
            })
            .await
            .unwrap();
        assert_eq!(got, 9);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let clock = Arc::new(ManualClock::new());
        let cache: CoalescingCache<u32> = CoalescingCache::new(Duration::from_secs(30), clock);
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            cache
                .get_or_fetch(move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await
                .unwrap();
            cache.invalidate().await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
