//! In-flight operation guard
//!
//! Concurrent callers of a guarded operation share one execution and observe
//! the same outcome. The handle to the pending execution is cleared by a
//! release guard that runs however the execution ends, so the next call after
//! it settles always starts fresh.

use futures::FutureExt;
use futures::future::Shared;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Boxed future type stored for the in-flight operation
#[cfg(not(target_arch = "wasm32"))]
pub type FlightFuture<T> = futures::future::BoxFuture<'static, T>;
#[cfg(target_arch = "wasm32")]
pub type FlightFuture<T> = futures::future::LocalBoxFuture<'static, T>;

/// `Send` on native targets; browser futures are single-threaded
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}

/// Shared handle returned to every caller of the same flight
pub type SharedFlight<T> = Shared<FlightFuture<T>>;

struct Flight<T: Clone> {
    id: u64,
    future: SharedFlight<T>,
}

type Slot<T> = Arc<Mutex<Option<Flight<T>>>>;

/// Guard ensuring at most one execution of an operation is in flight
pub struct SingleFlight<T: Clone> {
    slot: Slot<T>,
    next_id: Arc<AtomicU64>,
}

impl<T: Clone> Clone for SingleFlight<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T: Clone> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<T: Clone> SingleFlight<T> {
    pub fn is_in_flight(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<T: Clone> std::fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + MaybeSend + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the in-flight execution, or start one with `start`
    ///
    /// `start` is only called when nothing is in flight. The returned future
    /// resolves to the outcome of whichever execution the caller joined.
    pub fn run<F, Fut>(&self, start: F) -> SharedFlight<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + MaybeSend + 'static,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(flight) = slot.as_ref() {
            return flight.future.clone();
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let release = Release {
            slot: Arc::clone(&self.slot),
            id,
        };
        let operation = start();
        let future = box_flight(async move {
            let _release = release;
            operation.await
        })
        .shared();

        *slot = Some(Flight {
            id,
            future: future.clone(),
        });
        future
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn box_flight<T>(future: impl Future<Output = T> + Send + 'static) -> FlightFuture<T> {
    future.boxed()
}

#[cfg(target_arch = "wasm32")]
fn box_flight<T>(future: impl Future<Output = T> + 'static) -> FlightFuture<T> {
    future.boxed_local()
}

/// Clears the slot when the execution finishes or is dropped
struct Release<T: Clone> {
    slot: Slot<T>,
    id: u64,
}

impl<T: Clone> Drop for Release<T> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        // A later flight may already own the slot
        if slot.as_ref().is_some_and(|flight| flight.id == self.id) {
            let finished = slot.take();
            drop(slot);
            drop(finished);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_callers_share_one_execution() {
        let flight = SingleFlight::<bool>::new();
        let executions = Arc::new(AtomicUsize::new(0));

        let calls = (0..8).map(|_| {
            let executions = Arc::clone(&executions);
            flight.run(move || async move {
                executions.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                true
            })
        });
        let outcomes = futures::future::join_all(calls).await;

        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert!(outcomes.into_iter().all(|outcome| outcome));
        assert!(!flight.is_in_flight());
    }

    #[tokio::test]
    async fn next_call_after_settling_starts_fresh() {
        let flight = SingleFlight::<u32>::new();
        let executions = Arc::new(AtomicUsize::new(0));

        for expected in 1..=3 {
            let executions = Arc::clone(&executions);
            let outcome = flight
                .run(move || async move {
                    u32::try_from(executions.fetch_add(1, Ordering::SeqCst) + 1).unwrap()
                })
                .await;
            assert_eq!(outcome, expected);
        }
    }

    #[tokio::test]
    async fn start_is_not_called_while_in_flight() {
        let flight = SingleFlight::<bool>::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<bool>();

        let first = flight.run(move || async move { rx.await.unwrap_or(false) });
        assert!(flight.is_in_flight());

        let second = flight.run(|| -> futures::future::Ready<bool> {
            panic!("second start must not run while the first is pending")
        });

        tx.send(true).unwrap();
        assert!(first.await);
        assert!(second.await);
        assert!(!flight.is_in_flight());
    }

    #[tokio::test]
    async fn failure_outcomes_are_shared_and_released() {
        let flight = SingleFlight::<bool>::new();
        let (a, b) = futures::join!(
            flight.run(|| async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                false
            }),
            flight.run(|| async { true }),
        );
        assert!(!a);
        assert!(!b);
        assert!(!flight.is_in_flight());
    }

    #[tokio::test]
    async fn debug_reports_pending_flight() {
        let flight = SingleFlight::<bool>::new();
        assert_eq!(format!("{flight:?}"), "SingleFlight { in_flight: false }");

        let (tx, rx) = tokio::sync::oneshot::channel::<bool>();
        let pending = flight.run(move || async move { rx.await.unwrap_or(false) });
        assert_eq!(format!("{flight:?}"), "SingleFlight { in_flight: true }");

        tx.send(true).unwrap();
        assert!(pending.await);
    }

    #[tokio::test]
    async fn abandoned_flight_is_resumed_by_next_caller() {
        let flight = SingleFlight::<u8>::new();
        let executions = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&executions);
        let abandoned = flight.run(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            7
        });
        drop(abandoned);

        let outcome = flight.run(|| async { 9 }).await;
        assert_eq!(outcome, 7);
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert!(!flight.is_in_flight());
    }
}
