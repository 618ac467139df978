//! Per-key single-slot deferred tasks.
//!
//! Arming a key schedules its action one window later. Re-arming before the
//! window elapses aborts the armed task and starts a fresh window, so the
//! action runs once, a full window after the last arm. An action that has
//! already started is never aborted; a re-arm during it schedules another
//! run that starts only once the running one has returned. Actions for one
//! key never overlap.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinHandle};

struct Slot {
    generation: u64,
    fire_now: Option<oneshot::Sender<()>>,
    abort: AbortHandle,
    /// Set once the window elapsed and the action started.
    fired: bool,
}

struct Inner<K> {
    next_generation: u64,
    slots: HashMap<K, Slot>,
    /// Held by a key's action while it runs.
    lanes: HashMap<K, Arc<tokio::sync::Mutex<()>>>,
    tasks: Vec<JoinHandle<()>>,
}

pub struct Debouncer<K> {
    window: Duration,
    inner: Arc<Mutex<Inner<K>>>,
}

fn lock<K>(inner: &Mutex<Inner<K>>) -> MutexGuard<'_, Inner<K>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            inner: Arc::new(Mutex::new(Inner {
                next_generation: 0,
                slots: HashMap::new(),
                lanes: HashMap::new(),
                tasks: Vec::new(),
            })),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `action` for `key`, replacing any armed action for the same
    /// key. Returns `true` when an armed action was replaced.
    pub fn arm<F>(&self, key: K, action: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (fire_tx, fire_rx) = oneshot::channel::<()>();
        let window = self.window;
        let shared = Arc::clone(&self.inner);

        let mut inner = lock(&self.inner);
        let generation = inner.next_generation;
        inner.next_generation += 1;

        let replaced = match inner.slots.remove(&key) {
            Some(slot) if !slot.fired => {
                slot.abort.abort();
                true
            }
            _ => false,
        };

        let lane = Arc::clone(inner.lanes.entry(key.clone()).or_default());
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(window) => {}
                fired = fire_rx => {
                    if fired.is_err() {
                        return;
                    }
                }
            }

            // Still abortable by a re-arm until the previous run lets go.
            let _turn = lane.lock().await;
            {
                let mut inner = lock(&shared);
                match inner.slots.get_mut(&task_key) {
                    Some(slot) if slot.generation == generation => {
                        slot.fired = true;
                        slot.fire_now = None;
                    }
                    _ => return,
                }
            }

            action.await;

            let mut inner = lock(&shared);
            if inner
                .slots
                .get(&task_key)
                .map_or(false, |slot| slot.generation == generation)
            {
                inner.slots.remove(&task_key);
            }
        });

        inner.slots.insert(
            key,
            Slot {
                generation,
                fire_now: Some(fire_tx),
                abort: handle.abort_handle(),
                fired: false,
            },
        );
        inner.tasks.retain(|task| !task.is_finished());
        inner.tasks.push(handle);
        replaced
    }

    /// Number of armed actions still waiting for their window.
    pub fn pending(&self) -> usize {
        lock(&self.inner)
            .slots
            .values()
            .filter(|slot| !slot.fired)
            .count()
    }

    /// Abort every action still waiting. Running actions are left alone.
    /// Returns the number of aborted actions.
    pub fn cancel_all(&self) -> usize {
        let mut inner = lock(&self.inner);
        let mut cancelled = 0;
        for (_, slot) in inner.slots.drain() {
            if !slot.fired {
                slot.abort.abort();
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Fire every waiting action now and wait for all of them to finish.
    pub async fn flush(&self) {
        {
            let mut inner = lock(&self.inner);
            for slot in inner.slots.values_mut() {
                if let Some(fire_now) = slot.fire_now.take() {
                    let _ = fire_now.send(());
                }
            }
        }
        self.wait_idle().await;
    }

    /// Wait until no task spawned by [`Debouncer::arm`] is running,
    /// including tasks armed while waiting.
    pub async fn wait_idle(&self) {
        loop {
            let tasks = std::mem::take(&mut lock(&self.inner).tasks);
            if tasks.is_empty() {
                return;
            }
            for task in tasks {
                let _ = task.await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{advance, Instant};

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn bump(count: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let count = Arc::clone(count);
        async move {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn rapid_arms_collapse_to_one_run() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let runs = counter();

        for i in 0..5 {
            let replaced = debouncer.arm("a", bump(&runs));
            assert_eq!(replaced, i > 0);
            advance(Duration::from_millis(10)).await;
        }
        assert_eq!(debouncer.pending(), 1);

        debouncer.wait_idle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(debouncer.pending(), 0);
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn window_is_measured_from_last_arm() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let fired_at = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();

        for _ in 0..2 {
            let fired_at = Arc::clone(&fired_at);
            debouncer.arm("a", async move {
                fired_at.lock().unwrap().push(Instant::now());
            });
            advance(Duration::from_millis(90)).await;
        }
        debouncer.wait_idle().await;

        let fired_at = fired_at.lock().unwrap();
        assert_eq!(fired_at.len(), 1);
        let elapsed = fired_at[0] - start;
        assert!(
            elapsed >= Duration::from_millis(190),
            "fired {elapsed:?} after start, before the quiet period"
        );
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn distinct_keys_run_independently() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let runs = counter();

        debouncer.arm("a", bump(&runs));
        debouncer.arm("b", bump(&runs));
        assert_eq!(debouncer.pending(), 2);

        debouncer.wait_idle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn cancel_all_drops_waiting_actions() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let runs = counter();

        debouncer.arm("a", bump(&runs));
        debouncer.arm("b", bump(&runs));
        assert_eq!(debouncer.cancel_all(), 2);
        assert_eq!(debouncer.pending(), 0);

        debouncer.wait_idle().await;
        advance(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn flush_runs_waiting_actions_without_waiting_for_window() {
        let debouncer = Debouncer::new(Duration::from_secs(60));
        let runs = counter();
        let start = Instant::now();

        debouncer.arm("a", bump(&runs));
        debouncer.arm("b", bump(&runs));
        debouncer.flush().await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn rearm_during_running_action_does_not_abort_it() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(100)));
        let runs = counter();
        let (started_tx, started_rx) = oneshot::channel::<()>();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let slow_runs = Arc::clone(&runs);
        debouncer.arm("a", async move {
            let _ = started_tx.send(());
            let _ = release_rx.await;
            slow_runs.fetch_add(1, Ordering::SeqCst);
        });
        started_rx.await.unwrap();

        assert!(!debouncer.arm("a", bump(&runs)), "running action is not replaced");
        let _ = release_tx.send(());

        debouncer.wait_idle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn rearmed_run_waits_for_the_running_one() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(100)));
        let active = counter();
        let peak = counter();
        let order = Arc::new(Mutex::new(Vec::new()));

        let tracked = |label: &'static str| {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            let order = Arc::clone(&order);
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                order.lock().unwrap().push(format!("{label} start"));
                tokio::time::sleep(Duration::from_millis(500)).await;
                order.lock().unwrap().push(format!("{label} end"));
                active.fetch_sub(1, Ordering::SeqCst);
            }
        };

        debouncer.arm("a", tracked("first"));
        advance(Duration::from_millis(150)).await;
        while active.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // Its window elapses long before the first run returns.
        assert!(!debouncer.arm("a", tracked("second")));
        debouncer.wait_idle().await;

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(
            *order.lock().unwrap(),
            ["first start", "first end", "second start", "second end"]
        );
    }
}
