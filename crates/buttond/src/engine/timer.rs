use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// An action waiting for its delay to elapse.
struct Pending {
    id: u64,
    task: JoinHandle<()>,
}

struct Inner<K> {
    next_id: u64,
    pending: HashMap<K, Pending>,
}

/// Runs at most one delayed action per key.
///
/// Actions run on their own tokio task, so a scheduled action never blocks the caller.
/// Scheduling under a key that already has a pending action cancels the old one. An
/// action that has started running is no longer pending and can't be canceled.
pub struct DeferredActionTimer<K> {
    inner: Arc<Mutex<Inner<K>>>,
}

impl<K> DeferredActionTimer<K>
where
    K: Eq + Hash + Clone + Send + std::fmt::Debug + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 0,
                pending: HashMap::new(),
            })),
        }
    }

    /// Run `action` once after `delay`, replacing any action pending under `key`.
    pub fn schedule<F>(&self, key: K, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Hold the lock until the new entry is in the map so the task always finds it.
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;

        let shared = self.inner.clone();
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut inner = lock(&shared);
                match inner.pending.get(&task_key) {
                    Some(pending) if pending.id == id => {
                        inner.pending.remove(&task_key);
                    }
                    // Replaced or canceled while we were waking up.
                    _ => return,
                }
            }

            debug!("Running deferred action {:?}", task_key);
            action.await;
        });

        if let Some(previous) = inner.pending.insert(key, Pending { id, task }) {
            previous.task.abort();
        }
    }

    /// Cancel the action pending under `key`. Returns whether there was one.
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.inner).pending.remove(key) {
            Some(pending) => {
                pending.task.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        lock(&self.inner).pending.contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.inner).pending.len()
    }
}

impl<K> Default for DeferredActionTimer<K>
where
    K: Eq + Hash + Clone + Send + std::fmt::Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for DeferredActionTimer<K> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            for (_, pending) in inner.pending.drain() {
                pending.task.abort();
            }
        }
    }
}

/// The map stays consistent even if a holder panicked, so poisoning is ignored.
fn lock<K>(inner: &Mutex<Inner<K>>) -> MutexGuard<'_, Inner<K>> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;

    fn counting(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_runs_after_delay() {
        let timer = DeferredActionTimer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        timer.schedule("door", Duration::from_secs(1800), counting(&fired));
        assert!(timer.is_pending(&"door"));

        tokio::time::sleep(Duration::from_secs(1799)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending(&"door"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_action() {
        let timer = DeferredActionTimer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        timer.schedule("door", Duration::from_secs(1800), counting(&fired));
        tokio::time::sleep(Duration::from_secs(1000)).await;

        assert!(timer.cancel(&"door"));
        assert!(!timer.cancel(&"door"));

        tokio::time::sleep(Duration::from_secs(2000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending_action() {
        let timer = DeferredActionTimer::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        timer.schedule("door", Duration::from_secs(1800), counting(&first));
        tokio::time::sleep(Duration::from_secs(1000)).await;
        timer.schedule("door", Duration::from_secs(1800), counting(&second));
        assert_eq!(timer.pending_count(), 1);

        // The first action would have fired by now.
        tokio::time::sleep(Duration::from_secs(1000)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(1000)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let timer = DeferredActionTimer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        timer.schedule("front", Duration::from_secs(10), counting(&fired));
        timer.schedule("back", Duration::from_secs(10), counting(&fired));
        assert_eq!(timer.pending_count(), 2);
        assert!(timer.cancel(&"front"));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timer.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_without_pending_action() {
        let timer: DeferredActionTimer<&str> = DeferredActionTimer::new();
        assert!(!timer.cancel(&"door"));
        assert_eq!(timer.pending_count(), 0);
    }
}
