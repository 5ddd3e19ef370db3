use gateway_primitives::BlockId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Bounded cache keyed by block id, used by subscription readers to avoid
/// recomputing the same per-block message across subscribers (§4.6).
/// `get_or_add` invokes its builder at most once per key even under
/// concurrent callers; capacity is capped at 1000 entries, and zero is
/// promoted to one.
pub struct MessageCache<T> {
    capacity: usize,
    state: Mutex<State<T>>,
}

struct State<T> {
    order: Vec<BlockId>,
    entries: HashMap<BlockId, Arc<OnceCell<T>>>,
}

const MAX_CAPACITY: usize = 1000;

impl<T: Clone + Send + Sync + 'static> MessageCache<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.min(MAX_CAPACITY)).map_or(1, NonZeroUsize::get);
        Self { capacity, state: Mutex::new(State { order: Vec::new(), entries: HashMap::new() }) }
    }

    /// Returns the cached value for `id`, or runs `builder` exactly once
    /// under a per-key critical section and caches the result.
    pub async fn get_or_add<F, Fut>(&self, id: BlockId, builder: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let cell = self.cell_for(id);
        cell.get_or_init(builder).await.clone()
    }

    fn cell_for(&self, id: BlockId) -> Arc<OnceCell<T>> {
        let mut state = self.state.lock();
        if let Some(cell) = state.entries.get(&id) {
            return Arc::clone(cell);
        }
        let cell = Arc::new(OnceCell::new());
        state.entries.insert(id, Arc::clone(&cell));
        state.order.push(id);
        if state.order.len() > self.capacity {
            let evicted = state.order.remove(0);
            state.entries.remove(&evicted);
        }
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn builder_runs_once_per_key_under_concurrency() {
        let cache: Arc<MessageCache<u32>> = Arc::new(MessageCache::new(10));
        let calls = Arc::new(AtomicUsize::new(0));
        let id = BlockId::default();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_add(id, || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        42u32
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_capacity_is_promoted_to_one() {
        let cache: MessageCache<u32> = MessageCache::new(0);
        assert_eq!(cache.capacity, 1);
    }

    #[tokio::test]
    async fn evicts_oldest_entry_beyond_capacity() {
        let cache: MessageCache<u32> = MessageCache::new(1);
        let a = BlockId::from_number_and_bytes(1, &[]);
        let b = BlockId::from_number_and_bytes(2, &[]);
        cache.get_or_add(a, || async { 1 }).await;
        cache.get_or_add(b, || async { 2 }).await;
        let state = cache.state.lock();
        assert!(!state.entries.contains_key(&a));
        assert!(state.entries.contains_key(&b));
    }
}
