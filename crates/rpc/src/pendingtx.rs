//! Pending-transaction dispatcher (§4.10): subscribes to the mempool's
//! "tx accepted" stream, dedupes via a tiny TTL cache, and fans out
//! non-blockingly to connected listeners. The WebSocket framing and
//! per-connection lifecycle live in `gateway-rpc-builder`; this module is
//! the collaborator-free dedupe + fan-out core.

use gateway_primitives::TxId;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;

/// Capacity of the dedupe cache (§3 lifecycles).
const DEDUPE_CAPACITY: usize = 2000;

/// A `{id}` message pushed to `/subscriptions/txpool` listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTxMessage {
    pub id: TxId,
}

/// Per-listener outbound channel. Bounded and non-blocking: a slow client
/// drops messages rather than stalling the dispatcher (§9, §5).
type Listener = mpsc::Sender<PendingTxMessage>;

struct Dedupe {
    cache: LruCache<TxId, u64>,
    ttl_seconds: u64,
}

impl Dedupe {
    fn new(ttl_seconds: u64) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(DEDUPE_CAPACITY).expect("nonzero capacity")),
            ttl_seconds,
        }
    }

    /// Returns `true` if `id` was seen within the TTL window as of `now`
    /// (and should be skipped), recording `now` as its last-seen time
    /// either way.
    fn seen_recently(&mut self, id: TxId, now: u64) -> bool {
        let recently = match self.cache.get(&id) {
            Some(&last_seen) => now.saturating_sub(last_seen) < self.ttl_seconds,
            None => false,
        };
        self.cache.put(id, now);
        recently
    }
}

/// Unix-seconds clock abstraction so dedupe-window tests don't depend on
/// wall-clock time.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> u64;
}

/// The production clock: reads the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
    }
}

/// Fans out accepted, executable, non-duplicate transaction ids to every
/// registered listener. One dispatcher instance is shared by the whole
/// process; listeners register/unregister as WebSocket connections
/// open/close.
pub struct PendingTxDispatcher<Cl = SystemClock> {
    dedupe: Mutex<Dedupe>,
    listeners: Mutex<HashMap<u64, Listener>>,
    next_listener_id: Mutex<u64>,
    clock: Cl,
}

impl PendingTxDispatcher<SystemClock> {
    /// `ttl_seconds` should be `blockInterval / 2` per §4.10.
    pub fn new(ttl_seconds: u64) -> Self {
        Self::with_clock(ttl_seconds, SystemClock)
    }
}

impl<Cl: Clock> PendingTxDispatcher<Cl> {
    pub fn with_clock(ttl_seconds: u64, clock: Cl) -> Self {
        Self {
            dedupe: Mutex::new(Dedupe::new(ttl_seconds)),
            listeners: Mutex::new(HashMap::new()),
            next_listener_id: Mutex::new(0),
            clock,
        }
    }

    /// Registers a new listener, returning its channel's receiving half and
    /// a handle to unsubscribe on disconnect.
    pub fn subscribe(self: &Arc<Self>, buffer: usize) -> (mpsc::Receiver<PendingTxMessage>, ListenerHandle<Cl>) {
        let (tx, rx) = mpsc::channel(buffer);
        let mut id_guard = self.next_listener_id.lock();
        let id = *id_guard;
        *id_guard += 1;
        drop(id_guard);
        self.listeners.lock().insert(id, tx);
        (rx, ListenerHandle { dispatcher: Arc::clone(self), id })
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners.lock().remove(&id);
    }

    /// Handles one accepted-tx event from the mempool (§4.10): skips
    /// non-executable and recently-seen transactions, then fans out
    /// non-blockingly, dropping on a full listener channel.
    pub fn dispatch(&self, id: TxId, executable: bool) {
        if !executable {
            return;
        }
        let now = self.clock.now_unix();
        if self.dedupe.lock().seen_recently(id, now) {
            return;
        }
        let listeners = self.listeners.lock();
        for tx in listeners.values() {
            let _ = tx.try_send(PendingTxMessage { id });
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// Unsubscribes its listener when dropped, so a disconnected WebSocket
/// can't keep receiving a channel's sender alive past its owning task.
pub struct ListenerHandle<Cl: Clock> {
    dispatcher: Arc<PendingTxDispatcher<Cl>>,
    id: u64,
}

impl<Cl: Clock> Drop for ListenerHandle<Cl> {
    fn drop(&mut self) {
        self.dispatcher.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct FakeClock(AtomicU64);
    impl Clock for FakeClock {
        fn now_unix(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn two_listeners_both_receive_then_one_unsubscribes() {
        let dispatcher = Arc::new(PendingTxDispatcher::with_clock(5, FakeClock(AtomicU64::new(0))));
        let (mut rx1, handle1) = dispatcher.subscribe(8);
        let (mut rx2, _handle2) = dispatcher.subscribe(8);

        let t1 = TxId::repeat_byte(1);
        dispatcher.dispatch(t1, true);
        assert_eq!(rx1.try_recv().unwrap().id, t1);
        assert_eq!(rx2.try_recv().unwrap().id, t1);

        drop(handle1);
        assert_eq!(dispatcher.listener_count(), 1);

        let t2 = TxId::repeat_byte(2);
        dispatcher.dispatch(t2, true);
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap().id, t2);
    }

    #[tokio::test]
    async fn dedupe_window_suppresses_then_releases_resend() {
        let clock = FakeClock(AtomicU64::new(0));
        let dispatcher = Arc::new(PendingTxDispatcher::with_clock(5, clock));
        let (mut rx, _handle) = dispatcher.subscribe(8);

        let id = TxId::repeat_byte(3);
        dispatcher.dispatch(id, true);
        assert!(rx.try_recv().is_ok());

        // Resend well within the window: suppressed.
        dispatcher.dispatch(id, true);
        assert!(rx.try_recv().is_err());

        // Advance past the TTL and resend: delivered again.
        dispatcher.clock.0.store(6, Ordering::SeqCst);
        dispatcher.dispatch(id, true);
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn non_executable_transactions_are_skipped() {
        let dispatcher = Arc::new(PendingTxDispatcher::new(5));
        let (mut rx, _handle) = dispatcher.subscribe(8);
        dispatcher.dispatch(TxId::repeat_byte(9), false);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_listener_channel_drops_rather_than_blocks() {
        let dispatcher = Arc::new(PendingTxDispatcher::new(5));
        let (mut rx, _handle) = dispatcher.subscribe(1);
        dispatcher.dispatch(TxId::repeat_byte(1), true);
        // Channel now full (capacity 1, unread). A second distinct id must
        // not block the dispatcher; it's simply dropped for this listener.
        dispatcher.dispatch(TxId::repeat_byte(2), true);
        assert_eq!(rx.try_recv().unwrap().id, TxId::repeat_byte(1));
        assert!(rx.try_recv().is_err());
    }
}
