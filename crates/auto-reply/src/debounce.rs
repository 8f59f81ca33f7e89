//! Key-partitioned inbound debouncing.
//!
//! Each conversation key moves through three states:
//!
//! - idle: no slot in the map
//! - pending: entries buffered, one timer armed
//! - flushing: a drain task is delivering ready batches one at a time
//!
//! A slot can be pending and flushing at once: entries that arrive while a
//! batch is being delivered start a new buffer and queue behind it. Slots are
//! removed as soon as they have nothing buffered, queued, or in flight.

use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    panic::AssertUnwindSafe,
    pin::Pin,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use {
    futures::FutureExt,
    tokio::{sync::Notify, task::JoinHandle, time::Instant},
    tracing::{debug, warn},
};

#[cfg(feature = "metrics")]
use switchboard_metrics::{counter, gauge, histogram, inbound as inbound_metrics, labels};

pub type BuildKeyFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;
pub type ShouldDebounceFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
pub type FlushFn<T> =
    Arc<dyn Fn(Vec<T>) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> + Send + Sync>;
pub type FlushErrorFn = Arc<dyn Fn(anyhow::Error) + Send + Sync>;

/// Debouncer settings and callbacks.
pub struct DebounceConfig<T> {
    /// Idle window. Zero disables batching.
    pub debounce: Duration,
    /// Conversation key for an entry. `None` flushes the entry on its own.
    pub build_key: BuildKeyFn<T>,
    /// `false` flushes the key's buffer, then the entry alone.
    pub should_debounce: ShouldDebounceFn<T>,
    pub on_flush: FlushFn<T>,
    pub on_error: FlushErrorFn,
}

impl<T> DebounceConfig<T> {
    pub fn new(debounce_ms: u64, build_key: BuildKeyFn<T>, on_flush: FlushFn<T>) -> Self {
        Self {
            debounce: Duration::from_millis(debounce_ms),
            build_key,
            should_debounce: Arc::new(|_| true),
            on_flush,
            on_error: Arc::new(|error| warn!(%error, "inbound flush failed")),
        }
    }

    #[must_use]
    pub fn with_should_debounce(mut self, should_debounce: ShouldDebounceFn<T>) -> Self {
        self.should_debounce = should_debounce;
        self
    }

    #[must_use]
    pub fn with_on_error(mut self, on_error: FlushErrorFn) -> Self {
        self.on_error = on_error;
        self
    }
}

struct KeySlot<T> {
    pending: Vec<T>,
    timer: Option<JoinHandle<()>>,
    /// Bumped whenever the timer is replaced or cancelled, so a timer that
    /// already woke up can tell it is stale.
    generation: u64,
    ready: VecDeque<Vec<T>>,
    flushing: bool,
}

impl<T> Default for KeySlot<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            timer: None,
            generation: 0,
            ready: VecDeque::new(),
            flushing: false,
        }
    }
}

impl<T> KeySlot<T> {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation += 1;
    }

    fn promote_pending(&mut self) {
        if !self.pending.is_empty() {
            self.ready.push_back(std::mem::take(&mut self.pending));
        }
    }

    /// Mark the slot as flushing. Returns `true` if the caller must start
    /// the drain.
    fn claim_drain(&mut self) -> bool {
        if self.flushing || self.ready.is_empty() {
            return false;
        }
        self.flushing = true;
        true
    }

    fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.timer.is_none() && self.ready.is_empty() && !self.flushing
    }
}

struct Inner<T> {
    config: DebounceConfig<T>,
    slots: Mutex<HashMap<String, KeySlot<T>>>,
    /// Keyless batches in flight.
    standalone: AtomicUsize,
    idle: Notify,
}

/// Groups bursts of entries per conversation key and delivers each burst
/// as one batch once the key has been quiet for the debounce window.
///
/// Batches for one key are delivered strictly in order, one at a time;
/// different keys flush concurrently. Cloning shares the same state.
pub struct InboundDebouncer<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for InboundDebouncer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> InboundDebouncer<T> {
    pub fn new(config: DebounceConfig<T>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                slots: Mutex::new(HashMap::new()),
                standalone: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// Accept an entry. Never blocks on delivery and never fails; flush
    /// errors go to the configured error sink.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn enqueue(&self, entry: T) {
        let inner = &self.inner;
        let Some(key) = (inner.config.build_key)(&entry) else {
            debug!("inbound entry has no conversation key, flushing alone");
            record_entry("no_key");
            inner.standalone.fetch_add(1, Ordering::SeqCst);
            let inner = Arc::clone(inner);
            tokio::spawn(async move {
                inner.deliver(None, vec![entry]).await;
                inner.standalone.fetch_sub(1, Ordering::SeqCst);
                inner.idle.notify_waiters();
            });
            return;
        };

        let debounce = inner.config.debounce;
        let immediate = debounce.is_zero() || !(inner.config.should_debounce)(&entry);

        let mut slots = inner.lock_slots();
        let slot = slots.entry(key.clone()).or_default();

        if immediate {
            record_entry("immediate");
            slot.cancel_timer();
            slot.promote_pending();
            slot.ready.push_back(vec![entry]);
            let start = slot.claim_drain();
            Inner::record_hot_keys(&slots);
            drop(slots);
            if start {
                tokio::spawn(Arc::clone(inner).drain(key));
            }
            return;
        }

        record_entry("buffered");
        // The window is measured from arrival, not from when the timer task
        // first runs.
        let deadline = Instant::now() + debounce;
        slot.pending.push(entry);
        slot.cancel_timer();
        let generation = slot.generation;
        let buffered = slot.pending.len();
        let timer_inner = Arc::clone(inner);
        let timer_key = key.clone();
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if timer_inner.expire(&timer_key, generation) {
                timer_inner.drain(timer_key).await;
            }
        }));
        Inner::record_hot_keys(&slots);
        debug!(conversation_key = %key, buffered, "buffered inbound entry");
    }

    /// Move every buffered entry into its key's delivery queue now and wait
    /// until all queued batches, including ones already in flight, are
    /// delivered.
    pub async fn flush_all(&self) {
        let to_start: Vec<String> = {
            let mut slots = self.inner.lock_slots();
            slots
                .iter_mut()
                .filter_map(|(key, slot)| {
                    slot.cancel_timer();
                    slot.promote_pending();
                    slot.claim_drain().then(|| key.clone())
                })
                .collect()
        };
        debug!(keys = to_start.len(), "flushing all inbound buffers");
        for key in to_start {
            tokio::spawn(Arc::clone(&self.inner).drain(key));
        }
        self.wait_idle().await;
    }

    /// Resolve once nothing is buffered, queued, or being delivered.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    pub fn is_idle(&self) -> bool {
        self.inner.lock_slots().is_empty() && self.inner.standalone.load(Ordering::SeqCst) == 0
    }

    /// Keys with buffered, queued, or in-flight entries, sorted.
    pub fn pending_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.lock_slots().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(feature = "metrics")]
fn record_entry(route: &'static str) {
    counter!(inbound_metrics::ENTRIES_TOTAL, labels::REASON => route).increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_entry(_route: &'static str) {}

impl<T: Send + 'static> Inner<T> {
    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, KeySlot<T>>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[cfg(feature = "metrics")]
    fn record_hot_keys(slots: &HashMap<String, KeySlot<T>>) {
        gauge!(inbound_metrics::HOT_KEYS).set(slots.len() as f64);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_hot_keys(_slots: &HashMap<String, KeySlot<T>>) {}

    /// Timer expiry. Returns `true` if the caller must start the drain.
    fn expire(&self, key: &str, generation: u64) -> bool {
        let mut slots = self.lock_slots();
        let Some(slot) = slots.get_mut(key) else {
            return false;
        };
        if slot.generation != generation {
            return false;
        }
        slot.timer = None;
        slot.promote_pending();
        slot.claim_drain()
    }

    /// Deliver queued batches for `key` until its queue is empty.
    async fn drain(self: Arc<Self>, key: String) {
        loop {
            let batch = {
                let mut slots = self.lock_slots();
                let Some(slot) = slots.get_mut(&key) else {
                    return;
                };
                match slot.ready.pop_front() {
                    Some(batch) => batch,
                    None => {
                        slot.flushing = false;
                        if slot.is_idle() {
                            slots.remove(&key);
                            Self::record_hot_keys(&slots);
                        }
                        drop(slots);
                        self.idle.notify_waiters();
                        return;
                    },
                }
            };
            self.deliver(Some(&key), batch).await;
        }
    }

    async fn deliver(&self, key: Option<&str>, batch: Vec<T>) {
        let entries = batch.len();
        debug!(conversation_key = key.unwrap_or("-"), entries, "flushing inbound batch");

        #[cfg(feature = "metrics")]
        {
            counter!(inbound_metrics::BATCHES_FLUSHED_TOTAL).increment(1);
            histogram!(inbound_metrics::BATCH_SIZE).record(entries as f64);
        }

        let result = AssertUnwindSafe((self.config.on_flush)(batch))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(anyhow::anyhow!("inbound flush handler panicked")));

        if let Err(error) = result {
            #[cfg(feature = "metrics")]
            counter!(inbound_metrics::FLUSH_ERRORS_TOTAL).increment(1);
            let on_error = &self.config.on_error;
            if std::panic::catch_unwind(AssertUnwindSafe(|| on_error(error))).is_err() {
                warn!(
                    conversation_key = key.unwrap_or("-"),
                    entries, "inbound flush error handler panicked"
                );
            }
        }
    }
}
