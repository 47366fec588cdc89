#![forbid(unsafe_code)]

//! Item-stream subscriptions bound to the carousel's attach lifecycle.
//!
//! Card providers are modelled as [`ItemStream`]s that push
//! [`StreamEvent`]s from a background thread. While the carousel is attached
//! every declared stream runs; detaching stops them. Events are queued on a
//! channel and drained by the event loop, so they re-enter the same
//! serialized queue as interaction and animation events.
//!
//! # How it works
//!
//! 1. [`StreamSubscription::attach`] starts every stream not already running
//! 2. Streams send events until stopped or the receiver is dropped
//! 3. [`StreamSubscription::drain`] hands queued events over in arrival order
//! 4. [`StreamSubscription::detach`] stops and joins every stream
//!
//! A stream whose `run` returns or panics before it was stopped is reported
//! as [`StreamEvent::Failed`], so termination reaches the coordinator the
//! same way a provider error does.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use smartspace_core::{ItemSet, RawItem};

/// A unique identifier for a stream.
pub type StreamId = u64;

/// One emission from a card provider.
#[derive(Debug, Clone)]
pub enum StreamEvent<P> {
    /// A validated card set.
    Items(ItemSet<P>),
    /// Unvalidated provider output; malformed entries are dropped on apply.
    Raw(Vec<RawItem<P>>),
    /// The provider failed or ended. The carousel keeps what it last showed.
    Failed(String),
}

/// A provider of card sets.
///
/// Streams run on background threads and push events through the sender.
pub trait ItemStream<P: Send + Sync + 'static>: Send + Sync {
    /// Unique identifier for deduplication across attach cycles.
    fn id(&self) -> StreamId;

    /// Send events until the channel disconnects or `stop` is triggered.
    /// Returning earlier counts as a stream failure.
    fn run(&self, sender: mpsc::Sender<StreamEvent<P>>, stop: StopSignal);
}

/// Signal for stopping a stream.
#[derive(Clone)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub(crate) fn new() -> (Self, StopTrigger) {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    /// Check if the stop signal has been triggered.
    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for either the stop signal or a timeout.
    ///
    /// Returns `true` if stopped, `false` if timed out.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            return true;
        }
        let (stopped, _) = cvar
            .wait_timeout_while(stopped, duration, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }

    /// Block until the stop signal is triggered.
    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _stopped = cvar
            .wait_while(stopped, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

/// Trigger to stop a stream from the carousel side.
pub(crate) struct StopTrigger {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopTrigger {
    pub(crate) fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }
}

struct RunningStream {
    id: StreamId,
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl RunningStream {
    fn stop(mut self) {
        self.trigger.stop();
        // Panics are caught inside the thread and reported as failures.
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RunningStream {
    fn drop(&mut self) {
        self.trigger.stop();
    }
}

/// Runs the carousel's item streams while it is attached.
pub struct StreamSubscription<P: Send + Sync + 'static> {
    active: Vec<RunningStream>,
    sender: mpsc::Sender<StreamEvent<P>>,
    receiver: mpsc::Receiver<StreamEvent<P>>,
}

impl<P: Send + Sync + 'static> Default for StreamSubscription<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Send + Sync + 'static> std::fmt::Debug for StreamSubscription<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSubscription")
            .field("active", &self.active.iter().map(|r| r.id).collect::<Vec<_>>())
            .finish()
    }
}

impl<P: Send + Sync + 'static> StreamSubscription<P> {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            active: Vec::new(),
            sender,
            receiver,
        }
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.active.is_empty()
    }

    /// Ids of the running streams.
    #[must_use]
    pub fn active_ids(&self) -> Vec<StreamId> {
        self.active.iter().map(|r| r.id).collect()
    }

    /// Start every stream in `streams` that is not already running.
    pub fn attach(&mut self, streams: &[Arc<dyn ItemStream<P>>]) {
        let mut active_ids: HashSet<StreamId> = self.active.iter().map(|r| r.id).collect();
        for stream in streams {
            let id = stream.id();
            if !active_ids.insert(id) {
                continue;
            }

            tracing::debug!(stream_id = id, "starting item stream");
            let (signal, trigger) = StopSignal::new();
            let sender = self.sender.clone();
            let stream = Arc::clone(stream);
            let thread = thread::spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    stream.run(sender.clone(), signal.clone());
                }));
                if signal.is_stopped() {
                    return;
                }
                let reason = match outcome {
                    Ok(()) => "item stream ended",
                    Err(_) => "item stream panicked",
                };
                tracing::warn!(stream_id = id, reason, "item stream terminated while attached");
                let _ = sender.send(StreamEvent::Failed(reason.to_owned()));
            });

            self.active.push(RunningStream {
                id,
                trigger,
                thread: Some(thread),
            });
        }
    }

    /// Stop and join every running stream. Events already queued are kept.
    pub fn detach(&mut self) {
        for running in self.active.drain(..) {
            tracing::debug!(stream_id = running.id, "stopping item stream");
            running.stop();
        }
    }

    /// Drain queued events in arrival order.
    pub fn drain(&self) -> Vec<StreamEvent<P>> {
        self.receiver.try_iter().collect()
    }

    /// Block up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<StreamEvent<P>> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

impl<P: Send + Sync + 'static> Drop for StreamSubscription<P> {
    fn drop(&mut self) {
        self.detach();
    }
}

// --- Built-in streams ---

/// Emits one fixed card set, then stays quiet until stopped.
pub struct StaticStream<P> {
    id: StreamId,
    items: ItemSet<P>,
}

impl<P> StaticStream<P> {
    pub fn new(id: StreamId, items: ItemSet<P>) -> Self {
        Self { id, items }
    }
}

impl<P: Send + Sync + 'static> ItemStream<P> for StaticStream<P> {
    fn id(&self) -> StreamId {
        self.id
    }

    fn run(&self, sender: mpsc::Sender<StreamEvent<P>>, stop: StopSignal) {
        if sender.send(StreamEvent::Items(self.items.clone())).is_ok() {
            stop.wait();
        }
    }
}

/// Re-emits a freshly built card set immediately and then on every period.
pub struct IntervalStream<P> {
    id: StreamId,
    interval: Duration,
    make: Box<dyn Fn() -> StreamEvent<P> + Send + Sync>,
}

impl<P> IntervalStream<P> {
    pub fn new(
        id: StreamId,
        interval: Duration,
        make: impl Fn() -> StreamEvent<P> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            interval,
            make: Box::new(make),
        }
    }
}

impl<P: Send + Sync + 'static> ItemStream<P> for IntervalStream<P> {
    fn id(&self) -> StreamId {
        self.id
    }

    fn run(&self, sender: mpsc::Sender<StreamEvent<P>>, stop: StopSignal) {
        loop {
            if sender.send((self.make)()).is_err() {
                break;
            }
            if stop.wait_timeout(self.interval) {
                break;
            }
        }
    }
}

/// Sends a scripted list of events, then stays open until stopped. For tests.
pub struct MockStream<P> {
    id: StreamId,
    events: Vec<StreamEvent<P>>,
}

impl<P: Clone> MockStream<P> {
    pub fn new(id: StreamId, events: Vec<StreamEvent<P>>) -> Self {
        Self { id, events }
    }
}

impl<P: Clone + Send + Sync + 'static> ItemStream<P> for MockStream<P> {
    fn id(&self) -> StreamId {
        self.id
    }

    fn run(&self, sender: mpsc::Sender<StreamEvent<P>>, stop: StopSignal) {
        for event in &self.events {
            if sender.send(event.clone()).is_err() {
                return;
            }
        }
        stop.wait();
    }
}
