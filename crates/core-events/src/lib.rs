//! Events that drive the pomodoro loop, and the tasks that produce them.
//!
//! Keystrokes, countdown ticks, window resizes and interrupts all arrive on
//! one bounded channel of [`Event`]s. The receiver owns the task list, timer
//! and screen; producers only send, so every mutation and redraw happens in
//! channel order.

use std::sync::atomic::AtomicU64;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Capacity of the event channel. A full channel parks the stdin thread in
/// `blocking_send`; keystrokes are never dropped.
pub const EVENT_CHANNEL_CAP: usize = 1024;

// Shutdown counters, logged once when the loop exits.
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static KEYPRESS_TOTAL: AtomicU64 = AtomicU64::new(0);
pub static TICKS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Everything the pomodoro loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    /// Periodic timer tick (nominally once per second).
    Tick,
    /// Window size changed; the consumer re-queries the viewport.
    Resize,
    /// Interrupt requested (SIGINT or Ctrl-C typed in raw mode).
    Interrupt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    /// The input stream can no longer be decoded (closed stdin, read error,
    /// malformed escape). Carries the diagnostic; always fatal.
    Failed(String),
}

/// Logical key produced by the input decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Insert(char),
    Backspace,
    Home,
    End,
    DeleteWord,
    Enter,
    CursorLeft,
    CursorRight,
    Interrupt,
}

/// A background producer of timer, resize or interrupt events. Each one runs
/// as a single tokio task and returns once the loop drops its receiver.
pub trait AsyncEventSource: Send + 'static {
    /// Short name used in startup logs.
    fn name(&self) -> &'static str;
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// The sources `pomo` starts before entering the loop.
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl Default for EventSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Start every registered source on its own clone of `tx`. The caller must
    /// drop its own `Sender` so the loop sees the channel close once the
    /// sources are gone.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            info!(target: "runtime.events", source = name, "event_source_spawned");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}

/// Drives the countdown: one `Event::Tick` per interval, the first a full
/// interval after start.
pub struct TickEventSource {
    interval: Duration,
}

impl TickEventSource {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl AsyncEventSource for TickEventSource {
    fn name(&self) -> &'static str {
        "tick"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let dur = self.interval;
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + dur;
            let mut interval = tokio::time::interval_at(start, dur);
            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = tx.closed() => break,
                }
                TICKS_TOTAL.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                if tx.send(Event::Tick).await.is_err() {
                    break;
                }
            }
        })
    }
}

/// Forwards terminal window-change notifications (`SIGWINCH`) as `Event::Resize`.
pub struct ResizeEventSource;

impl AsyncEventSource for ResizeEventSource {
    fn name(&self) -> &'static str {
        "resize"
    }

    #[cfg(unix)]
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        use tokio::signal::unix::{SignalKind, signal};
        tokio::spawn(async move {
            let mut winch = match signal(SignalKind::window_change()) {
                Ok(s) => s,
                Err(err) => {
                    warn!(target: "runtime.events", ?err, "resize_listener_unavailable");
                    return;
                }
            };
            loop {
                tokio::select! {
                    received = winch.recv() => {
                        if received.is_none() {
                            break;
                        }
                    }
                    _ = tx.closed() => break,
                }
                if tx.send(Event::Resize).await.is_err() {
                    break;
                }
            }
        })
    }

    #[cfg(not(unix))]
    fn spawn(self: Box<Self>, _tx: Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async {
            warn!(target: "runtime.events", "resize_listener_unsupported_platform");
        })
    }
}

/// Forwards process interrupt (SIGINT / console Ctrl-C) as `Event::Interrupt`.
pub struct InterruptEventSource;

impl AsyncEventSource for InterruptEventSource {
    fn name(&self) -> &'static str {
        "interrupt"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if let Err(err) = result {
                            warn!(target: "runtime.events", ?err, "interrupt_listener_unavailable");
                            break;
                        }
                    }
                    _ = tx.closed() => break,
                }
                if tx.send(Event::Interrupt).await.is_err() {
                    break;
                }
            }
        })
    }
}
