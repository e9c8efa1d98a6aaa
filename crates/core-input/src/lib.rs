//! Raw keyboard input: codepoint reading, escape decoding, and the blocking
//! input thread feeding the runtime channel.

mod decoder;
mod reader;

pub use decoder::{DecodeError, DecodeState, Decoder};
pub use reader::{CodepointReader, KeyReader, KeySource};

use core_events::{CHANNEL_SEND_FAILURES, Event, InputEvent, KEYPRESS_TOTAL, Key};
use std::io::{self, Read};
use std::sync::atomic::Ordering;
use std::thread;
use tokio::sync::mpsc::Sender;
use tracing::{error, info, trace};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input stream ended")]
    StreamEnded,
    #[error("couldn't read input: {0}")]
    Read(io::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Short name of a key for logs. Inserted characters are never logged.
pub(crate) fn key_kind(key: &Key) -> &'static str {
    match key {
        Key::Insert(_) => "insert",
        Key::Backspace => "backspace",
        Key::Home => "home",
        Key::End => "end",
        Key::DeleteWord => "delete_word",
        Key::Enter => "enter",
        Key::CursorLeft => "cursor_left",
        Key::CursorRight => "cursor_right",
        Key::Interrupt => "interrupt",
    }
}

/// Spawn the OS thread that owns standard input for the life of the process.
///
/// The thread is never joined: it stays parked in a blocking read until the
/// process exits.
pub fn spawn_input_thread(sender: Sender<Event>) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("input".into())
        .spawn(move || run_input_loop(io::stdin().lock(), sender))
}

/// Decode keys from `source` and forward them until the channel closes or the
/// source fails. A failure is forwarded once as `InputEvent::Failed`.
pub fn run_input_loop<R: Read>(source: R, sender: Sender<Event>) {
    info!(target: "input.thread", "input_thread_started");
    let mut keys = KeyReader::new(source);
    loop {
        let event = match keys.next_key() {
            Ok(key) => {
                KEYPRESS_TOTAL.fetch_add(1, Ordering::Relaxed);
                trace!(target: "input.decode", key = key_kind(&key), "key");
                Event::Input(InputEvent::Key(key))
            }
            Err(err) => {
                error!(target: "input.thread", %err, "input_failed");
                if sender
                    .blocking_send(Event::Input(InputEvent::Failed(err.to_string())))
                    .is_err()
                {
                    CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                }
                break;
            }
        };
        if sender.blocking_send(event).is_err() {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            break;
        }
    }
    info!(target: "input.thread", "input_thread_stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;
    use tracing::Subscriber;
    use tracing::dispatcher::Dispatch;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::Registry;

    #[derive(Clone, Default)]
    struct Capture {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    #[derive(Clone, Debug)]
    struct CapturedEvent {
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct FieldCollector {
        fields: Vec<(String, String)>,
    }

    impl Visit for FieldCollector {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S> Layer<S> for Capture
    where
        S: Subscriber,
    {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut collector = FieldCollector::default();
            event.record(&mut collector);
            self.events.lock().unwrap().push(CapturedEvent {
                target: event.metadata().target().to_string(),
                fields: collector.fields,
            });
        }
    }

    fn drain(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn forwards_keys_then_reports_end_of_stream() {
        let (tx, mut rx) = mpsc::channel(16);
        run_input_loop(Cursor::new(b"a\x1b[D\n".to_vec()), tx);
        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                Event::Input(InputEvent::Key(Key::Insert('a'))),
                Event::Input(InputEvent::Key(Key::CursorLeft)),
                Event::Input(InputEvent::Key(Key::Enter)),
                Event::Input(InputEvent::Failed("input stream ended".into())),
            ]
        );
    }

    #[test]
    fn malformed_escape_is_forwarded_as_failure() {
        let (tx, mut rx) = mpsc::channel(16);
        run_input_loop(Cursor::new(b"\x1bOq".to_vec()), tx);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::Input(InputEvent::Failed(msg)) => assert!(msg.contains("non-CSI")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn stops_when_channel_closed() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let before = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed);
        run_input_loop(Cursor::new(b"abc".to_vec()), tx);
        assert!(CHANNEL_SEND_FAILURES.load(Ordering::Relaxed) > before);
    }

    #[test]
    fn key_trace_redacts_typed_characters() {
        let capture = Capture::default();
        let events = capture.events.clone();
        let dispatch = Dispatch::new(Registry::default().with(capture));

        tracing::dispatcher::with_default(&dispatch, || {
            let (tx, _rx) = mpsc::channel(16);
            run_input_loop(Cursor::new("sécret".as_bytes().to_vec()), tx);
        });

        let events = events.lock().unwrap();
        let decoded: Vec<_> = events
            .iter()
            .filter(|e| e.target == "input.decode")
            .collect();
        assert_eq!(decoded.len(), 6);
        for event in decoded {
            assert!(
                event
                    .fields
                    .iter()
                    .any(|(name, value)| name == "key" && value.contains("insert"))
            );
            for (_, value) in &event.fields {
                assert!(!value.contains('é'), "leaked typed character: {value}");
                assert!(!value.contains("sécret"), "leaked typed text: {value}");
            }
        }
    }
}
