//! Captured server console output.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// What happened to the buffer, as delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent<'a> {
    Written(&'a str),
    Cleared,
}

type Subscriber = Box<dyn Fn(OutputEvent<'_>) + Send + Sync>;

#[derive(Default)]
struct Inner {
    buffer: String,
    subscribers: Vec<(u64, Subscriber)>,
    next_id: u64,
}

/// Append-only text buffer shared between the process manager (writers) and
/// the presentation layer (readers).
///
/// Every operation runs under one lock, so a write racing a `clear` lands
/// wholly before or wholly after it. Subscribers are called with the lock
/// held and must not call back into the sink.
#[derive(Clone, Default)]
pub struct OutputSink {
    inner: Arc<Mutex<Inner>>,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self, text: &str) {
        if text.is_empty() {
            return;
        }

        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.buffer.push_str(text);
        for (_, subscriber) in &inner.subscribers {
            subscriber(OutputEvent::Written(text));
        }
    }

    /// Write `line` followed by a newline as a single append.
    pub fn write_line(&self, line: &str) {
        self.write(&format!("{line}\n"));
    }

    /// Truncate the buffer. Process state is not touched.
    pub fn clear(&self) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.buffer.clear();
        for (_, subscriber) in &inner.subscribers {
            subscriber(OutputEvent::Cleared);
        }
    }

    pub fn contents(&self) -> String {
        self.lock().buffer.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().buffer.is_empty()
    }

    /// Register a display callback. Dropping the returned handle unsubscribes.
    pub fn subscribe<F>(&self, callback: F) -> OutputSubscription
    where
        F: Fn(OutputEvent<'_>) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));

        OutputSubscription {
            id,
            sink: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// `io::Write` adapter for code that expects a stream.
    pub fn writer(&self) -> OutputWriter {
        OutputWriter { sink: self.clone() }
    }
}

/// Keeps a subscriber registered until dropped or `unsubscribe`d.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct OutputSubscription {
    id: u64,
    sink: Weak<Mutex<Inner>>,
}

impl OutputSubscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for OutputSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.sink.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Each `write` call becomes one atomic append; invalid UTF-8 is replaced.
#[derive(Clone)]
pub struct OutputWriter {
    sink: OutputSink,
}

impl io::Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
