//! In-memory audio backend for exercising workers and the controller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use super::audio::AudioFormat;
use super::backend::{AudioBackend, BackendError, CaptureStream, SampleSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEvent {
    Opened,
    Started,
    Stopped,
}

#[derive(Default)]
pub struct MockBackendBuilder {
    samples_per_start: usize,
    fail_opens: Vec<usize>,
    cancel_on_open: Option<(usize, CancellationToken)>,
}

impl MockBackendBuilder {
    /// Samples pushed through the sink when a stream starts.
    pub fn samples_per_start(mut self, samples: usize) -> Self {
        self.samples_per_start = samples;
        self
    }

    /// 1-based open attempts that fail.
    pub fn fail_opens(mut self, attempts: &[usize]) -> Self {
        self.fail_opens = attempts.to_vec();
        self
    }

    /// Raise `token` during the given 1-based open attempt.
    pub fn cancel_on_open(mut self, attempt: usize, token: CancellationToken) -> Self {
        self.cancel_on_open = Some((attempt, token));
        self
    }

    pub fn build(self) -> Arc<MockBackend> {
        Arc::new(MockBackend {
            config: self,
            opens: AtomicUsize::new(0),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
            events: Arc::new(Mutex::new(Vec::new())),
        })
    }
}

pub struct MockBackend {
    config: MockBackendBuilder,
    opens: AtomicUsize,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    events: Arc<Mutex<Vec<MockEvent>>>,
}

impl MockBackend {
    pub fn builder() -> MockBackendBuilder {
        MockBackendBuilder::default()
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Highest number of streams that were started and not yet stopped.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<MockEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AudioBackend for MockBackend {
    fn open_capture(
        &self,
        _format: AudioFormat,
        sink: SampleSink,
    ) -> Result<Box<dyn CaptureStream>, BackendError> {
        let attempt = self.opens.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some((cancel_at, token)) = &self.config.cancel_on_open {
            if *cancel_at == attempt {
                token.cancel();
            }
        }

        if self.config.fail_opens.contains(&attempt) {
            return Err(BackendError::Unavailable(format!("mock open {attempt} failed")));
        }

        self.events.lock().unwrap().push(MockEvent::Opened);

        Ok(Box::new(MockStream {
            sink,
            samples_per_start: self.config.samples_per_start,
            running: false,
            active: Arc::clone(&self.active),
            max_active: Arc::clone(&self.max_active),
            events: Arc::clone(&self.events),
        }))
    }
}

struct MockStream {
    sink: SampleSink,
    samples_per_start: usize,
    running: bool,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    events: Arc<Mutex<Vec<MockEvent>>>,
}

impl CaptureStream for MockStream {
    fn start(&mut self) -> Result<(), BackendError> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        self.running = true;
        self.events.lock().unwrap().push(MockEvent::Started);

        let samples = vec![0.1_f32; self.samples_per_start];
        (self.sink)(samples.as_slice());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        if self.running {
            self.running = false;
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.events.lock().unwrap().push(MockEvent::Stopped);
        }
        Ok(())
    }
}
