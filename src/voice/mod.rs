pub mod audio;
pub mod backend;
pub mod controller;
pub mod handshake;
pub mod segment;
pub mod storage;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{AudioBackend, BackendError, CpalBackend};
pub use controller::{RunSummary, SegmentController, SEGMENT_DURATION};
pub use worker::SegmentWorker;
