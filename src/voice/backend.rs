//! Audio capture backend.
//!
//! The recorder only needs three things from the audio system: a long-lived
//! client handle, a way to open a capture stream feeding a sample sink, and
//! start/stop control over that stream. `CpalBackend` provides them on top of
//! the host's input device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::audio::AudioFormat;

/// Receives every buffer of interleaved f32 samples the stream captures.
pub type SampleSink = Box<dyn FnMut(&[f32]) + Send + 'static>;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("No default audio input device available")]
    NoInputDevice,
    #[error("Input device not found: {0}")]
    DeviceNotFound(String),
    #[error("Failed to enumerate input devices: {0}")]
    Devices(#[from] cpal::DevicesError),
    #[error("Failed to build capture stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("Failed to start capture stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("Capture stream unavailable: {0}")]
    Unavailable(String),
}

/// A live capture stream owned by exactly one segment worker.
pub trait CaptureStream {
    /// Begin delivering samples to the sink. Does not block.
    fn start(&mut self) -> Result<(), BackendError>;
    /// Stop delivering samples. No sink invocation happens after this returns.
    fn stop(&mut self) -> Result<(), BackendError>;
}

/// Long-lived audio client shared by all sequential segment workers.
pub trait AudioBackend: Send + Sync {
    /// Open a new capture stream in `format`, pushing samples into `sink`.
    fn open_capture(
        &self,
        format: AudioFormat,
        sink: SampleSink,
    ) -> Result<Box<dyn CaptureStream>, BackendError>;

    /// Release the client. Called once when the recorder exits.
    fn close(&self) {}
}

pub struct CpalBackend {
    device: Device,
    device_name: String,
}

impl CpalBackend {
    /// Resolve the input device once. `device_name` of `None` uses the
    /// system default input.
    pub fn connect(device_name: Option<&str>) -> Result<Self, BackendError> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => host
                .input_devices()?
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| BackendError::DeviceNotFound(name.to_string()))?,
            None => host
                .default_input_device()
                .ok_or(BackendError::NoInputDevice)?,
        };

        let device_name = device.name().unwrap_or_else(|_| "unknown".into());
        info!(host = ?host.id(), device = %device_name, "Connected to audio input");

        Ok(Self {
            device,
            device_name,
        })
    }
}

impl AudioBackend for CpalBackend {
    fn open_capture(
        &self,
        format: AudioFormat,
        mut sink: SampleSink,
    ) -> Result<Box<dyn CaptureStream>, BackendError> {
        let config = StreamConfig {
            channels: format.channels,
            sample_rate: cpal::SampleRate(format.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = self.device.build_input_stream(
            &config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| sink(data),
            |err| error!("Audio input stream error: {}", err),
            None,
        )?;

        debug!(
            device = %self.device_name,
            sample_rate = format.sample_rate,
            channels = format.channels,
            "Capture stream built"
        );

        Ok(Box::new(CpalStream {
            stream: Some(stream),
        }))
    }

    fn close(&self) {
        info!(device = %self.device_name, "Closing audio input");
    }
}

struct CpalStream {
    stream: Option<Stream>,
}

impl CaptureStream for CpalStream {
    fn start(&mut self) -> Result<(), BackendError> {
        match self.stream {
            Some(ref stream) => Ok(stream.play()?),
            None => Err(BackendError::Unavailable("stream already stopped".into())),
        }
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        // Dropping the stream is what guarantees the callback has returned.
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                warn!("Pausing capture stream failed, dropping it anyway: {}", e);
            }
        }
        Ok(())
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
