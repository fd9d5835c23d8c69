//! Audio capture from microphone
//!
//! `cpal::Stream` is `!Send`, so each capture runs on its own thread that
//! owns the stream until told to stop. The handle returned to callers only
//! holds channels and the shared sample buffer.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BuildStreamError, Device, SampleFormat, StreamConfig};

use super::session::{CaptureStream, Microphone};
use crate::{Error, Result};

/// MIME type of recordings produced by [`CpalMicrophone`]
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// Information about an available input device
#[derive(Debug, Clone)]
pub struct InputDeviceInfo {
    /// Human-readable device name
    pub name: String,
    /// Whether this is the system default input device
    pub is_default: bool,
}

/// Microphone backed by the default cpal input device
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalMicrophone;

impl CpalMicrophone {
    /// Create a microphone handle; the device is opened per recording
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// List available input devices
    ///
    /// # Errors
    ///
    /// Returns error if devices cannot be enumerated
    pub fn list_devices() -> Result<Vec<InputDeviceInfo>> {
        let host = cpal::default_host();
        let default_name = host
            .default_input_device()
            .and_then(|d| d.name().ok())
            .unwrap_or_default();

        let devices = host
            .input_devices()
            .map_err(|e| Error::Device(e.to_string()))?;

        Ok(devices
            .filter_map(|device| device.name().ok())
            .map(|name| InputDeviceInfo {
                is_default: name == default_name,
                name,
            })
            .collect())
    }
}

#[async_trait]
impl Microphone for CpalMicrophone {
    async fn open(&self) -> Result<Box<dyn CaptureStream>> {
        let capture = tokio::task::spawn_blocking(CpalCapture::start)
            .await
            .map_err(|e| Error::Device(format!("capture task failed: {e}")))??;
        Ok(Box::new(capture))
    }
}

/// Live capture running on a dedicated thread
pub struct CpalCapture {
    stop_tx: Option<mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
    buffer: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
}

impl CpalCapture {
    /// Open the default input device and start capturing
    ///
    /// Blocks until the device is running or has failed to start.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if no input device is reachable and
    /// `Device` if the stream cannot be built or started
    pub fn start() -> Result<Self> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (init_tx, init_rx) = mpsc::channel::<Result<u32>>();

        let thread_buffer = Arc::clone(&buffer);
        let thread = thread::Builder::new()
            .name("lipi-capture".into())
            .spawn(move || run_capture(&thread_buffer, &stop_rx, &init_tx))
            .map_err(|e| Error::Device(format!("failed to spawn capture thread: {e}")))?;

        let sample_rate = match init_rx.recv() {
            Ok(Ok(rate)) => rate,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread.join();
                return Err(Error::Device("capture thread exited during start".to_string()));
            }
        };

        tracing::debug!(sample_rate, "audio capture started");

        Ok(Self {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
            buffer,
            sample_rate,
        })
    }

    /// Stop the capture thread and return the mono samples collected
    fn shutdown(&mut self) -> Result<Vec<f32>> {
        // Dropping the sender wakes the capture thread
        self.stop_tx.take();

        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| Error::Device("capture thread panicked".to_string()))?;
            tracing::debug!("audio capture stopped");
        }

        Ok(self
            .buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default())
    }
}

impl CaptureStream for CpalCapture {
    fn mime_type(&self) -> &str {
        WAV_MIME_TYPE
    }

    fn stop(&mut self) -> Result<Vec<Vec<u8>>> {
        let samples = self.shutdown()?;
        if samples.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![samples_to_wav(&samples, self.sample_rate)?])
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.shutdown();
        }
    }
}

/// Body of the capture thread: owns the cpal stream until stopped
fn run_capture(
    buffer: &Arc<Mutex<Vec<f32>>>,
    stop_rx: &mpsc::Receiver<()>,
    init_tx: &mpsc::Sender<Result<u32>>,
) {
    let stream = match build_stream(buffer) {
        Ok((stream, rate)) => {
            if let Err(e) = stream.play() {
                let _ = init_tx.send(Err(Error::Device(e.to_string())));
                return;
            }
            let _ = init_tx.send(Ok(rate));
            stream
        }
        Err(e) => {
            let _ = init_tx.send(Err(e));
            return;
        }
    };

    // Blocks until a stop message arrives or the handle is dropped
    let _ = stop_rx.recv();
    drop(stream);
}

fn build_stream(buffer: &Arc<Mutex<Vec<f32>>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| Error::PermissionDenied("no input device available".to_string()))?;

    let supported = device
        .default_input_config()
        .map_err(|e| Error::Device(e.to_string()))?;

    let sample_rate = supported.sample_rate().0;
    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.into();

    tracing::debug!(
        device = device.name().unwrap_or_default(),
        sample_rate,
        channels = config.channels,
        ?sample_format,
        "audio capture initialized"
    );

    let stream = match sample_format {
        SampleFormat::F32 => input_stream::<f32>(&device, &config, buffer, |s| s),
        SampleFormat::I16 => {
            input_stream::<i16>(&device, &config, buffer, |s| f32::from(s) / 32768.0)
        }
        SampleFormat::U16 => input_stream::<u16>(&device, &config, buffer, |s| {
            (f32::from(s) - 32768.0) / 32768.0
        }),
        other => {
            return Err(Error::Device(format!(
                "unsupported input sample format: {other:?}"
            )));
        }
    }
    .map_err(|e| match e {
        BuildStreamError::DeviceNotAvailable => {
            Error::PermissionDenied("input device not available".to_string())
        }
        other => Error::Device(other.to_string()),
    })?;

    Ok((stream, sample_rate))
}

fn input_stream<T>(
    device: &Device,
    config: &StreamConfig,
    buffer: &Arc<Mutex<Vec<f32>>>,
    convert: fn(T) -> f32,
) -> std::result::Result<cpal::Stream, BuildStreamError>
where
    T: cpal::SizedSample + Send + 'static,
{
    let buffer = Arc::clone(buffer);
    let channels = usize::from(config.channels.max(1));

    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            if let Ok(mut buf) = buffer.lock() {
                buf.extend(data.chunks(channels).map(|frame| {
                    #[allow(clippy::cast_precision_loss)]
                    let len = frame.len() as f32;
                    frame.iter().map(|&s| convert(s)).sum::<f32>() / len
                }));
            }
        },
        |err| {
            tracing::error!(error = %err, "audio capture error");
        },
        None,
    )
}

/// Convert f32 samples to 16-bit mono WAV bytes
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

/// Root-mean-square level of a block of samples
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

impl CpalCapture {
    /// Copy of the samples captured so far, for level metering
    #[must_use]
    pub fn peek_samples(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    /// Discard samples captured so far
    pub fn clear_samples(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }

    /// Device sample rate
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms() {
        assert!(rms(&[]) < f32::EPSILON);
        assert!(rms(&[0.0; 64]) < 0.001);
        assert!(rms(&[0.5; 64]) > 0.4);
    }

    #[test]
    fn test_wav_header() {
        let wav = samples_to_wav(&[0.0, 0.25, -0.25], 16_000).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 3 * 2);
    }
}
