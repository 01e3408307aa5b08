use std::sync::{Arc, Mutex};
use std::thread;

use cpal::traits::StreamTrait;

use crate::buffer::{ReadOutcome, SampleQueue};
use crate::errors::RecorderError;
use crate::params::Params;
use crate::source::Source;
use crate::spectrum::{Pipeline, SpectrumSlot};

/// Callback receiving the normalized spectrum once per capture period, on
/// the dispatcher thread. The slice is overwritten on the next period, so a
/// consumer that needs a stable snapshot must copy it before returning.
pub type SpectrumCallback = Box<dyn FnMut(&[f64]) + Send>;

type SharedListener = Arc<Mutex<Option<SpectrumCallback>>>;

// Slack for scheduling jitter between the capture callback and the worker.
const QUEUE_PERIODS: usize = 4;

/// Recorder owns the capture stream, the sample queue, and the dispatcher
/// worker that turns each period of samples into a spectrum.
pub struct Recorder {
    sample_rate: u32,
    bins: usize,

    stream: cpal::Stream,
    queue: Arc<SampleQueue>,
    slot: Arc<SpectrumSlot>,
    listener: SharedListener,
    worker: Option<thread::JoinHandle<()>>,
}

impl Recorder {
    /// Opens the input device and prepares the whole pipeline, mono 16-bit
    /// PCM at the configured rate. Capture does not begin until start().
    /// On failure no partial recorder is produced.
    pub fn initialize(params: Params) -> Result<Recorder, RecorderError> {
        params.validate()?;
        let samples = params.period_samples();
        let bins = params.spectrum_bins();

        let queue = Arc::new(SampleQueue::new(samples * QUEUE_PERIODS));
        let slot = Arc::new(SpectrumSlot::new(bins));
        let listener: SharedListener = Arc::new(Mutex::new(None));

        let source = Source::new(params.device.as_deref())?;
        let producer = queue.clone();
        let stream = source.get_stream(
            1,
            params.sample_rate,
            samples as u32,
            Box::new(move |data: &[i16]| producer.push(data)),
        )?;

        let worker = {
            let queue = queue.clone();
            let slot = slot.clone();
            let listener = listener.clone();
            thread::spawn(move || run_dispatcher(samples, &queue, &slot, &listener))
        };

        log::debug!(
            "recorder initialized: {} samples per period, {} bins at {} Hz",
            samples,
            bins,
            params.sample_rate
        );

        Ok(Recorder {
            sample_rate: params.sample_rate,
            bins,
            stream,
            queue,
            slot,
            listener,
            worker: Some(worker),
        })
    }

    /// Begins capture.
    pub fn start(&self) -> Result<(), RecorderError> {
        log::debug!("start capture");
        self.stream.play()?;
        Ok(())
    }

    /// Halts capture. Safe to call at any time, including before start() and
    /// while a period is being dispatched.
    pub fn stop(&self) -> Result<(), RecorderError> {
        log::debug!("stop capture");
        self.stream.pause()?;
        Ok(())
    }

    /// Replaces the registered listener. At most one listener is held at a
    /// time. A replacement during an in-flight dispatch takes effect at the
    /// next period boundary.
    pub fn set_listener(&self, cb: SpectrumCallback) {
        let mut listener = self.listener.lock().unwrap_or_else(|e| e.into_inner());
        *listener = Some(cb);
    }

    pub fn clear_listener(&self) {
        let mut listener = self.listener.lock().unwrap_or_else(|e| e.into_inner());
        *listener = None;
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frequency bins in each published spectrum.
    pub fn spectrum_bins(&self) -> usize {
        self.bins
    }

    /// Copies the most recent spectrum into `out` and returns the period
    /// counter. 0 means nothing has been captured yet.
    pub fn latest(&self, out: &mut Vec<f64>) -> u64 {
        self.slot.snapshot(out)
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.queue.close();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("dispatcher worker panicked");
            }
        }
    }
}

/// Dispatcher loop: drain exactly one period of samples, run the pipeline,
/// publish the result, notify the listener. A short period left in the queue
/// at close is discarded rather than transformed.
fn run_dispatcher(
    samples: usize,
    queue: &SampleQueue,
    slot: &SpectrumSlot,
    listener: &SharedListener,
) {
    let mut pipeline = Pipeline::new(samples);
    let mut raw = vec![0i16; samples];

    loop {
        match queue.read_period(&mut raw) {
            ReadOutcome::Period => {
                let spectrum = pipeline.process(&raw);
                slot.publish(spectrum);

                let mut guard = listener.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(cb) = guard.as_mut() {
                    cb(spectrum);
                }
            }
            ReadOutcome::Closed { remaining } => {
                if remaining > 0 {
                    log::debug!("discarding short period of {} samples", remaining);
                }
                break;
            }
        }
    }
}
