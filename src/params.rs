use serde::{Deserialize, Serialize};

use crate::errors::RecorderError;

/// Capture rate in Hz, fixed for the lifetime of a recorder.
pub const SAMPLE_RATE: u32 = 44_100;

/// Size in bytes of one capture period.
pub const PERIOD_BYTES: usize = 4096;

/// Samples are signed 16-bit PCM.
pub const BITS_PER_SAMPLE: u32 = 16;
pub const BYTES_PER_SAMPLE: usize = 2;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Params {
    pub sample_rate: u32,
    pub period_bytes: usize,
    /// Input device name. None selects the default input.
    pub device: Option<String>,
}

impl Params {
    pub fn defaults() -> Params {
        Params {
            sample_rate: SAMPLE_RATE,
            period_bytes: PERIOD_BYTES,
            device: None,
        }
    }

    /// Number of 16-bit samples consumed per notification period.
    pub fn period_samples(&self) -> usize {
        self.period_bytes / BYTES_PER_SAMPLE
    }

    /// Number of output frequency bins, half the period samples.
    pub fn spectrum_bins(&self) -> usize {
        self.period_samples() / 2
    }

    pub fn validate(&self) -> Result<(), RecorderError> {
        if self.period_bytes % BYTES_PER_SAMPLE != 0 {
            return Err(RecorderError::Config(format!(
                "period of {} bytes does not hold whole 16-bit samples",
                self.period_bytes
            )));
        }
        let samples = self.period_samples();
        if samples == 0 || !samples.is_power_of_two() {
            return Err(RecorderError::Config(format!(
                "period of {} bytes gives {} samples, which must be a nonzero power of two",
                self.period_bytes, samples
            )));
        }
        if self.sample_rate == 0 {
            return Err(RecorderError::Config(
                "sample rate must be nonzero".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Params;

    #[test]
    fn default_sizes() {
        let p = Params::defaults();
        assert_eq!(p.period_samples(), 2048);
        assert_eq!(p.spectrum_bins(), 1024);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_bad_periods() {
        let mut p = Params::defaults();
        p.period_bytes = 4097;
        assert!(p.validate().is_err());

        p.period_bytes = 3000; // 1500 samples, not a power of two
        assert!(p.validate().is_err());

        p.period_bytes = 0;
        assert!(p.validate().is_err());
    }
}
