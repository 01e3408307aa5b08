use std::f64::consts::SQRT_2;
use std::sync::Mutex;

use crate::params::BITS_PER_SAMPLE;
use crate::rdft::RealDft;

/// Pipeline turns one period of raw 16-bit samples into normalized
/// magnitudes, one per frequency bin. All scratch is allocated once and
/// reused; process() performs no allocation.
pub struct Pipeline {
    bins: usize,

    rdft: RealDft,
    transform: Vec<f64>,
    spectrum: Vec<f64>,
}

impl Pipeline {
    pub fn new(samples: usize) -> Pipeline {
        Pipeline {
            bins: samples / 2,
            rdft: RealDft::new(samples),
            transform: vec![0f64; samples],
            spectrum: vec![0f64; samples / 2],
        }
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Runs one period: cast to f64, transform in place, normalize. The
    /// returned slice is the pipeline's own spectrum buffer and is
    /// overwritten by the next call.
    pub fn process(&mut self, raw: &[i16]) -> &[f64] {
        if raw.len() != self.transform.len() {
            panic!("period length does not match the pipeline size");
        }

        for (y, &s) in self.transform.iter_mut().zip(raw.iter()) {
            *y = f64::from(s);
        }
        self.rdft.process(&mut self.transform);

        let gain = self.bins as f64;
        let full_scale = f64::from(1u32 << BITS_PER_SAMPLE);
        for i in 0..self.bins {
            // Bin 0 reads the packed DC and Nyquist slots through the same
            // formula as every other bin; kept for parity with the values
            // existing consumers were calibrated against.
            let re = self.transform[2 * i] / gain;
            let im = self.transform[2 * i + 1] / gain;
            self.spectrum[i] = (re * re + im * im).sqrt() / full_scale / SQRT_2;
        }

        &self.spectrum
    }
}

/// SpectrumSlot is a single-slot channel holding the most recently published
/// spectrum. Each publish overwrites the previous contents, so a reader
/// always sees the latest period and nothing queues up.
pub struct SpectrumSlot {
    inner: Mutex<Slot>,
}

struct Slot {
    spectrum: Vec<f64>,
    period: u64,
}

impl SpectrumSlot {
    pub fn new(bins: usize) -> SpectrumSlot {
        SpectrumSlot {
            inner: Mutex::new(Slot {
                spectrum: vec![0f64; bins],
                period: 0,
            }),
        }
    }

    pub fn bins(&self) -> usize {
        let slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        slot.spectrum.len()
    }

    pub(crate) fn publish(&self, spectrum: &[f64]) {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        slot.spectrum.copy_from_slice(spectrum);
        slot.period += 1;
    }

    /// Copies the latest spectrum into `out` and returns the number of
    /// periods published so far. 0 means nothing has been captured yet.
    pub fn snapshot(&self, out: &mut Vec<f64>) -> u64 {
        let slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        out.clear();
        out.extend_from_slice(&slot.spectrum);
        slot.period
    }
}

#[cfg(test)]
mod tests {
    use super::{Pipeline, SpectrumSlot};
    use std::f64::consts::PI;

    #[test]
    fn zero_input_gives_zero_spectrum() {
        let mut p = Pipeline::new(2048);
        let raw = vec![0i16; 2048];
        let spectrum = p.process(&raw);
        assert_eq!(spectrum.len(), 1024);
        assert!(spectrum.iter().all(|&x| x == 0.));
    }

    #[test]
    fn full_scale_square_wave_stays_bounded() {
        let mut p = Pipeline::new(2048);
        let raw: Vec<i16> = (0..2048)
            .map(|i| if i % 2 == 0 { 32767 } else { -32768 })
            .collect();
        let spectrum = p.process(&raw);
        for &m in spectrum {
            assert!(m.is_finite());
            assert!(m >= 0. && m <= 2.);
        }
    }

    #[test]
    fn bin_aligned_sine_peaks_at_its_bin() {
        // f = 40 * 44100 / 2048 Hz, exactly on bin 40
        let mut p = Pipeline::new(2048);
        let k = 40;
        let raw: Vec<i16> = (0..2048)
            .map(|i| (30000. * (2. * PI * k as f64 * i as f64 / 2048.).sin()) as i16)
            .collect();
        let spectrum = p.process(&raw).to_vec();

        let (peak, _) = spectrum
            .iter()
            .enumerate()
            .fold((0, 0f64), |acc, (i, &m)| if m > acc.1 { (i, m) } else { acc });
        assert_eq!(peak, k);
        assert!(spectrum[k] > 5. * spectrum[k - 1]);
        assert!(spectrum[k] > 5. * spectrum[k + 1]);

        // amplitude A normalizes to roughly A / 2^16 / sqrt(2)
        let expected = 30000. / 65536. / (2f64).sqrt();
        assert!((spectrum[k] - expected).abs() < 1e-2);
    }

    #[test]
    fn deterministic_across_runs() {
        let mut p = Pipeline::new(2048);
        let raw: Vec<i16> = (0..2048).map(|i| ((i * 37) % 1999) as i16 - 999).collect();
        let first = p.process(&raw).to_vec();
        let second = p.process(&raw).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn output_length_is_half_the_period() {
        for &n in &[16usize, 256, 2048] {
            let mut p = Pipeline::new(n);
            assert_eq!(p.bins(), n / 2);
            let raw = vec![0i16; n];
            assert_eq!(p.process(&raw).len(), n / 2);
        }
    }

    #[test]
    fn slot_keeps_latest_value() {
        let slot = SpectrumSlot::new(4);
        let mut out = Vec::new();
        assert_eq!(slot.snapshot(&mut out), 0);
        assert_eq!(out, vec![0f64; 4]);

        slot.publish(&[1., 2., 3., 4.]);
        slot.publish(&[5., 6., 7., 8.]);
        assert_eq!(slot.snapshot(&mut out), 2);
        assert_eq!(out, vec![5., 6., 7., 8.]);
    }
}
