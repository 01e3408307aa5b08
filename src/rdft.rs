use std::sync::Arc;

extern crate rustfft;
use rustfft::num_complex::Complex;
use rustfft::FFTplanner;
use rustfft::FFT;

/// RealDft transforms a buffer of real time-domain samples in place into the
/// packed frequency layout: index 0 holds the real part of the DC component,
/// index 1 the real part of the Nyquist component, and indices 2k / 2k+1 the
/// real / imaginary parts of bin k for k in 1..N/2.
///
/// The plan and complex scratch buffers are sized once at construction and
/// reused for every period.
pub struct RealDft {
    size: usize,

    fft: Arc<dyn FFT<f64>>,

    input: Vec<Complex<f64>>,
    output: Vec<Complex<f64>>,
}

impl RealDft {
    pub fn new(size: usize) -> RealDft {
        if !size.is_power_of_two() {
            panic!("transform size must be a power of two");
        }

        let mut planner = FFTplanner::new(false);
        let fft = planner.plan_fft(size);

        RealDft {
            size,
            fft,
            input: vec![Complex::from(0f64); size],
            output: vec![Complex::from(0f64); size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Transforms `buf` in place. `buf` must have the planned size.
    pub fn process(&mut self, buf: &mut [f64]) {
        if buf.len() != self.size {
            panic!("cannot transform a buffer of a different size than planned");
        }

        for (c, &x) in self.input.iter_mut().zip(buf.iter()) {
            *c = Complex::from(x);
        }
        self.fft.process(&mut self.input, &mut self.output);

        let half = self.size / 2;
        buf[0] = self.output[0].re;
        buf[1] = self.output[half].re;
        for k in 1..half {
            buf[2 * k] = self.output[k].re;
            buf[2 * k + 1] = self.output[k].im;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RealDft;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-9;

    #[test]
    fn zero_in_zero_out() {
        let mut dft = RealDft::new(16);
        let mut buf = vec![0f64; 16];
        dft.process(&mut buf);
        assert!(buf.iter().all(|&x| x == 0.));
    }

    #[test]
    fn dc_lands_in_slot_zero() {
        let mut dft = RealDft::new(16);
        let mut buf = vec![1f64; 16];
        dft.process(&mut buf);
        assert!((buf[0] - 16.).abs() < EPS);
        assert!(buf[1..].iter().all(|&x| x.abs() < EPS));
    }

    #[test]
    fn nyquist_lands_in_slot_one() {
        let mut dft = RealDft::new(16);
        let mut buf: Vec<f64> = (0..16).map(|i| if i % 2 == 0 { 1. } else { -1. }).collect();
        dft.process(&mut buf);
        assert!((buf[1] - 16.).abs() < EPS);
        assert!(buf[0].abs() < EPS);
        assert!(buf[2..].iter().all(|&x| x.abs() < EPS));
    }

    #[test]
    fn bin_aligned_cosine_packs_as_pair() {
        let mut dft = RealDft::new(16);
        let mut buf: Vec<f64> = (0..16).map(|i| (i as f64 * 2. * PI * 2. / 16.).cos()).collect();
        dft.process(&mut buf);
        // bin 2 of a unit cosine carries N/2 in its real slot
        assert!((buf[4] - 8.).abs() < EPS);
        assert!(buf[5].abs() < EPS);
        for (i, &x) in buf.iter().enumerate() {
            if i != 4 {
                assert!(x.abs() < EPS, "slot {} expected ~0, got {}", i, x);
            }
        }
    }

    #[test]
    fn deterministic() {
        let mut dft = RealDft::new(16);
        let src: Vec<f64> = (0..16).map(|i| (i as f64 * 0.7).sin() * 3.).collect();
        let mut a = src.clone();
        let mut b = src.clone();
        dft.process(&mut a);
        dft.process(&mut b);
        assert_eq!(a, b);
    }
}
