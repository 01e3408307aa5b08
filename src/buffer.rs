use std::sync::{Condvar, Mutex, MutexGuard};

/// Outcome of waiting for one period of samples.
#[derive(Debug, PartialEq)]
pub enum ReadOutcome {
    /// A full period was copied out.
    Period,
    /// The queue closed before a full period arrived. `remaining` is the
    /// number of buffered samples that were discarded.
    Closed { remaining: usize },
}

/// SampleQueue hands captured samples from the stream callback to the
/// dispatcher. It is a fixed ring: if the producer outruns the consumer the
/// oldest samples are dropped, so a read always sees the most recent audio.
pub struct SampleQueue {
    state: Mutex<Ring>,
    available: Condvar,
}

struct Ring {
    buf: Vec<i16>,
    head: usize,
    len: usize,
    dropped: u64,
    closed: bool,
}

impl SampleQueue {
    pub fn new(capacity: usize) -> SampleQueue {
        SampleQueue {
            state: Mutex::new(Ring {
                buf: vec![0i16; capacity],
                head: 0,
                len: 0,
                dropped: 0,
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Appends captured samples, overwriting the oldest on overflow.
    pub fn push(&self, samples: &[i16]) {
        let mut ring = self.lock();
        if ring.closed {
            return;
        }
        let capacity = ring.buf.len();

        // A chunk larger than the whole ring reduces to its newest tail.
        let (skipped, samples) = if samples.len() > capacity {
            let cut = samples.len() - capacity;
            (cut as u64, &samples[cut..])
        } else {
            (0, samples)
        };

        let mut dropped = skipped;
        for &s in samples {
            let head = ring.head;
            ring.buf[head] = s;
            ring.head = (head + 1) % capacity;
            if ring.len < capacity {
                ring.len += 1;
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            ring.dropped += dropped;
            log::warn!(
                "sample queue overflow, dropped {} samples ({} total)",
                dropped,
                ring.dropped
            );
        }

        drop(ring);
        self.available.notify_one();
    }

    /// Blocks until `out.len()` samples are buffered, then drains exactly
    /// that many in capture order. After close(), any remaining full periods
    /// are still delivered before the Closed outcome.
    pub fn read_period(&self, out: &mut [i16]) -> ReadOutcome {
        let mut ring = self.lock();
        if out.len() > ring.buf.len() {
            panic!("cannot read a period larger than the queue capacity");
        }

        while ring.len < out.len() && !ring.closed {
            ring = self.available.wait(ring).unwrap_or_else(|e| e.into_inner());
        }
        if ring.len < out.len() {
            let remaining = ring.len;
            ring.len = 0;
            return ReadOutcome::Closed { remaining };
        }

        let capacity = ring.buf.len();
        let tail = (ring.head + capacity - ring.len) % capacity;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = ring.buf[(tail + i) % capacity];
        }
        ring.len -= out.len();
        ReadOutcome::Period
    }

    /// Stops accepting samples and wakes any blocked reader.
    pub fn close(&self) {
        let mut ring = self.lock();
        ring.closed = true;
        drop(ring);
        self.available.notify_all();
    }

    fn lock(&self) -> MutexGuard<Ring> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
