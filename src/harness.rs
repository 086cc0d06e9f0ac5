//! Sweep of (length, stride) pairs, one fresh buffer per pair.
use crate::Element;
use crate::buffer::AlignedBuffer;
use crate::cycle::build_cycle;
use crate::error::ProbeError;
use crate::probe::{DiscardSink, measure_time, traverse};
use log::trace;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

/// Slots a cycle must exceed before its latency is worth measuring
const MIN_ACTIVE_POSITIONS: usize = 4;

/// Number of slots touched at `stride` in a buffer of `length` elements, `None` when the
/// cycle would be too short to resist the predictor
pub fn active_positions(length: usize, stride: usize) -> Option<usize> {
    let active = length / stride;
    (active > MIN_ACTIVE_POSITIONS).then_some(active)
}

/// Average latency of one step of a timed run covering `active` slots.
///
/// Dividing by the cycle length makes cells of different working-set sizes comparable.
/// Truncates to whole nanoseconds.
pub fn per_step(elapsed: Duration, active: usize) -> Duration {
    let nanos = elapsed.as_nanos() / active.max(1) as u128;
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Source of per-step latencies for every (length, stride) cell of a grid.
///
/// `on_result` receives `(length_idx, stride_idx, latency_per_step)` and is never called for
/// pairs rejected by [`active_positions`].
pub trait Sweep {
    fn sweep<F>(
        &mut self,
        stride_sizes: &[usize],
        length_sizes: &[usize],
        on_result: F,
    ) -> Result<(), ProbeError>
    where
        F: FnMut(usize, usize, Duration);
}

/// Real measurement backend walking page-aligned buffers on the current thread
pub struct Harness {
    page_size: usize,
    rng: StdRng,
    sink: DiscardSink,
}

impl Harness {
    pub fn new(page_size: usize, sink: DiscardSink) -> Self {
        Self::with_rng(page_size, sink, StdRng::from_os_rng())
    }

    /// Harness with a caller-provided random source, for reproducible cycles
    pub fn with_rng(page_size: usize, sink: DiscardSink, rng: StdRng) -> Self {
        Harness {
            page_size,
            rng,
            sink,
        }
    }

    /// Allocate, link, warm up and time a single pair. Returns latency per step.
    fn measure_pair(
        &mut self,
        length: usize,
        stride: usize,
        active: usize,
        acc: &mut Element,
    ) -> Result<Duration, ProbeError> {
        let mut buffer = AlignedBuffer::zeroed(length, self.page_size)?;
        build_cycle(&mut buffer, active, stride, &mut self.rng);

        // first touches pay for page faults and cold lines; keep them out of the timed run
        traverse(32 * active, &buffer, acc);

        let elapsed = measure_time(active, &buffer, acc);
        Ok(per_step(elapsed, active))
    }
}

impl Sweep for Harness {
    fn sweep<F>(
        &mut self,
        stride_sizes: &[usize],
        length_sizes: &[usize],
        mut on_result: F,
    ) -> Result<(), ProbeError>
    where
        F: FnMut(usize, usize, Duration),
    {
        let mut acc: Element = 0;

        for (length_idx, &length) in length_sizes.iter().enumerate() {
            for (stride_idx, &stride) in stride_sizes.iter().enumerate() {
                let Some(active) = active_positions(length, stride) else {
                    trace!("Skipping length {} stride {}: cycle too short", length, stride);
                    continue;
                };

                let latency = self.measure_pair(length, stride, active, &mut acc)?;
                trace!("length {} stride {}: {:?} per step", length, stride, latency);
                on_result(length_idx, stride_idx, latency);
            }
        }

        self.sink.discard(acc)?;
        Ok(())
    }
}
