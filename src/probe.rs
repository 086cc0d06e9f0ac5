//! Pointer-chasing traversal, the raw timing primitive.
use crate::Element;
use crate::cycle::decode;
use std::hint::black_box;
use std::io::Write;
use std::time::{Duration, Instant};

/// Walk `steps` links of a cycle built by [`crate::cycle::build_cycle`], starting at element 0.
///
/// Every read depends on the previous one, so the loop exposes load latency rather than
/// bandwidth. Each recovered index is folded into `acc`; without that the compiler is free
/// to drop the whole walk. Keep it.
#[inline(never)]
pub fn traverse(steps: usize, slots: &[Element], acc: &mut Element) {
    let mut current = 0usize;
    for _ in 0..steps {
        current = decode(slots[current]);
        *acc = acc.wrapping_add(current as Element);
    }
}

/// Time sixteen full laps of a cycle with `active_positions` slots
#[inline(never)]
pub fn measure_time(active_positions: usize, slots: &[Element], acc: &mut Element) -> Duration {
    let start = Instant::now();
    traverse(16 * active_positions, slots, acc);
    start.elapsed()
}

/// Opaque destination for traversal accumulators.
///
/// Values written here are never read back. The sink exists so the optimizer has to assume
/// the accumulator, and therefore every load feeding it, is observable.
pub struct DiscardSink {
    out: Box<dyn Write>,
}

impl DiscardSink {
    /// Sink into an arbitrary writer (tests use a `Vec<u8>`)
    pub fn new(out: Box<dyn Write>) -> Self {
        DiscardSink { out }
    }

    pub fn discard(&mut self, acc: Element) -> std::io::Result<()> {
        write!(self.out, "{}", black_box(acc))
    }
}

impl Default for DiscardSink {
    fn default() -> Self {
        Self::new(Box::new(std::io::sink()))
    }
}
