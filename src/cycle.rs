//! Random single-cycle permutation over strided buffer slots.
//!
//! A sequential or constant-stride walk is trivially predicted by hardware prefetchers, so
//! the visiting order is a random permutation that still forms exactly one cycle: starting
//! at slot 0 and following the stored next-indices touches every active slot once before
//! coming back to 0.
use crate::{Element, MASK};
use rand::Rng;
use rand::seq::SliceRandom;

/// Encode an element index the way it is stored in the buffer
#[inline(always)]
pub fn encode(index: usize) -> Element {
    (index as Element) ^ MASK
}

/// Recover the element index from a stored value
#[inline(always)]
pub fn decode(stored: Element) -> usize {
    (stored ^ MASK) as usize
}

/// Write a random cycle over `active_positions` slots spaced `stride` elements apart.
///
/// Slot `k` lives at element `k * stride` and stores the element index of its successor,
/// obfuscated with [`MASK`]. Elements between active slots are left untouched.
pub fn build_cycle<R: Rng + ?Sized>(
    slots: &mut [Element],
    active_positions: usize,
    stride: usize,
    rng: &mut R,
) {
    assert!(active_positions >= 1, "a cycle needs at least one slot");
    assert!(stride >= 1, "stride must be positive");
    assert!(
        (active_positions - 1) * stride < slots.len(),
        "{} slots at stride {} do not fit in {} elements",
        active_positions,
        stride,
        slots.len()
    );

    let mut order: Vec<usize> = (1..active_positions).collect();
    order.shuffle(rng);
    order.push(0);

    let mut current = 0;
    for next in order {
        slots[current * stride] = encode(next * stride);
        current = next;
    }
}
