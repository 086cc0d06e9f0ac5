//! Breakpoint detection on the aggregated grid.
//!
//! Latency per access is flat while the working set fits in a cache level and jumps once it
//! spills into the next one. Likewise, it jumps again once the stride exceeds the line size,
//! because every access then fetches a fresh line. Both scans look for the first relative
//! jump above a threshold; the thresholds separate regime changes from run-to-run noise.
use crate::ELEMENT_SIZE;
use crate::aggregate::ResultGrid;
use log::info;

/// Minimum ratio between neighbouring lengths that counts as leaving a cache level
pub const CAPACITY_JUMP: f64 = 1.2;

/// Minimum ratio between neighbouring strides that counts as crossing a cache line
pub const LINE_SIZE_JUMP: f64 = 1.1;

/// Index of the first element that exceeds its predecessor by more than `ratio`
fn first_jump(latencies: &[f64], ratio: f64) -> Option<usize> {
    latencies
        .windows(2)
        .position(|pair| pair[1] > pair[0] * ratio)
        .map(|i| i + 1)
}

/// Index of the largest length that still fits in the cache
pub fn find_capacity_index(latencies_by_length: &[f64]) -> Option<usize> {
    first_jump(latencies_by_length, CAPACITY_JUMP).map(|i| i - 1)
}

/// Index of the first stride that no longer shares a cache line with its predecessor
pub fn find_line_size_index(latencies_by_stride: &[f64]) -> Option<usize> {
    first_jump(latencies_by_stride, LINE_SIZE_JUMP)
}

/// Cache properties inferred from one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheGeometry {
    pub capacity_bytes: Option<usize>,
    pub line_size_bytes: Option<usize>,
}

impl CacheGeometry {
    /// Scan capacity at the smallest stride, then line size one length past the capacity.
    ///
    /// Line size is only probed when a capacity was found: its row depends on that index.
    pub fn infer(grid: &ResultGrid, stride_sizes: &[usize], length_sizes: &[usize]) -> Self {
        if grid.strides() == 0 {
            return CacheGeometry::default();
        }

        let capacity_idx = find_capacity_index(&grid.along_lengths(0));
        let line_idx = capacity_idx
            .and_then(|idx| grid.along_strides(idx + 1))
            .and_then(find_line_size_index);

        let geometry = CacheGeometry {
            capacity_bytes: capacity_idx.map(|idx| length_sizes[idx] * ELEMENT_SIZE),
            line_size_bytes: line_idx.map(|idx| stride_sizes[idx] * ELEMENT_SIZE),
        };
        info!(
            "Inferred capacity {:?} bytes, line size {:?} bytes",
            geometry.capacity_bytes, geometry.line_size_bytes
        );
        geometry
    }
}
