//! Repeated sweeps reduced to one robust latency per cell.
use crate::error::ProbeError;
use crate::harness::Sweep;
use log::debug;
use std::time::Duration;

/// Share of the sorted samples kept by [`trimmed_mean`], as a fraction `KEEP_NUM / KEEP_DEN`
const KEEP_NUM: usize = 4;
const KEEP_DEN: usize = 5;

/// Mean latency in nanoseconds over the fastest 80% of `samples`.
///
/// Interrupts and scheduler noise only ever make a measurement slower, so the top fifth is
/// dropped. Sorts `samples` in place. Empty input yields `NaN` so a cell that was never
/// measured cannot be mistaken for a fast one.
pub fn trimmed_mean(samples: &mut [Duration]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    samples.sort_unstable();

    // floor(len * 0.8), but a lone sample is still a measurement
    let keep = (samples.len() * KEEP_NUM / KEEP_DEN).max(1);
    let total: u128 = samples[..keep].iter().map(Duration::as_nanos).sum();
    total as f64 / keep as f64
}

/// Trimmed-mean latency per access, indexed by (length, stride)
#[derive(Debug, Clone, PartialEq)]
pub struct ResultGrid {
    cells: Vec<Vec<f64>>,
}

impl ResultGrid {
    /// Grid from rows of per-stride latencies, one row per length
    pub fn from_rows(cells: Vec<Vec<f64>>) -> Self {
        ResultGrid { cells }
    }

    pub fn lengths(&self) -> usize {
        self.cells.len()
    }

    pub fn strides(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn latency(&self, length_idx: usize, stride_idx: usize) -> f64 {
        self.cells[length_idx][stride_idx]
    }

    /// Latencies of every length at one stride, in length order
    pub fn along_lengths(&self, stride_idx: usize) -> Vec<f64> {
        self.cells.iter().map(|row| row[stride_idx]).collect()
    }

    /// Latencies of every stride at one length, `None` past the last length
    pub fn along_strides(&self, length_idx: usize) -> Option<&[f64]> {
        self.cells.get(length_idx).map(Vec::as_slice)
    }
}

/// Run `trials` independent sweeps and reduce every cell with [`trimmed_mean`]
pub fn collect_grid<S: Sweep>(
    sweeper: &mut S,
    stride_sizes: &[usize],
    length_sizes: &[usize],
    trials: usize,
) -> Result<ResultGrid, ProbeError> {
    let mut samples: Vec<Vec<Vec<Duration>>> =
        vec![vec![Vec::with_capacity(trials); stride_sizes.len()]; length_sizes.len()];

    for trial in 0..trials {
        debug!("Trial {}/{}", trial + 1, trials);
        sweeper.sweep(stride_sizes, length_sizes, |length_idx, stride_idx, latency| {
            samples[length_idx][stride_idx].push(latency)
        })?;
    }

    let cells = samples
        .iter_mut()
        .map(|row| row.iter_mut().map(|cell| trimmed_mean(cell)).collect())
        .collect();
    Ok(ResultGrid::from_rows(cells))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nanos(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_nanos).collect()
    }

    #[test]
    fn empty_cell_is_nan() {
        assert!(trimmed_mean(&mut []).is_nan());
    }

    #[test]
    fn identical_samples_average_exactly() {
        let mut samples = vec![Duration::from_nanos(7); 100];
        assert_eq!(trimmed_mean(&mut samples), 7.0);
    }

    #[test]
    fn top_fifth_is_dropped() {
        // 10 samples: keep the lowest 8
        let mut samples = nanos(&[9, 1, 2, 1000, 3, 4, 5, 500, 6, 7]);
        assert_eq!(trimmed_mean(&mut samples), (1 + 2 + 3 + 4 + 5 + 6 + 7 + 9) as f64 / 8.0);
    }

    #[test]
    fn mean_lies_between_min_and_80th_percentile() {
        let raw: Vec<u64> = (0..37).map(|i| (i * 7919 % 101) + 3).collect();
        let mut samples = nanos(&raw);
        let mean = trimmed_mean(&mut samples);

        let keep = 37 * 4 / 5;
        let min = samples[0].as_nanos() as f64;
        let p80 = samples[keep - 1].as_nanos() as f64;
        assert!(min <= mean && mean <= p80, "{min} <= {mean} <= {p80}");
    }

    #[test]
    fn single_sample_is_kept() {
        assert_eq!(trimmed_mean(&mut nanos(&[42])), 42.0);
    }

    struct Constant(u64);

    impl Sweep for Constant {
        fn sweep<F>(
            &mut self,
            strides: &[usize],
            lengths: &[usize],
            mut on_result: F,
        ) -> Result<(), ProbeError>
        where
            F: FnMut(usize, usize, Duration),
        {
            for l in 0..lengths.len() {
                for s in 0..strides.len() {
                    if lengths[l] / strides[s] > 4 {
                        on_result(l, s, Duration::from_nanos(self.0));
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn grid_keeps_skipped_cells_visible() {
        let grid = collect_grid(&mut Constant(3), &[1, 8], &[16, 64], 10).unwrap();
        assert_eq!(grid.lengths(), 2);
        assert_eq!(grid.strides(), 2);
        assert_eq!(grid.latency(0, 0), 3.0);
        assert!(grid.latency(0, 1).is_nan());
        assert_eq!(grid.along_lengths(1)[1], 3.0);
        assert!(grid.along_strides(2).is_none());
    }
}
