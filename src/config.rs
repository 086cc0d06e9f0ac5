//! Fixed measurement grid plus the host values the harness needs.
use crate::harness::active_positions;
use log::warn;
use std::time::Duration;

/// Independent repetitions of the full sweep
pub const TRIALS: usize = 100;

/// Pessimistic cost of one traversal step, only used for the run-time estimate
const ASSUMED_STEP_NANOS: u64 = 15;

/// Fallback when the OS does not report a page size
const DEFAULT_PAGE_SIZE: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Distances between touched slots, in elements
    pub stride_sizes: Vec<usize>,
    /// Working-set sizes, in elements
    pub length_sizes: Vec<usize>,
    pub trials: usize,
    /// Alignment of every working buffer
    pub page_size: usize,
    /// CPU core the measurement thread is pinned to, if any
    pub cpu_core: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            // 1 ..= 128 elements
            stride_sizes: (0..=7).map(|exp| 1usize << exp).collect(),
            // 256 ..= 64Ki elements (1 KB ..= 256 KB of u32)
            length_sizes: (8..=16).map(|exp| 1usize << exp).collect(),
            trials: TRIALS,
            page_size: DEFAULT_PAGE_SIZE,
            cpu_core: None,
        }
    }
}

impl Config {
    /// Default grid with page size and measurement core taken from the running host
    pub fn detect() -> Self {
        Config {
            page_size: system_page_size(),
            cpu_core: measurement_core(),
            ..Config::default()
        }
    }

    /// Total number of dependent loads one full run performs (warm-up plus timed laps)
    pub fn total_steps(&self) -> u64 {
        let per_trial: u64 = self
            .length_sizes
            .iter()
            .flat_map(|&length| {
                self.stride_sizes
                    .iter()
                    .filter_map(move |&stride| active_positions(length, stride))
            })
            .map(|active| 48 * active as u64)
            .sum();
        per_trial * self.trials as u64
    }

    /// Rough wall-clock duration of a full run
    pub fn estimated_runtime(&self) -> Duration {
        Duration::from_nanos(self.total_steps() * ASSUMED_STEP_NANOS)
    }
}

/// Page size reported by the OS
pub fn system_page_size() -> usize {
    #[cfg(unix)]
    {
        // SAFETY: sysconf has no preconditions
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 && (size as usize).is_power_of_two() {
            return size as usize;
        }
        warn!("sysconf reported page size {}, using {}", size, DEFAULT_PAGE_SIZE);
    }
    DEFAULT_PAGE_SIZE
}

/// Last core id on the host; core 0 usually services most interrupts
fn measurement_core() -> Option<usize> {
    let cores = core_affinity::get_core_ids();
    if cores.is_none() {
        warn!("Couldn't enumerate CPU cores, measurement thread will not be pinned");
    }
    cores.and_then(|ids| ids.last().map(|core| core.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_matches_fixed_sweep() {
        let config = Config::default();
        assert_eq!(config.stride_sizes, vec![1, 2, 4, 8, 16, 32, 64, 128]);
        assert_eq!(config.length_sizes.first(), Some(&256));
        assert_eq!(config.length_sizes.last(), Some(&65536));
        assert_eq!(config.length_sizes.len(), 9);
        assert_eq!(config.trials, 100);
    }

    #[test]
    fn page_size_is_a_power_of_two() {
        let page = system_page_size();
        assert!(page.is_power_of_two());
        assert!(page >= 4096);
    }

    #[test]
    fn total_steps_skip_tiny_cycles() {
        let config = Config {
            stride_sizes: vec![1, 2, 4],
            length_sizes: vec![16, 32],
            trials: 2,
            ..Config::default()
        };
        // active: 16, 8, (4 skipped), 32, 16, 8
        assert_eq!(config.total_steps(), 2 * 48 * (16 + 8 + 32 + 16 + 8));
    }

    #[test]
    fn default_estimate_is_tens_of_seconds() {
        let secs = Config::default().estimated_runtime().as_secs();
        assert!((10..=30).contains(&secs), "estimate {secs}s");
    }
}
