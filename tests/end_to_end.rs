use cache_geometry_rs::ELEMENT_SIZE;
use cache_geometry_rs::aggregate::collect_grid;
use cache_geometry_rs::error::ProbeError;
use cache_geometry_rs::harness::{Harness, Sweep, active_positions};
use cache_geometry_rs::heuristics::CacheGeometry;
use cache_geometry_rs::probe::DiscardSink;
use cache_geometry_rs::report::write_report;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

const STRIDES: [usize; 3] = [1, 2, 4];
const LENGTHS: [usize; 2] = [16, 32];

/// Deterministic latency source: every length has a fixed latency, regardless of stride
struct Injected {
    by_length: Vec<u64>,
}

impl Sweep for Injected {
    fn sweep<F>(
        &mut self,
        stride_sizes: &[usize],
        length_sizes: &[usize],
        mut on_result: F,
    ) -> Result<(), ProbeError>
    where
        F: FnMut(usize, usize, Duration),
    {
        for (l, &length) in length_sizes.iter().enumerate() {
            for (s, &stride) in stride_sizes.iter().enumerate() {
                if active_positions(length, stride).is_some() {
                    on_result(l, s, Duration::from_nanos(self.by_length[l]));
                }
            }
        }
        Ok(())
    }
}

#[test]
fn jump_at_second_length_reports_first_as_capacity() {
    let mut source = Injected {
        by_length: vec![100, 130],
    };
    let grid = collect_grid(&mut source, &STRIDES, &LENGTHS, 10).unwrap();
    let geometry = CacheGeometry::infer(&grid, &STRIDES, &LENGTHS);

    assert_eq!(geometry.capacity_bytes, Some(16 * ELEMENT_SIZE));
    // the row past the capacity is flat
    assert_eq!(geometry.line_size_bytes, None);
}

#[test]
fn small_increase_is_not_a_breakpoint() {
    let mut source = Injected {
        by_length: vec![100, 119],
    };
    let grid = collect_grid(&mut source, &STRIDES, &LENGTHS, 10).unwrap();
    let geometry = CacheGeometry::infer(&grid, &STRIDES, &LENGTHS);

    assert_eq!(geometry, CacheGeometry::default());
}

#[test]
fn skipped_cell_prints_as_nan() {
    let mut source = Injected {
        by_length: vec![100, 130],
    };
    let grid = collect_grid(&mut source, &STRIDES, &LENGTHS, 5).unwrap();
    // 16 / 4 leaves only four slots
    assert!(grid.latency(0, 2).is_nan());

    let geometry = CacheGeometry::infer(&grid, &STRIDES, &LENGTHS);
    let mut out = Vec::new();
    write_report(&mut out, &STRIDES, &LENGTHS, &grid, &geometry).unwrap();
    let text = String::from_utf8(out).unwrap();

    let stride_16b = text.lines().find(|line| line.starts_with("16 ")).unwrap();
    assert!(stride_16b.contains("NaN"));
    assert!(text.contains("Cache length: 0KB"));
    assert!(text.contains("Cache line length not found"));
}

#[test]
fn real_harness_fills_every_measurable_cell() {
    let mut harness = Harness::with_rng(4096, DiscardSink::default(), StdRng::seed_from_u64(17));
    let strides = [1, 2, 4, 8];
    let lengths = [64, 256, 1024];
    let grid = collect_grid(&mut harness, &strides, &lengths, 3).unwrap();

    for (l, &length) in lengths.iter().enumerate() {
        for (s, &stride) in strides.iter().enumerate() {
            let latency = grid.latency(l, s);
            if active_positions(length, stride).is_some() {
                assert!(latency.is_finite() && latency >= 0.0, "cell {l},{s}: {latency}");
            } else {
                assert!(latency.is_nan());
            }
        }
    }
}
