//! Console output: run-time estimate, latency table and inferred geometry.
use crate::aggregate::ResultGrid;
use crate::heuristics::CacheGeometry;
use crate::{ELEMENT_SIZE, format_kb, format_latency};
use std::io::{self, Write};
use std::time::Duration;

const SEPARATOR: &str = " | ";

/// Print the startup line, rounding the estimate up to whole seconds
pub fn write_estimate<W: Write>(out: &mut W, estimate: Duration) -> io::Result<()> {
    let secs = estimate.as_secs() + u64::from(estimate.subsec_nanos() > 0);
    writeln!(out, "Expected to finish in {} seconds", secs)
}

/// Build the table cells: header row of lengths in KB, then one row per stride in bytes
fn table_cells(
    stride_sizes: &[usize],
    length_sizes: &[usize],
    grid: &ResultGrid,
) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(stride_sizes.len() + 1);

    let mut header = vec![String::new()];
    header.extend(length_sizes.iter().map(|&len| format_kb(len * ELEMENT_SIZE)));
    rows.push(header);

    for (stride_idx, &stride) in stride_sizes.iter().enumerate() {
        let mut row = vec![(stride * ELEMENT_SIZE).to_string()];
        row.extend(
            (0..length_sizes.len())
                .map(|length_idx| format_latency(grid.latency(length_idx, stride_idx))),
        );
        rows.push(row);
    }
    rows
}

/// Print the latency table with every cell padded to the widest one
pub fn write_table<W: Write>(
    out: &mut W,
    stride_sizes: &[usize],
    length_sizes: &[usize],
    grid: &ResultGrid,
) -> io::Result<()> {
    let rows = table_cells(stride_sizes, length_sizes, grid);
    let width = rows.iter().flatten().map(String::len).max().unwrap_or(0);

    for row in &rows {
        for cell in row {
            write!(out, "{:<width$}{}", cell, SEPARATOR, width = width)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Print the inferred capacity, line size and the associativity notice
pub fn write_geometry<W: Write>(out: &mut W, geometry: &CacheGeometry) -> io::Result<()> {
    match geometry.capacity_bytes {
        Some(bytes) => writeln!(out, "Cache length: {}", format_kb(bytes))?,
        None => writeln!(out, "Cache length not found")?,
    }
    match geometry.line_size_bytes {
        Some(bytes) => writeln!(out, "Cache line length: {}B", bytes)?,
        None => writeln!(out, "Cache line length not found")?,
    }
    writeln!(out, "Cache associativity calculation not implemented")
}

/// Everything printed after the measurements finish
pub fn write_report<W: Write>(
    out: &mut W,
    stride_sizes: &[usize],
    length_sizes: &[usize],
    grid: &ResultGrid,
    geometry: &CacheGeometry,
) -> io::Result<()> {
    writeln!(out, "Results: stride \\ memory length")?;
    write_table(out, stride_sizes, length_sizes, grid)?;
    write_geometry(out, geometry)
}
