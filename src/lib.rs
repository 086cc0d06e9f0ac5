pub mod affinity;
pub mod aggregate;
pub mod buffer;
pub mod config;
pub mod cycle;
pub mod error;
pub mod harness;
pub mod heuristics;
pub mod probe;
pub mod report;

/// Integer type stored in every working buffer slot
pub type Element = u32;

/// Width of one buffer slot, used to convert element counts into bytes
pub const ELEMENT_SIZE: usize = std::mem::size_of::<Element>();

/// Constant XORed into every stored next-index to keep the predictor from learning the pattern
pub const MASK: Element = 1_454_213;

/// Convert number of bytes to whole kilobytes as used in table headers and reports
pub fn format_kb(bytes: usize) -> String {
    const KB: usize = 1024;

    format!("{}KB", bytes / KB)
}

/// Truncate (not round) a latency to one decimal digit, `NaN` for cells without samples
pub fn format_latency(latency: f64) -> String {
    if latency.is_nan() {
        return "NaN".to_string();
    }

    let full = format!("{latency:.6}");
    match full.find('.') {
        Some(dot) => full[..dot + 2].to_string(),
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kb_labels_truncate() {
        assert_eq!(format_kb(1024), "1KB");
        assert_eq!(format_kb(256 * ELEMENT_SIZE), "1KB");
        assert_eq!(format_kb(65536 * ELEMENT_SIZE), "256KB");
        assert_eq!(format_kb(1000), "0KB");
    }

    #[test]
    fn latency_is_truncated_to_one_decimal() {
        assert_eq!(format_latency(1.99), "1.9");
        assert_eq!(format_latency(12.0), "12.0");
        assert_eq!(format_latency(0.05), "0.0");
        assert_eq!(format_latency(f64::NAN), "NaN");
    }
}
