//! Error type shared by the measurement pipeline.
//!
//! The grid is fixed at compile time, so the only things that can go wrong at run time are
//! obtaining a working buffer and writing to the discard sink.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// Requested buffer size or alignment cannot describe a valid allocation
    #[error("invalid buffer layout: {bytes} bytes aligned to {align}")]
    Layout { bytes: usize, align: usize },

    /// Allocator returned no memory for the working buffer
    #[error("failed to allocate working buffer of {bytes} bytes aligned to {align}")]
    Allocation { bytes: usize, align: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
