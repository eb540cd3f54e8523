//! File formats read by the harness.

pub mod npy;

pub use npy::{NpyError, read_points};
