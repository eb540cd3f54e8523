//! Reference path lookup by scenario id.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::Point2D;
use crate::error::{BenchError, Result};
use crate::io::read_points;

/// Directory of `path_<scenario>.npy` files.
#[derive(Clone, Debug)]
pub struct PathStore {
    dir: PathBuf,
}

impl PathStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the reference path of a scenario.
    pub fn path_file(&self, scenario: u32) -> PathBuf {
        self.dir.join(format!("path_{}.npy", scenario))
    }

    /// Load the path-grid waypoints of a scenario.
    pub fn load(&self, scenario: u32) -> Result<Vec<Point2D>> {
        let file = self.path_file(scenario);
        if !file.is_file() {
            return Err(BenchError::ReferencePath {
                scenario,
                reason: format!("{} not found", file.display()),
            });
        }

        let points = read_points(&file).map_err(|e| BenchError::ReferencePath {
            scenario,
            reason: format!("{}: {}", file.display(), e),
        })?;

        debug!(
            "Loaded reference path for scenario {}: {} waypoints",
            scenario,
            points.len()
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::npy::encode_points;
    use tempfile::TempDir;

    #[test]
    fn test_load_existing_path() {
        let dir = TempDir::new().unwrap();
        let store = PathStore::new(dir.path());
        let points = vec![Point2D::new(30.0, 0.0), Point2D::new(30.0, 50.0)];
        std::fs::write(store.path_file(7), encode_points(&points)).unwrap();

        assert_eq!(store.load(7).unwrap(), points);
    }

    #[test]
    fn test_missing_path_is_reference_error() {
        let dir = TempDir::new().unwrap();
        let store = PathStore::new(dir.path());
        let err = store.load(3).unwrap_err();
        assert!(matches!(err, BenchError::ReferencePath { scenario: 3, .. }));
    }

    #[test]
    fn test_malformed_path_is_reference_error() {
        let dir = TempDir::new().unwrap();
        let store = PathStore::new(dir.path());
        std::fs::write(store.path_file(1), b"garbage").unwrap();
        let err = store.load(1).unwrap_err();
        assert!(matches!(err, BenchError::ReferencePath { scenario: 1, .. }));
    }

    #[test]
    fn test_oversized_header_shape_is_reference_error() {
        let dir = TempDir::new().unwrap();
        let store = PathStore::new(dir.path());
        let bytes = encode_points(&[Point2D::new(1.0, 2.0)]);
        let at = bytes.windows(6).position(|w| w == b"(1, 2)").unwrap();
        // Widen the shape and patch the header length to match
        let huge: &[u8] = b"(9223372036854775807, 2)";
        let mut bytes = [&bytes[..at], huge, &bytes[at + 6..]].concat();
        let len = u16::from_le_bytes([bytes[8], bytes[9]]) + (huge.len() - 6) as u16;
        bytes[8..10].copy_from_slice(&len.to_le_bytes());
        std::fs::write(store.path_file(0), &bytes).unwrap();

        let err = store.load(0).unwrap_err();
        assert!(matches!(err, BenchError::ReferencePath { scenario: 0, .. }));
    }

    #[test]
    fn test_file_naming() {
        let store = PathStore::new("/data/paths");
        assert_eq!(store.path_file(12), PathBuf::from("/data/paths/path_12.npy"));
    }
}
