//! # Path
//!
//! This module defines the recorded path followed by trajectory control, and the sources it can be
//! loaded from.
//!
//! A path is an ordered, non-empty sequence of points on the XY plane of the world frame. Once
//! built it is never modified, thinning produces a new path.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;
use serde::Serialize;
use std::path::PathBuf;

// Internal
use comms_if::eqpt::LocData;
use crate::geom::distance;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A path defining the desired trajectory of the robot.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct Path {
    points_m: Vec<Vector2<f64>>
}

/// Loads paths from JSON files recorded by the robot.
///
/// Identifiers are file paths relative to `root_dir`. Absolute identifiers are used as they are.
#[derive(Debug, Clone)]
pub struct JsonFilePathSource {
    root_dir: PathBuf
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source from which paths can be loaded.
pub trait PathSource {
    /// Load the path with the given identifier.
    fn load_path(&mut self, id: &str) -> Result<Path, PathError>;
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Could not read the path file {0:?}: {1}")]
    FileError(PathBuf, std::io::Error),

    #[error("Could not parse the path file {0:?}: {1}")]
    ParseError(PathBuf, serde_json::Error),

    #[error("Path point {0} has a non-finite coordinate")]
    NonFinitePoint(usize),

    #[error("Attempted to create a path with no points")]
    DegenerateGeometry
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    /// Create a path from a sequence of points.
    ///
    /// Fails if there are no points or any coordinate is not finite.
    pub fn from_points(points_m: Vec<Vector2<f64>>) -> Result<Self, PathError> {
        if points_m.is_empty() {
            return Err(PathError::DegenerateGeometry)
        }

        if let Some(i) = points_m.iter().position(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(PathError::NonFinitePoint(i))
        }

        Ok(Self { points_m })
    }

    /// Create a path from recorded localisation records, keeping only their X and Y coordinates.
    pub fn from_records(records: &[LocData]) -> Result<Self, PathError> {
        Self::from_points(
            records
                .iter()
                .map(|r| Vector2::new(r.pose.position.x, r.pose.position.y))
                .collect()
        )
    }

    /// Return a copy of this path in which consecutive points are more than `min_sep_m` apart.
    ///
    /// The first point is always kept, then each point further than `min_sep_m` from the last
    /// kept point. The final point of this path is not forced into the result.
    pub fn thinned(&self, min_sep_m: f64) -> Self {
        let mut points_m = vec![self.points_m[0]];

        for p in self.points_m.iter().skip(1) {
            let last = points_m[points_m.len() - 1];

            if distance(p, &last) > min_sep_m {
                points_m.push(*p);
            }
        }

        debug!(
            "Thinned path from {} to {} points (min separation {} m)",
            self.points_m.len(), points_m.len(), min_sep_m
        );

        Self { points_m }
    }

    /// Get the total length of the polyline through the path's points.
    pub fn length(&self) -> f64 {
        self.points_m
            .windows(2)
            .map(|w| distance(&w[0], &w[1]))
            .sum()
    }

    /// Get the number of points in the path, which is never zero.
    pub fn get_num_points(&self) -> usize {
        self.points_m.len()
    }

    /// Get the index of the final point.
    pub fn last_index(&self) -> usize {
        self.points_m.len() - 1
    }

    /// Get the final point in the path.
    pub fn last(&self) -> &Vector2<f64> {
        &self.points_m[self.last_index()]
    }

    /// Get all the points of the path.
    pub fn points(&self) -> &[Vector2<f64>] {
        &self.points_m
    }
}

impl JsonFilePathSource {
    pub fn new<P: Into<PathBuf>>(root_dir: P) -> Self {
        Self {
            root_dir: root_dir.into()
        }
    }
}

impl PathSource for JsonFilePathSource {
    fn load_path(&mut self, id: &str) -> Result<Path, PathError> {
        let file_path = self.root_dir.join(id);

        let text = std::fs::read_to_string(&file_path)
            .map_err(|e| PathError::FileError(file_path.clone(), e))?;

        let records: Vec<LocData> = serde_json::from_str(&text)
            .map_err(|e| PathError::ParseError(file_path.clone(), e))?;

        debug!("Loaded {} records from {:?}", records.len(), file_path);

        Path::from_records(&records)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn straight(n: usize, sep: f64) -> Path {
        Path::from_points((0..n).map(|i| Vector2::new(i as f64 * sep, 0.0)).collect()).unwrap()
    }

    #[test]
    fn test_degenerate_paths() {
        assert!(matches!(Path::from_points(vec![]), Err(PathError::DegenerateGeometry)));
        assert!(matches!(Path::from_records(&[]), Err(PathError::DegenerateGeometry)));

        let bad = vec![Vector2::new(0.0, 0.0), Vector2::new(f64::NAN, 1.0)];
        assert!(matches!(Path::from_points(bad), Err(PathError::NonFinitePoint(1))));

        let bad = vec![Vector2::new(f64::INFINITY, 0.0)];
        assert!(matches!(Path::from_points(bad), Err(PathError::NonFinitePoint(0))));
    }

    #[test]
    fn test_single_point_path() {
        let path = Path::from_records(&[LocData::from_planar(2.0, 3.0, 0.0)]).unwrap();

        assert_eq!(path.get_num_points(), 1);
        assert_eq!(path.last_index(), 0);
        assert_eq!(*path.last(), Vector2::new(2.0, 3.0));
        assert_eq!(path.length(), 0.0);
        assert_eq!(path.thinned(1.0), path);
    }

    #[test]
    fn test_length() {
        let path = Path::from_points(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(3.0, 4.0),
            Vector2::new(3.0, 0.0)
        ]).unwrap();

        assert!((path.length() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_thinned() {
        // Points every 0.1 m, thinning at 0.25 m keeps every third point
        let path = straight(11, 0.1);
        let thin = path.thinned(0.25);

        let xs: Vec<f64> = thin.points().iter().map(|p| p[0]).collect();
        assert_eq!(xs.len(), 4);
        for (x, e) in xs.iter().zip([0.0, 0.3, 0.6, 0.9].iter()) {
            assert!((x - e).abs() < 1e-9);
        }

        // The last point (1.0) is not forced in
        assert!((thin.last()[0] - 0.9).abs() < 1e-9);

        // The original is untouched
        assert_eq!(path.get_num_points(), 11);
    }

    #[test]
    fn test_json_source() {
        let dir = std::env::temp_dir().join("follow_lib_path_test");
        std::fs::create_dir_all(&dir).unwrap();

        let text = r#"[
            {"Pose": {"Orientation": {"W": 1.0, "X": 0.0, "Y": 0.0, "Z": 0.0},
                      "Position": {"X": 0.5, "Y": -1.0, "Z": 0.07}},
             "Status": 4, "Timestamp": 1234},
            {"Pose": {"Orientation": {"W": 1.0, "X": 0.0, "Y": 0.0, "Z": 0.0},
                      "Position": {"X": 1.5, "Y": -1.0, "Z": 0.07}}}
        ]"#;
        std::fs::write(dir.join("two.json"), text).unwrap();
        std::fs::write(dir.join("bad.json"), "{not json").unwrap();

        let mut source = JsonFilePathSource::new(&dir);

        let path = source.load_path("two.json").unwrap();
        assert_eq!(path.points(), &[Vector2::new(0.5, -1.0), Vector2::new(1.5, -1.0)]);

        assert!(matches!(source.load_path("missing.json"), Err(PathError::FileError(_, _))));
        assert!(matches!(source.load_path("bad.json"), Err(PathError::ParseError(_, _))));

        std::fs::remove_dir_all(dir).ok();
    }
}
