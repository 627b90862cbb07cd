use crate::core::models::residue::Residue;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;

/// The point that stands in for a residue when measuring distances between residues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferencePoint {
    /// The centroid of all atoms of the residue.
    #[default]
    Centroid,
    /// The alpha carbon; residues without a `CA` atom fall back to their centroid.
    AlphaCarbon,
}

pub fn calculate_centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

pub fn reference_point(residue: &Residue, reference: ReferencePoint) -> Option<Point3<f64>> {
    if reference == ReferencePoint::AlphaCarbon {
        if let Some(ca) = residue.atom_by_name("CA") {
            return Some(ca.position);
        }
    }
    let positions: Vec<Point3<f64>> = residue.atoms().iter().map(|a| a.position).collect();
    calculate_centroid(&positions)
}

/// Largest distance between any two points, or `0.0` for fewer than two points.
///
/// Pairs are visited in index order and each distance is computed independently,
/// so the result does not depend on accumulation order.
pub fn max_pairwise_distance(points: &[Point3<f64>]) -> f64 {
    let mut max_distance = 0.0_f64;
    for (i, p1) in points.iter().enumerate() {
        for p2 in &points[i + 1..] {
            let distance = nalgebra::distance(p1, p2);
            if distance > max_distance || distance.is_nan() {
                max_distance = distance;
            }
        }
    }
    max_distance
}

/// Extent of a set of residues: the maximum pairwise distance between their reference
/// points. Residues without atoms have no reference point and are ignored.
pub fn calculate_extent(residues: &[Residue], reference: ReferencePoint) -> f64 {
    let points: Vec<Point3<f64>> = residues
        .iter()
        .filter_map(|r| reference_point(r, reference))
        .collect();
    max_pairwise_distance(&points)
}
