use crate::core::utils::identifiers;
use nalgebra::Point3;

/// Represents a single atom of a motif residue.
///
/// Atoms carry the data needed to measure a motif and to write it back to disk
/// unchanged: the original serial number, the atom name, the element symbol and
/// the Cartesian position in Angstroms.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The serial number from the source file, used to resolve `CONECT` edges.
    pub serial: usize,
    /// The name of the atom (e.g., "CA", "OG1").
    pub name: String,
    /// The element symbol, upper case (e.g., "C", "SE"). May be empty when the
    /// source file carries no element column.
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Occupancy as read from the source file.
    pub occupancy: f64,
    /// Temperature factor as read from the source file.
    pub b_factor: f64,
}

impl Atom {
    /// Creates a new `Atom` with full occupancy and a zero temperature factor.
    ///
    /// # Arguments
    ///
    /// * `serial` - The serial number of the atom.
    /// * `name` - The name of the atom.
    /// * `element` - The element symbol; may be empty.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(serial: usize, name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            serial,
            name: name.trim().to_string(),
            element: element.trim().to_ascii_uppercase(),
            position,
            occupancy: 1.0,
            b_factor: 0.0,
        }
    }

    /// Returns `true` if this atom is a hydrogen or deuterium.
    ///
    /// The element column takes precedence; the atom name is only consulted
    /// when no element symbol is present.
    pub fn is_hydrogen(&self) -> bool {
        if self.element.is_empty() {
            !identifiers::is_heavy_atom(&self.name)
        } else {
            matches!(self.element.as_str(), "H" | "D")
        }
    }
}
