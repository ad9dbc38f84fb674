use nalgebra::Vector3;

/// Identifier of a lattice site as it appears in the input tables.
///
/// Identifiers are not required to be contiguous or to start at zero.
pub type SiteId = usize;

/// A single lattice site hosting one classical spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinSite {
    /// Site identifier used by the coupling tables.
    pub site: SiteId,
    /// Atom-type label of the site, carried through to the output unchanged.
    pub atom: usize,
    /// Magnetic moment direction. Not required to be normalized on input.
    pub moment: Vector3<f64>,
}

impl SpinSite {
    pub fn new(site: SiteId, atom: usize, moment: Vector3<f64>) -> Self {
        Self { site, atom, moment }
    }

    /// Returns the unit vector along the moment, or `None` for a zero or
    /// non-finite moment.
    pub fn direction(&self) -> Option<Vector3<f64>> {
        if !self.moment.iter().all(|c| c.is_finite()) {
            return None;
        }
        self.moment.try_normalize(f64::MIN_POSITIVE)
    }
}
