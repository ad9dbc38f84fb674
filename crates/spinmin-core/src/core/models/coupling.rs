use super::spin::SiteId;
use nalgebra::Vector3;

/// Isotropic exchange between two sites, `-J (s_i . s_j)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeCoupling {
    pub i: SiteId,
    pub j: SiteId,
    /// Lattice offset between the two sites. Not used by the energy.
    pub offset: Vector3<f64>,
    pub strength: f64,
}

impl ExchangeCoupling {
    pub fn new(i: SiteId, j: SiteId, strength: f64) -> Self {
        Self {
            i,
            j,
            offset: Vector3::zeros(),
            strength,
        }
    }
}

/// Dzyaloshinskii-Moriya interaction between two sites, `-D . (s_i x s_j)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmiCoupling {
    pub i: SiteId,
    pub j: SiteId,
    /// Lattice offset between the two sites. Not used by the energy.
    pub offset: Vector3<f64>,
    pub vector: Vector3<f64>,
}

impl DmiCoupling {
    pub fn new(i: SiteId, j: SiteId, vector: Vector3<f64>) -> Self {
        Self {
            i,
            j,
            offset: Vector3::zeros(),
            vector,
        }
    }
}

/// Uniaxial single-ion anisotropy on one site, `-K1 (s . e)^2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnisotropyCoupling {
    pub site: SiteId,
    pub k1: f64,
    pub axis: Vector3<f64>,
}

impl AnisotropyCoupling {
    pub fn new(site: SiteId, k1: f64, axis: Vector3<f64>) -> Self {
        Self { site, k1, axis }
    }
}
