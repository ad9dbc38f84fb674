use std::ops::{Add, AddAssign};

/// Energy of a spin configuration split by interaction type.
///
/// The total is never stored; it is always recomputed as the sum of the four
/// components so that it cannot drift from them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyBreakdown {
    pub heisenberg: f64,
    pub dmi: f64,
    pub anisotropy: f64,
    pub external: f64,
}

impl EnergyBreakdown {
    pub fn new(heisenberg: f64, dmi: f64, anisotropy: f64, external: f64) -> Self {
        Self {
            heisenberg,
            dmi,
            anisotropy,
            external,
        }
    }

    /// Sum of all components, accumulated in declaration order.
    #[inline]
    pub fn total(&self) -> f64 {
        self.heisenberg + self.dmi + self.anisotropy + self.external
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.heisenberg.is_finite()
            && self.dmi.is_finite()
            && self.anisotropy.is_finite()
            && self.external.is_finite()
    }
}

impl Add for EnergyBreakdown {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            heisenberg: self.heisenberg + rhs.heisenberg,
            dmi: self.dmi + rhs.dmi,
            anisotropy: self.anisotropy + rhs.anisotropy,
            external: self.external + rhs.external,
        }
    }
}

impl AddAssign for EnergyBreakdown {
    fn add_assign(&mut self, rhs: Self) {
        self.heisenberg += rhs.heisenberg;
        self.dmi += rhs.dmi;
        self.anisotropy += rhs.anisotropy;
        self.external += rhs.external;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_breakdown_with_specified_values() {
        let e = EnergyBreakdown::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(e.heisenberg, 1.0);
        assert_eq!(e.dmi, 2.0);
        assert_eq!(e.anisotropy, 3.0);
        assert_eq!(e.external, 4.0);
    }

    #[test]
    fn total_returns_sum_of_all_components() {
        let e = EnergyBreakdown::new(1.5, -2.0, 0.25, 0.25);
        assert_eq!(e.total(), 0.0);
    }

    #[test]
    fn add_sums_each_field_correctly() {
        let a = EnergyBreakdown::new(1.0, 2.0, 3.0, 4.0);
        let b = EnergyBreakdown::new(4.0, 5.0, 6.0, 7.0);
        assert_eq!(a + b, EnergyBreakdown::new(5.0, 7.0, 9.0, 11.0));
    }

    #[test]
    fn add_assign_accumulates_each_field_correctly() {
        let mut a = EnergyBreakdown::new(1.0, 2.0, 3.0, 4.0);
        a += EnergyBreakdown::new(-1.0, -2.0, -3.0, -4.0);
        assert_eq!(a, EnergyBreakdown::default());
    }

    #[test]
    fn default_initializes_all_fields_to_zero() {
        let e = EnergyBreakdown::default();
        assert_eq!(e.total(), 0.0);
        assert!(e.is_finite());
    }

    #[test]
    fn is_finite_detects_nan_and_infinity() {
        assert!(!EnergyBreakdown::new(f64::NAN, 0.0, 0.0, 0.0).is_finite());
        assert!(!EnergyBreakdown::new(0.0, 0.0, f64::INFINITY, 0.0).is_finite());
    }
}
