use super::potentials;
use super::term::EnergyBreakdown;
use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum HamiltonianError {
    #[error(
        "{term} entry {entry} references site index {index}, but the configuration has only {n_sites} site(s)"
    )]
    SiteOutOfRange {
        term: &'static str,
        entry: usize,
        index: usize,
        n_sites: usize,
    },
    #[error("Spin configuration has {found} site(s), expected {expected}")]
    SpinCountMismatch { expected: usize, found: usize },
}

/// Exchange pair resolved to dense site indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangePair {
    pub i: usize,
    pub j: usize,
    pub strength: f64,
}

impl ExchangePair {
    pub fn new(i: usize, j: usize, strength: f64) -> Self {
        Self { i, j, strength }
    }
}

/// DMI pair resolved to dense site indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmiPair {
    pub i: usize,
    pub j: usize,
    pub vector: Vector3<f64>,
}

impl DmiPair {
    pub fn new(i: usize, j: usize, vector: Vector3<f64>) -> Self {
        Self { i, j, vector }
    }
}

/// Anisotropy term resolved to a dense site index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnisotropySite {
    pub site: usize,
    pub k1: f64,
    pub axis: Vector3<f64>,
}

impl AnisotropySite {
    pub fn new(site: usize, k1: f64, axis: Vector3<f64>) -> Self {
        Self { site, k1, axis }
    }
}

/// The validated coupling tables of one spin lattice.
///
/// Construction checks every site index against the number of sites, so
/// evaluation never indexes out of bounds. DMI and anisotropy lists are
/// optional; an absent list contributes exactly zero.
///
/// Each term is accumulated sequentially in list order, which makes repeated
/// evaluations of the same input bit-identical.
#[derive(Debug, Clone, PartialEq)]
pub struct Hamiltonian {
    n_sites: usize,
    exchange: Vec<ExchangePair>,
    dmi: Option<Vec<DmiPair>>,
    anisotropy: Option<Vec<AnisotropySite>>,
}

impl Hamiltonian {
    pub fn new(
        n_sites: usize,
        exchange: Vec<ExchangePair>,
        dmi: Option<Vec<DmiPair>>,
        anisotropy: Option<Vec<AnisotropySite>>,
    ) -> Result<Self, HamiltonianError> {
        let check = |term: &'static str, entry: usize, index: usize| {
            if index < n_sites {
                Ok(())
            } else {
                Err(HamiltonianError::SiteOutOfRange {
                    term,
                    entry,
                    index,
                    n_sites,
                })
            }
        };

        for (entry, pair) in exchange.iter().enumerate() {
            check("exchange", entry, pair.i)?;
            check("exchange", entry, pair.j)?;
        }
        for (entry, pair) in dmi.iter().flatten().enumerate() {
            check("dmi", entry, pair.i)?;
            check("dmi", entry, pair.j)?;
        }
        for (entry, term) in anisotropy.iter().flatten().enumerate() {
            check("anisotropy", entry, term.site)?;
        }

        Ok(Self {
            n_sites,
            exchange,
            dmi,
            anisotropy,
        })
    }

    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    pub fn exchange(&self) -> &[ExchangePair] {
        &self.exchange
    }

    pub fn dmi(&self) -> Option<&[DmiPair]> {
        self.dmi.as_deref()
    }

    pub fn anisotropy(&self) -> Option<&[AnisotropySite]> {
        self.anisotropy.as_deref()
    }

    /// Evaluates the energy breakdown of `spins`.
    pub fn evaluate(
        &self,
        spins: &[Vector3<f64>],
        field: Option<&Vector3<f64>>,
    ) -> Result<EnergyBreakdown, HamiltonianError> {
        self.check_len(spins.len())?;
        Ok(self.accumulate(spins, field, None))
    }

    /// Evaluates the energy breakdown and writes `dE/ds` for every site into
    /// `gradient`, which must have one entry per site.
    pub fn evaluate_with_gradient(
        &self,
        spins: &[Vector3<f64>],
        field: Option<&Vector3<f64>>,
        gradient: &mut [Vector3<f64>],
    ) -> Result<EnergyBreakdown, HamiltonianError> {
        self.check_len(spins.len())?;
        self.check_len(gradient.len())?;
        gradient.iter_mut().for_each(|g| *g = Vector3::zeros());
        Ok(self.accumulate(spins, field, Some(gradient)))
    }

    fn check_len(&self, found: usize) -> Result<(), HamiltonianError> {
        if found == self.n_sites {
            Ok(())
        } else {
            Err(HamiltonianError::SpinCountMismatch {
                expected: self.n_sites,
                found,
            })
        }
    }

    fn accumulate(
        &self,
        spins: &[Vector3<f64>],
        field: Option<&Vector3<f64>>,
        mut gradient: Option<&mut [Vector3<f64>]>,
    ) -> EnergyBreakdown {
        let mut energy = EnergyBreakdown::default();

        for pair in &self.exchange {
            let (s_i, s_j) = (&spins[pair.i], &spins[pair.j]);
            energy.heisenberg += potentials::exchange(s_i, s_j, pair.strength);
            if let Some(grad) = gradient.as_deref_mut() {
                let (g_i, g_j) = potentials::exchange_gradient(s_i, s_j, pair.strength);
                grad[pair.i] += g_i;
                grad[pair.j] += g_j;
            }
        }

        if let Some(pairs) = &self.dmi {
            for pair in pairs {
                let (s_i, s_j) = (&spins[pair.i], &spins[pair.j]);
                energy.dmi += potentials::dzyaloshinskii_moriya(s_i, s_j, &pair.vector);
                if let Some(grad) = gradient.as_deref_mut() {
                    let (g_i, g_j) =
                        potentials::dzyaloshinskii_moriya_gradient(s_i, s_j, &pair.vector);
                    grad[pair.i] += g_i;
                    grad[pair.j] += g_j;
                }
            }
        }

        if let Some(terms) = &self.anisotropy {
            for term in terms {
                let s = &spins[term.site];
                energy.anisotropy += potentials::uniaxial_anisotropy(s, term.k1, &term.axis);
                if let Some(grad) = gradient.as_deref_mut() {
                    grad[term.site] +=
                        potentials::uniaxial_anisotropy_gradient(s, term.k1, &term.axis);
                }
            }
        }

        if let Some(b) = field {
            for s in spins {
                energy.external += potentials::zeeman(s, b);
            }
            if let Some(grad) = gradient.as_deref_mut() {
                for g in grad.iter_mut() {
                    *g -= b;
                }
            }
        }

        energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn unit(x: f64, y: f64, z: f64) -> Vector3<f64> {
        Vector3::new(x, y, z).normalize()
    }

    fn skewed_spins() -> Vec<Vector3<f64>> {
        vec![
            unit(0.3, -0.4, 0.8),
            unit(-0.1, 0.7, 0.2),
            unit(0.9, 0.1, -0.3),
        ]
    }

    fn full_hamiltonian() -> Hamiltonian {
        Hamiltonian::new(
            3,
            vec![
                ExchangePair::new(0, 1, 1.0),
                ExchangePair::new(1, 2, -0.4),
                ExchangePair::new(2, 0, 0.25),
            ],
            Some(vec![
                DmiPair::new(0, 1, Vector3::new(0.0, 0.0, 0.3)),
                DmiPair::new(1, 2, Vector3::new(0.1, -0.2, 0.0)),
            ]),
            Some(vec![
                AnisotropySite::new(0, 0.5, Vector3::z()),
                AnisotropySite::new(2, -0.2, Vector3::x()),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn antiparallel_pair_has_positive_heisenberg_energy() {
        let h = Hamiltonian::new(2, vec![ExchangePair::new(0, 1, 1.0)], None, None).unwrap();
        let spins = [Vector3::new(1.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0)];
        let e = h.evaluate(&spins, None).unwrap();
        assert_eq!(e.heisenberg, 1.0);
        assert_eq!(e.total(), 1.0);
    }

    #[test]
    fn absent_optional_terms_contribute_exactly_zero() {
        let h = Hamiltonian::new(3, vec![ExchangePair::new(0, 1, 0.7)], None, None).unwrap();
        let e = h.evaluate(&skewed_spins(), None).unwrap();
        assert_eq!(e.dmi, 0.0);
        assert_eq!(e.anisotropy, 0.0);
        assert_eq!(e.external, 0.0);
        assert_eq!(e.total(), e.heisenberg);
    }

    #[test]
    fn total_equals_sum_of_components_with_all_terms() {
        let h = full_hamiltonian();
        let field = Vector3::new(0.0, 0.1, 0.2);
        let e = h.evaluate(&skewed_spins(), Some(&field)).unwrap();
        assert_eq!(e.total(), e.heisenberg + e.dmi + e.anisotropy + e.external);
        assert_ne!(e.dmi, 0.0);
        assert_ne!(e.anisotropy, 0.0);
        assert_ne!(e.external, 0.0);
    }

    #[test]
    fn external_field_sums_over_all_sites() {
        let h = Hamiltonian::new(2, vec![], None, None).unwrap();
        let spins = [Vector3::z(), Vector3::z()];
        let e = h.evaluate(&spins, Some(&Vector3::new(0.0, 0.0, 0.5))).unwrap();
        assert!((e.external + 1.0).abs() < TOLERANCE);
        assert_eq!(e.total(), e.external);
    }

    #[test]
    fn repeated_evaluation_is_bit_identical() {
        let h = full_hamiltonian();
        let spins = skewed_spins();
        let field = Vector3::new(0.3, 0.0, -0.1);
        let first = h.evaluate(&spins, Some(&field)).unwrap();
        let second = h.evaluate(&spins, Some(&field)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn evaluate_with_gradient_reports_same_energy_as_evaluate() {
        let h = full_hamiltonian();
        let spins = skewed_spins();
        let mut grad = vec![Vector3::zeros(); 3];
        let with_grad = h.evaluate_with_gradient(&spins, None, &mut grad).unwrap();
        assert_eq!(with_grad, h.evaluate(&spins, None).unwrap());
    }

    #[test]
    fn gradient_matches_central_finite_differences() {
        let h = full_hamiltonian();
        let field = Vector3::new(0.05, -0.1, 0.2);
        let spins = skewed_spins();
        let mut grad = vec![Vector3::zeros(); 3];
        h.evaluate_with_gradient(&spins, Some(&field), &mut grad)
            .unwrap();

        let step = 1e-6;
        for site in 0..3 {
            for k in 0..3 {
                let mut plus = spins.clone();
                let mut minus = spins.clone();
                plus[site][k] += step;
                minus[site][k] -= step;
                let fd = (h.evaluate(&plus, Some(&field)).unwrap().total()
                    - h.evaluate(&minus, Some(&field)).unwrap().total())
                    / (2.0 * step);
                assert!(
                    (grad[site][k] - fd).abs() < 1e-7,
                    "site {site} component {k}: analytic {} vs numeric {fd}",
                    grad[site][k]
                );
            }
        }
    }

    #[test]
    fn gradient_buffer_is_overwritten_not_accumulated() {
        let h = Hamiltonian::new(2, vec![ExchangePair::new(0, 1, 1.0)], None, None).unwrap();
        let spins = [Vector3::x(), Vector3::y()];
        let mut grad = vec![Vector3::new(9.0, 9.0, 9.0); 2];
        h.evaluate_with_gradient(&spins, None, &mut grad).unwrap();
        assert_eq!(grad[0], -Vector3::y());
        assert_eq!(grad[1], -Vector3::x());
    }

    #[test]
    fn out_of_range_exchange_site_is_rejected() {
        let result = Hamiltonian::new(2, vec![ExchangePair::new(0, 2, 1.0)], None, None);
        assert_eq!(
            result,
            Err(HamiltonianError::SiteOutOfRange {
                term: "exchange",
                entry: 0,
                index: 2,
                n_sites: 2,
            })
        );
    }

    #[test]
    fn out_of_range_dmi_and_anisotropy_sites_are_rejected() {
        let dmi = Hamiltonian::new(
            2,
            vec![],
            Some(vec![DmiPair::new(5, 0, Vector3::z())]),
            None,
        );
        assert!(matches!(
            dmi,
            Err(HamiltonianError::SiteOutOfRange { term: "dmi", .. })
        ));

        let aniso = Hamiltonian::new(
            2,
            vec![],
            None,
            Some(vec![AnisotropySite::new(3, 1.0, Vector3::z())]),
        );
        assert!(matches!(
            aniso,
            Err(HamiltonianError::SiteOutOfRange {
                term: "anisotropy",
                ..
            })
        ));
    }

    #[test]
    fn mismatched_spin_count_is_rejected() {
        let h = Hamiltonian::new(3, vec![], None, None).unwrap();
        let result = h.evaluate(&[Vector3::z()], None);
        assert_eq!(
            result,
            Err(HamiltonianError::SpinCountMismatch {
                expected: 3,
                found: 1
            })
        );
    }
}
