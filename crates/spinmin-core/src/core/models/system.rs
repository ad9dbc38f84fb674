use super::coupling::{AnisotropyCoupling, DmiCoupling, ExchangeCoupling};
use super::spin::{SiteId, SpinSite};
use crate::core::hamiltonian::evaluator::{
    AnisotropySite, DmiPair, ExchangePair, Hamiltonian, HamiltonianError,
};
use nalgebra::Vector3;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SystemError {
    #[error("Spin table is empty")]
    EmptySystem,
    #[error("Site {0} appears more than once in the spin table")]
    DuplicateSite(SiteId),
    #[error("{term} entry {entry} references site {site}, which is not in the spin table")]
    UnknownSite {
        term: &'static str,
        entry: usize,
        site: SiteId,
    },
    #[error("Site {0} has a zero or non-finite moment and cannot be normalized")]
    DegenerateSpin(SiteId),
    #[error(transparent)]
    Hamiltonian(#[from] HamiltonianError),
}

/// A fully assembled spin lattice.
///
/// Sites keep the order of the input spin table; that order defines the dense
/// index used by the [`Hamiltonian`]. Every coupling has been resolved from
/// site identifiers to dense indices and validated.
#[derive(Debug, Clone)]
pub struct SpinSystem {
    sites: Vec<SpinSite>,
    index_of: HashMap<SiteId, usize>,
    hamiltonian: Hamiltonian,
}

impl SpinSystem {
    pub fn sites(&self) -> &[SpinSite] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn hamiltonian(&self) -> &Hamiltonian {
        &self.hamiltonian
    }

    /// Dense index of a site identifier.
    pub fn index_of(&self, site: SiteId) -> Option<usize> {
        self.index_of.get(&site).copied()
    }

    /// Unit-normalized moments in dense order.
    pub fn unit_spins(&self) -> Vec<Vector3<f64>> {
        // Builder guarantees every moment normalizes.
        self.sites
            .iter()
            .map(|s| s.direction().unwrap_or_else(Vector3::z))
            .collect()
    }

    /// Returns a copy of the site table with its moments replaced by `spins`,
    /// keeping site identifiers and atom labels.
    pub fn with_moments(&self, spins: &[Vector3<f64>]) -> Vec<SpinSite> {
        self.sites
            .iter()
            .zip(spins)
            .map(|(site, m)| SpinSite::new(site.site, site.atom, *m))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct SpinSystemBuilder {
    sites: Vec<SpinSite>,
    exchange: Vec<ExchangeCoupling>,
    dmi: Option<Vec<DmiCoupling>>,
    anisotropy: Option<Vec<AnisotropyCoupling>>,
}

impl SpinSystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spins(mut self, sites: Vec<SpinSite>) -> Self {
        self.sites = sites;
        self
    }

    pub fn exchange(mut self, couplings: Vec<ExchangeCoupling>) -> Self {
        self.exchange = couplings;
        self
    }

    pub fn dmi(mut self, couplings: Option<Vec<DmiCoupling>>) -> Self {
        self.dmi = couplings;
        self
    }

    pub fn anisotropy(mut self, couplings: Option<Vec<AnisotropyCoupling>>) -> Self {
        self.anisotropy = couplings;
        self
    }

    pub fn build(self) -> Result<SpinSystem, SystemError> {
        if self.sites.is_empty() {
            return Err(SystemError::EmptySystem);
        }

        let mut index_of = HashMap::with_capacity(self.sites.len());
        for (idx, site) in self.sites.iter().enumerate() {
            if index_of.insert(site.site, idx).is_some() {
                return Err(SystemError::DuplicateSite(site.site));
            }
            if site.direction().is_none() {
                return Err(SystemError::DegenerateSpin(site.site));
            }
        }

        let resolve = |term: &'static str, entry: usize, site: SiteId| {
            index_of
                .get(&site)
                .copied()
                .ok_or(SystemError::UnknownSite { term, entry, site })
        };

        let exchange = self
            .exchange
            .iter()
            .enumerate()
            .map(|(entry, c)| {
                Ok(ExchangePair::new(
                    resolve("exchange", entry, c.i)?,
                    resolve("exchange", entry, c.j)?,
                    c.strength,
                ))
            })
            .collect::<Result<Vec<_>, SystemError>>()?;

        let dmi = self
            .dmi
            .map(|couplings| {
                couplings
                    .iter()
                    .enumerate()
                    .map(|(entry, c)| {
                        Ok(DmiPair::new(
                            resolve("dmi", entry, c.i)?,
                            resolve("dmi", entry, c.j)?,
                            c.vector,
                        ))
                    })
                    .collect::<Result<Vec<_>, SystemError>>()
            })
            .transpose()?;

        let anisotropy = self
            .anisotropy
            .map(|couplings| {
                couplings
                    .iter()
                    .enumerate()
                    .map(|(entry, c)| {
                        Ok(AnisotropySite::new(
                            resolve("anisotropy", entry, c.site)?,
                            c.k1,
                            c.axis,
                        ))
                    })
                    .collect::<Result<Vec<_>, SystemError>>()
            })
            .transpose()?;

        let hamiltonian = Hamiltonian::new(self.sites.len(), exchange, dmi, anisotropy)?;

        Ok(SpinSystem {
            sites: self.sites,
            index_of,
            hamiltonian,
        })
    }
}
