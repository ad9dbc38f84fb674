use crate::core::models::spin::{SiteId, SpinSite};
use itertools::Itertools;
use nalgebra::Vector3;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
pub enum CompareError {
    #[error("The {0} spin table is empty")]
    EmptyTable(&'static str),
    #[error("Site {site} appears more than once in the {table} spin table")]
    DuplicateSite { table: &'static str, site: SiteId },
    #[error("Site {site} of the {table} spin table has a zero or non-finite moment")]
    ZeroNorm { table: &'static str, site: SiteId },
    #[error(
        "Spin tables cover different sites ({} only in reference, {} only in candidate)",
        only_in_reference.len(),
        only_in_candidate.len()
    )]
    SiteMismatch {
        only_in_reference: Vec<SiteId>,
        only_in_candidate: Vec<SiteId>,
    },
}

/// Per-site angular deviation between two spin configurations, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct AngularDeviation {
    pub mean_deg: f64,
    pub max_deg: f64,
    /// Deviation of every site, in ascending site order.
    pub per_site: Vec<(SiteId, f64)>,
}

/// Compares two spin tables site by site.
///
/// Both tables are keyed by site identifier and realigned to ascending site
/// order, so their row order does not matter. Moments are renormalized before
/// the angle is taken.
pub fn compare_spins(
    reference: &[SpinSite],
    candidate: &[SpinSite],
) -> Result<AngularDeviation, CompareError> {
    let reference = keyed("reference", reference)?;
    let candidate = keyed("candidate", candidate)?;

    if !reference.keys().eq(candidate.keys()) {
        let only_in_reference = reference
            .keys()
            .filter(|k| !candidate.contains_key(k))
            .copied()
            .collect();
        let only_in_candidate = candidate
            .keys()
            .filter(|k| !reference.contains_key(k))
            .copied()
            .collect();
        return Err(CompareError::SiteMismatch {
            only_in_reference,
            only_in_candidate,
        });
    }

    let per_site: Vec<(SiteId, f64)> = reference
        .iter()
        .zip_eq(candidate.values())
        .map(|((&site, a), b)| (site, angle_deg(a, b)))
        .collect();

    let max_deg = per_site.iter().map(|&(_, d)| d).fold(0.0, f64::max);
    let mean_deg = per_site.iter().map(|&(_, d)| d).sum::<f64>() / per_site.len() as f64;

    info!(
        mean_deg = format_args!("{mean_deg:.4}"),
        max_deg = format_args!("{max_deg:.4}"),
        sites = per_site.len(),
        "Per-site angular deviation."
    );

    Ok(AngularDeviation {
        mean_deg,
        max_deg,
        per_site,
    })
}

fn keyed(
    table: &'static str,
    sites: &[SpinSite],
) -> Result<BTreeMap<SiteId, Vector3<f64>>, CompareError> {
    if sites.is_empty() {
        return Err(CompareError::EmptyTable(table));
    }
    let mut map = BTreeMap::new();
    for s in sites {
        let dir = s.direction().ok_or(CompareError::ZeroNorm {
            table,
            site: s.site,
        })?;
        if map.insert(s.site, dir).is_some() {
            return Err(CompareError::DuplicateSite {
                table,
                site: s.site,
            });
        }
    }
    Ok(map)
}

/// Angle between two unit vectors. Equal to `acos(clamp(a . b))`, but exact
/// for parallel and antiparallel pairs.
fn angle_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let cos = a.dot(b).clamp(-1.0, 1.0);
    let sin = a.cross(b).norm().min(1.0);
    sin.atan2(cos).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(SiteId, [f64; 3])]) -> Vec<SpinSite> {
        entries
            .iter()
            .map(|&(site, [x, y, z])| SpinSite::new(site, 1, Vector3::new(x, y, z)))
            .collect()
    }

    #[test]
    fn identical_tables_have_zero_deviation() {
        let a = table(&[(1, [0.0, 0.0, 1.0]), (2, [0.6, 0.0, 0.8])]);
        let dev = compare_spins(&a, &a).unwrap();
        assert_eq!(dev.mean_deg, 0.0);
        assert_eq!(dev.max_deg, 0.0);
    }

    #[test]
    fn orthogonal_spins_deviate_by_ninety_degrees() {
        let a = table(&[(1, [1.0, 0.0, 0.0])]);
        let b = table(&[(1, [0.0, 1.0, 0.0])]);
        let dev = compare_spins(&a, &b).unwrap();
        assert!((dev.mean_deg - 90.0).abs() < 1e-12);
        assert!((dev.max_deg - 90.0).abs() < 1e-12);
    }

    #[test]
    fn row_order_and_moment_length_do_not_matter() {
        let a = table(&[(1, [0.0, 0.0, 1.0]), (2, [1.0, 0.0, 0.0])]);
        let b = table(&[(2, [3.0, 0.0, 0.0]), (1, [0.0, 0.0, -2.0])]);
        let dev = compare_spins(&a, &b).unwrap();
        assert_eq!(dev.per_site[0].0, 1);
        assert!((dev.per_site[0].1 - 180.0).abs() < 1e-12);
        assert_eq!(dev.per_site[1], (2, 0.0));
        assert!((dev.mean_deg - 90.0).abs() < 1e-12);
        assert!((dev.max_deg - 180.0).abs() < 1e-12);
    }

    #[test]
    fn different_site_sets_are_rejected() {
        let a = table(&[(1, [0.0, 0.0, 1.0]), (2, [0.0, 0.0, 1.0])]);
        let b = table(&[(1, [0.0, 0.0, 1.0]), (3, [0.0, 0.0, 1.0])]);
        assert_eq!(
            compare_spins(&a, &b).unwrap_err(),
            CompareError::SiteMismatch {
                only_in_reference: vec![2],
                only_in_candidate: vec![3],
            }
        );
    }

    #[test]
    fn duplicate_site_is_rejected() {
        let a = table(&[(1, [0.0, 0.0, 1.0]), (1, [0.0, 1.0, 0.0])]);
        assert!(matches!(
            compare_spins(&a, &a),
            Err(CompareError::DuplicateSite { site: 1, .. })
        ));
    }

    #[test]
    fn zero_vector_is_rejected() {
        let a = table(&[(1, [0.0, 0.0, 1.0])]);
        let b = table(&[(1, [0.0, 0.0, 0.0])]);
        assert_eq!(
            compare_spins(&a, &b).unwrap_err(),
            CompareError::ZeroNorm {
                table: "candidate",
                site: 1
            }
        );
    }

    #[test]
    fn empty_table_is_rejected() {
        let a = table(&[(1, [0.0, 0.0, 1.0])]);
        assert_eq!(
            compare_spins(&a, &[]).unwrap_err(),
            CompareError::EmptyTable("candidate")
        );
    }
}
