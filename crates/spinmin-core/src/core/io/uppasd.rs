use super::traits::{TableFile, TableParseErrorKind, float_column, int_column};
use crate::core::models::coupling::{AnisotropyCoupling, DmiCoupling, ExchangeCoupling};
use crate::core::models::spin::SpinSite;
use nalgebra::Vector3;

fn vector_columns(fields: &[&str], first: usize) -> Result<Vector3<f64>, TableParseErrorKind> {
    Ok(Vector3::new(
        float_column(fields, first)?,
        float_column(fields, first + 1)?,
        float_column(fields, first + 2)?,
    ))
}

/// Restart snapshot: `iterens iatom site |Mom| Mx My Mz`.
///
/// The ensemble index and the moment magnitude are read past; the moment
/// direction is kept as written.
pub struct RestartFile;

impl TableFile for RestartFile {
    type Record = SpinSite;
    const MIN_COLUMNS: usize = 7;

    fn parse_record(fields: &[&str]) -> Result<SpinSite, TableParseErrorKind> {
        let atom = int_column(fields, 2)?;
        let site = int_column(fields, 3)?;
        float_column(fields, 4)?;
        Ok(SpinSite::new(site, atom, vector_columns(fields, 5)?))
    }
}

/// Exchange couplings (`jij`): `i j dx dy dz Jij`.
pub struct ExchangeFile;

impl TableFile for ExchangeFile {
    type Record = ExchangeCoupling;
    const MIN_COLUMNS: usize = 6;

    fn parse_record(fields: &[&str]) -> Result<ExchangeCoupling, TableParseErrorKind> {
        Ok(ExchangeCoupling {
            i: int_column(fields, 1)?,
            j: int_column(fields, 2)?,
            offset: vector_columns(fields, 3)?,
            strength: float_column(fields, 6)?,
        })
    }
}

/// DMI couplings (`dmdata`): `i j dx dy dz Dx Dy Dz`.
pub struct DmiFile;

impl TableFile for DmiFile {
    type Record = DmiCoupling;
    const MIN_COLUMNS: usize = 8;

    fn parse_record(fields: &[&str]) -> Result<DmiCoupling, TableParseErrorKind> {
        Ok(DmiCoupling {
            i: int_column(fields, 1)?,
            j: int_column(fields, 2)?,
            offset: vector_columns(fields, 3)?,
            vector: vector_columns(fields, 6)?,
        })
    }
}

/// Single-ion anisotropy: `site mode K1 K2 ex ey ez [ratio]`.
///
/// `mode`, `K2` and `ratio` are validated as numbers and otherwise unused;
/// only the uniaxial `K1` term enters the energy.
pub struct AnisotropyFile;

impl TableFile for AnisotropyFile {
    type Record = AnisotropyCoupling;
    const MIN_COLUMNS: usize = 7;

    fn parse_record(fields: &[&str]) -> Result<AnisotropyCoupling, TableParseErrorKind> {
        let site = int_column(fields, 1)?;
        float_column(fields, 2)?;
        let k1 = float_column(fields, 3)?;
        float_column(fields, 4)?;
        let axis = vector_columns(fields, 5)?;
        if fields.len() > 7 {
            float_column(fields, 8)?;
        }
        Ok(AnisotropyCoupling::new(site, k1, axis))
    }
}
