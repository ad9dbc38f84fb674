use super::traits::{STREAM_LABEL, TableError};
use crate::core::models::spin::SpinSite;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// One row of a spin CSV table. Columns are matched by header name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct SpinRow {
    site: usize,
    #[serde(default)]
    atom: usize,
    mx: f64,
    my: f64,
    mz: f64,
}

impl From<&SpinSite> for SpinRow {
    fn from(s: &SpinSite) -> Self {
        Self {
            site: s.site,
            atom: s.atom,
            mx: s.moment.x,
            my: s.moment.y,
            mz: s.moment.z,
        }
    }
}

impl From<SpinRow> for SpinSite {
    fn from(r: SpinRow) -> Self {
        SpinSite::new(r.site, r.atom, Vector3::new(r.mx, r.my, r.mz))
    }
}

/// Reads a `site,atom,mx,my,mz` table. A missing `atom` column reads as 0.
pub fn read_from(reader: impl Read) -> Result<Vec<SpinSite>, TableError> {
    read_rows(csv::Reader::from_reader(reader), STREAM_LABEL)
}

pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<SpinSite>, TableError> {
    let path = path.as_ref();
    let reader = csv::Reader::from_path(path).map_err(|e| TableError::csv(path, e))?;
    read_rows(reader, &path.to_string_lossy())
}

fn read_rows<R: Read>(mut reader: csv::Reader<R>, label: &str) -> Result<Vec<SpinSite>, TableError> {
    reader
        .deserialize::<SpinRow>()
        .map(|row| {
            row.map(SpinSite::from).map_err(|e| TableError::Csv {
                path: label.to_string(),
                source: e,
            })
        })
        .collect()
}

/// Writes `sites` as a `site,atom,mx,my,mz` table in the given order.
pub fn write_to(writer: impl Write, sites: &[SpinSite]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for site in sites {
        writer.serialize(SpinRow::from(site))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_to_path<P: AsRef<Path>>(path: P, sites: &[SpinSite]) -> Result<(), TableError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|e| TableError::io(path, e))?;
    write_to(std::io::BufWriter::new(file), sites).map_err(|e| TableError::csv(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn columns_are_matched_by_header_name() {
        let input = "mz,site,mx,my,atom\n1.0,4,0.0,0.0,2\n";
        let sites = read_from(Cursor::new(input)).unwrap();
        assert_eq!(sites, vec![SpinSite::new(4, 2, Vector3::z())]);
    }

    #[test]
    fn atom_column_is_optional_on_read() {
        let input = "site,mx,my,mz\n1,1.0,0.0,0.0\n";
        let sites = read_from(Cursor::new(input)).unwrap();
        assert_eq!(sites[0].atom, 0);
    }

    #[test]
    fn written_table_has_fixed_header_and_reads_back() {
        let sites = vec![
            SpinSite::new(3, 1, Vector3::new(0.6, 0.0, 0.8)),
            SpinSite::new(1, 2, Vector3::new(-1.0, 0.0, 0.0)),
        ];
        let mut buf = Vec::new();
        write_to(&mut buf, &sites).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("site,atom,mx,my,mz\n"));
        assert_eq!(read_from(Cursor::new(buf)).unwrap(), sites);
    }

    #[test]
    fn missing_moment_column_is_an_error() {
        let input = "site,mx,my\n1,1.0,0.0\n";
        assert!(matches!(
            read_from(Cursor::new(input)),
            Err(TableError::Csv { .. })
        ));
    }

    #[test]
    fn read_from_path_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_from_path(dir.path().join("none.csv"));
        assert!(matches!(result, Err(TableError::Csv { .. })));
    }
}
