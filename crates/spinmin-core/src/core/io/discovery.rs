use super::traits::{TableError, TableFile};
use super::uppasd::{AnisotropyFile, DmiFile, ExchangeFile, RestartFile};
use crate::core::models::system::{SpinSystem, SpinSystemBuilder, SystemError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

pub const CANONICAL_RESTART: &str = "restart.SCsurf_T.out";
pub const EXCHANGE_FILE: &str = "jij";
pub const DMI_FILE: &str = "dmdata";
pub const MANIFEST_FILE: &str = "lattice.toml";

const RESTART_PREFIX: &str = "restart";
const ANISOTROPY_PREFIX: &str = "anisotropy";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),
    #[error("Failed to list '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No {role} file found in '{dir}'")]
    NotFound { role: &'static str, dir: PathBuf },
    #[error("The {role} file '{path}' does not exist")]
    MissingFile { role: &'static str, path: PathBuf },
    #[error("Invalid lattice manifest '{path}': {source}")]
    Manifest {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    System(#[from] SystemError),
}

/// Per-file path overrides.
///
/// The same shape is accepted from a `lattice.toml` manifest in the lattice
/// directory, where relative paths resolve against that directory.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileOverrides {
    pub restart: Option<PathBuf>,
    pub exchange: Option<PathBuf>,
    pub dmi: Option<PathBuf>,
    pub anisotropy: Option<PathBuf>,
}

impl FileOverrides {
    fn rebased(self, dir: &Path) -> Self {
        let rebase = |p: Option<PathBuf>| p.map(|p| dir.join(p));
        Self {
            restart: rebase(self.restart),
            exchange: rebase(self.exchange),
            dmi: rebase(self.dmi),
            anisotropy: rebase(self.anisotropy),
        }
    }

    /// Fills every unset entry from `fallback`.
    fn or(self, fallback: Self) -> Self {
        Self {
            restart: self.restart.or(fallback.restart),
            exchange: self.exchange.or(fallback.exchange),
            dmi: self.dmi.or(fallback.dmi),
            anisotropy: self.anisotropy.or(fallback.anisotropy),
        }
    }
}

/// The input tables that describe one lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemFiles {
    pub restart: PathBuf,
    pub exchange: PathBuf,
    pub dmi: Option<PathBuf>,
    pub anisotropy: Option<PathBuf>,
}

impl SystemFiles {
    /// Locates the input tables of the lattice stored in `dir`.
    ///
    /// Explicit `overrides` win over entries of a `lattice.toml` manifest,
    /// which win over the files found by name. Directory entries are scanned
    /// in sorted order so prefix matches are deterministic.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn discover(dir: &Path, overrides: &FileOverrides) -> Result<Self, DiscoveryError> {
        if !dir.is_dir() {
            return Err(DiscoveryError::NotADirectory(dir.to_path_buf()));
        }

        let chosen = overrides.clone().or(read_manifest(dir)?);

        let mut names = std::fs::read_dir(dir)
            .and_then(|entries| {
                entries
                    .map(|e| e.map(|e| e.file_name().to_string_lossy().to_string()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|e| DiscoveryError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
        names.sort();
        let find_prefixed = |prefix: &str| {
            names
                .iter()
                .find(|n| n.starts_with(prefix) && dir.join(n).is_file())
                .map(|n| dir.join(n))
        };

        let restart = match chosen.restart {
            Some(path) => require("restart", path)?,
            None => {
                let canonical = dir.join(CANONICAL_RESTART);
                if canonical.is_file() {
                    canonical
                } else {
                    find_prefixed(RESTART_PREFIX).ok_or_else(|| DiscoveryError::NotFound {
                        role: "restart",
                        dir: dir.to_path_buf(),
                    })?
                }
            }
        };

        let exchange = match chosen.exchange {
            Some(path) => require("exchange", path)?,
            None => {
                let path = dir.join(EXCHANGE_FILE);
                if !path.is_file() {
                    return Err(DiscoveryError::NotFound {
                        role: "exchange",
                        dir: dir.to_path_buf(),
                    });
                }
                path
            }
        };

        let dmi = match chosen.dmi {
            Some(path) => Some(require("dmi", path)?),
            None => Some(dir.join(DMI_FILE)).filter(|p| p.is_file()),
        };
        if dmi.is_none() {
            info!("No DMI file found; the DMI term is skipped.");
        }

        let anisotropy = match chosen.anisotropy {
            Some(path) => Some(require("anisotropy", path)?),
            None => find_prefixed(ANISOTROPY_PREFIX),
        };
        if anisotropy.is_none() {
            info!("No anisotropy file found; the anisotropy term is skipped.");
        }

        Ok(Self {
            restart,
            exchange,
            dmi,
            anisotropy,
        })
    }

    /// Parses every table and assembles the lattice.
    #[instrument(skip_all, name = "load_system")]
    pub fn load(&self) -> Result<SpinSystem, DiscoveryError> {
        let spins = RestartFile::read_from_path(&self.restart)?;
        let exchange = ExchangeFile::read_from_path(&self.exchange)?;
        let dmi = self
            .dmi
            .as_ref()
            .map(DmiFile::read_from_path)
            .transpose()?;
        let anisotropy = self
            .anisotropy
            .as_ref()
            .map(AnisotropyFile::read_from_path)
            .transpose()?;

        info!(
            sites = spins.len(),
            exchange = exchange.len(),
            dmi = dmi.as_ref().map_or(0, Vec::len),
            anisotropy = anisotropy.as_ref().map_or(0, Vec::len),
            "Loaded lattice tables."
        );

        Ok(SpinSystemBuilder::new()
            .spins(spins)
            .exchange(exchange)
            .dmi(dmi)
            .anisotropy(anisotropy)
            .build()?)
    }
}

fn require(role: &'static str, path: PathBuf) -> Result<PathBuf, DiscoveryError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(DiscoveryError::MissingFile { role, path })
    }
}

fn read_manifest(dir: &Path) -> Result<FileOverrides, DiscoveryError> {
    let path = dir.join(MANIFEST_FILE);
    if !path.is_file() {
        return Ok(FileOverrides::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|e| DiscoveryError::Io {
        path: path.clone(),
        source: e,
    })?;
    let manifest: FileOverrides =
        toml::from_str(&content).map_err(|e| DiscoveryError::Manifest {
            path,
            source: Box::new(e),
        })?;
    Ok(manifest.rebased(dir))
}
