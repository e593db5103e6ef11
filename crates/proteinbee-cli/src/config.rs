use crate::error::{CliError, Result};
use proteinbee::core::models::motif::Motif;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_DESIGNED_CHAIN: char = 'A';

/// Values shared by every `[[comparison]]` entry unless the entry overrides them.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialDefaults {
    reference: Option<PathBuf>,
    reference_motif: Option<Motif>,
    atom_types: Option<Vec<String>>,
    designed_chain: Option<char>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialComparison {
    name: Option<String>,
    reference: Option<PathBuf>,
    reference_motif: Option<Motif>,
    mobile: PathBuf,
    mobile_motif: Option<Motif>,
    atom_types: Option<Vec<String>>,
    designed_chain: Option<char>,
}

/// A batch file as written by the user, before defaults are applied.
///
/// ```toml
/// [defaults]
/// reference = "native.pdb"
/// reference-motif = "A24-42/4/B64-82"
/// atom-types = ["N", "CA", "C", "O"]
///
/// [[comparison]]
/// mobile = "designs/design_0.pdb"
///
/// [[comparison]]
/// name = "two-chain"
/// mobile = "designs/design_1.cif"
/// mobile-motif = "A1-19/B1-19"
/// ```
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialBatchConfig {
    #[serde(default)]
    defaults: PartialDefaults,
    #[serde(default, rename = "comparison")]
    comparisons: Vec<PartialComparison>,
}

/// A fully specified comparison with paths resolved against the batch file.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonConfig {
    pub name: String,
    pub reference: PathBuf,
    pub reference_motif: Motif,
    pub mobile: PathBuf,
    pub mobile_motif: Motif,
    pub atom_types: Option<Vec<String>>,
}

impl PartialBatchConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading batch configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Applies the defaults to every entry and resolves relative paths against
    /// `base_dir`.
    ///
    /// An entry without `mobile-motif` compares against the reference motif
    /// renumbered onto the designed chain (`A` unless `designed-chain` is set).
    pub fn resolve(self, base_dir: &Path) -> Result<Vec<ComparisonConfig>> {
        if self.comparisons.is_empty() {
            return Err(CliError::Config(
                "the batch file contains no [[comparison]] entries".to_string(),
            ));
        }

        let defaults = self.defaults;
        self.comparisons
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let name = entry.name.unwrap_or_else(|| {
                    entry
                        .mobile
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                        .unwrap_or_else(|| format!("comparison-{}", index + 1))
                });
                let reference = entry
                    .reference
                    .or_else(|| defaults.reference.clone())
                    .ok_or_else(|| CliError::Config(format!("comparison '{}' has no reference structure", name)))?;
                let reference_motif = entry
                    .reference_motif
                    .or_else(|| defaults.reference_motif.clone())
                    .ok_or_else(|| CliError::Config(format!("comparison '{}' has no reference motif", name)))?;
                let mobile_motif = match entry.mobile_motif {
                    Some(motif) => motif,
                    None => {
                        let chain = entry
                            .designed_chain
                            .or(defaults.designed_chain)
                            .unwrap_or(DEFAULT_DESIGNED_CHAIN);
                        reference_motif
                            .get_motif_wrt_designed_structure(chain)
                            .map_err(|source| CliError::Motif {
                                motif: reference_motif.to_string(),
                                source,
                            })?
                    }
                };

                Ok(ComparisonConfig {
                    name,
                    reference: base_dir.join(reference),
                    reference_motif,
                    mobile: base_dir.join(entry.mobile),
                    mobile_motif,
                    atom_types: entry.atom_types.or_else(|| defaults.atom_types.clone()),
                })
            })
            .collect()
    }
}
