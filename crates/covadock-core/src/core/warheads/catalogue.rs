use crate::core::chem::smarts::SmartsPattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

/// The built-in electrophile families, in catalogue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarheadKind {
    Acrylamide,
    Chloroacetamide,
    VinylSulfone,
    VinylSulfonamide,
    AlphaHaloKetone,
    AlphaHaloAmide,
    Epoxide,
    MichaelAcceptor,
    Cyanoacrylate,
    VinylKetone,
    AllylSulfone,
    Propiolamide,
    Nitrile,
}

impl WarheadKind {
    pub const ALL: [WarheadKind; 13] = [
        WarheadKind::Acrylamide,
        WarheadKind::Chloroacetamide,
        WarheadKind::VinylSulfone,
        WarheadKind::VinylSulfonamide,
        WarheadKind::AlphaHaloKetone,
        WarheadKind::AlphaHaloAmide,
        WarheadKind::Epoxide,
        WarheadKind::MichaelAcceptor,
        WarheadKind::Cyanoacrylate,
        WarheadKind::VinylKetone,
        WarheadKind::AllylSulfone,
        WarheadKind::Propiolamide,
        WarheadKind::Nitrile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WarheadKind::Acrylamide => "acrylamide",
            WarheadKind::Chloroacetamide => "chloroacetamide",
            WarheadKind::VinylSulfone => "vinyl_sulfone",
            WarheadKind::VinylSulfonamide => "vinyl_sulfonamide",
            WarheadKind::AlphaHaloKetone => "alpha_halo_ketone",
            WarheadKind::AlphaHaloAmide => "alpha_halo_amide",
            WarheadKind::Epoxide => "epoxide",
            WarheadKind::MichaelAcceptor => "michael_acceptor",
            WarheadKind::Cyanoacrylate => "cyanoacrylate",
            WarheadKind::VinylKetone => "vinyl_ketone",
            WarheadKind::AllylSulfone => "allyl_sulfone",
            WarheadKind::Propiolamide => "propiolamide",
            WarheadKind::Nitrile => "nitrile",
        }
    }

    pub fn smarts(&self) -> &'static str {
        match self {
            WarheadKind::Acrylamide => "[CX3]=[CX3]C(=O)N",
            WarheadKind::Chloroacetamide => "Cl[CH2]C(=O)N",
            WarheadKind::VinylSulfone => "[CX3]=[CX3]S(=O)(=O)[#6]",
            WarheadKind::VinylSulfonamide => "[CX3]=[CX3]S(=O)(=O)N",
            WarheadKind::AlphaHaloKetone => "[CX4;H1,H2][CX3](=O)[F,Cl,Br,I]",
            WarheadKind::AlphaHaloAmide => "[CX4;H1,H2][CX3](=O)N[F,Cl,Br,I]",
            WarheadKind::Epoxide => "C1OC1",
            WarheadKind::MichaelAcceptor => "[CX3]=[CX3][CX3]=O",
            WarheadKind::Cyanoacrylate => "[CX3]=[CX3]C#N",
            WarheadKind::VinylKetone => "[CX3]=[CX3][CX3](=O)[#6]",
            WarheadKind::AllylSulfone => "[CX3]=[CX3]CS(=O)(=O)C",
            WarheadKind::Propiolamide => "C#CC(=O)N",
            WarheadKind::Nitrile => "[CX2]#N",
        }
    }
}

impl fmt::Display for WarheadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WarheadKind {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WarheadKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| CatalogueError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unknown warhead kind: '{0}'")]
    UnknownKind(String),
}

/// A compiled catalogue pattern.
#[derive(Debug, Clone)]
pub struct WarheadPattern {
    pub name: String,
    pub kind: Option<WarheadKind>,
    pub pattern: SmartsPattern,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogueFile {
    #[serde(default)]
    warhead: Vec<CatalogueEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogueEntry {
    pub name: String,
    pub smarts: String,
}

/// An ordered, compiled list of reactive-group patterns.
///
/// Entries whose SMARTS fails to compile are left out with a warning; the rest keep
/// their relative order.
#[derive(Debug, Clone, Default)]
pub struct WarheadCatalogue {
    patterns: Vec<WarheadPattern>,
}

static BUILTIN: LazyLock<WarheadCatalogue> = LazyLock::new(WarheadCatalogue::builtin);

impl WarheadCatalogue {
    /// Compiles the built-in catalogue.
    pub fn builtin() -> Self {
        Self::from_entries(WarheadKind::ALL.iter().map(|kind| CatalogueEntry {
            name: kind.as_str().to_string(),
            smarts: kind.smarts().to_string(),
        }))
    }

    /// The process-wide built-in catalogue, compiled on first use.
    pub fn global() -> &'static WarheadCatalogue {
        &BUILTIN
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CatalogueEntry>) -> Self {
        let patterns = entries
            .into_iter()
            .filter_map(|entry| match SmartsPattern::parse(&entry.smarts) {
                Ok(pattern) => Some(WarheadPattern {
                    kind: entry.name.parse().ok(),
                    name: entry.name,
                    pattern,
                }),
                Err(e) => {
                    warn!(
                        warhead = %entry.name,
                        smarts = %entry.smarts,
                        error = %e,
                        "Excluding warhead pattern that failed to compile"
                    );
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    /// Loads a catalogue of `[[warhead]]` tables with `name` and `smarts` keys.
    pub fn load(path: &Path) -> Result<Self, CatalogueError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogueError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: CatalogueFile = toml::from_str(&content).map_err(|e| CatalogueError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(Self::from_entries(file.warhead))
    }

    pub fn patterns(&self) -> &[WarheadPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
