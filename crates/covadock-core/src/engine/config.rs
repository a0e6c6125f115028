use super::toolkit::EmbedOptions;
use crate::core::scoring::covalent::ScoringPolicy;
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

/// Identifies a residue by chain and sequence number, written `A:145`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResidueSpecifier {
    pub chain_id: char,
    pub residue_number: isize,
}

impl ResidueSpecifier {
    pub fn new(chain_id: char, residue_number: isize) -> Self {
        Self {
            chain_id,
            residue_number,
        }
    }
}

impl fmt::Display for ResidueSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.residue_number)
    }
}

impl FromStr for ResidueSpecifier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidParameter {
            parameter: "target",
            reason: format!("'{}' {}", s, reason),
        };
        let (chain, number) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| invalid("is not of the form CHAIN:NUMBER"))?;
        let mut chars = chain.chars();
        let chain_id = match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => c,
            _ => return Err(invalid("must name a single-character chain")),
        };
        let residue_number = number
            .trim()
            .parse()
            .map_err(|_| invalid("has a non-integer residue number"))?;
        Ok(Self {
            chain_id,
            residue_number,
        })
    }
}

/// The search volume handed to the docking engine.
///
/// Extents are validated at construction and the value is never mutated; recentering
/// produces a new box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockingBox {
    center: Point3<f64>,
    size: Vector3<f64>,
}

impl DockingBox {
    /// Edge length, in Å, of the box used when no target is given.
    pub const DEFAULT_EDGE: f64 = 20.0;
    /// Edge length, in Å, of the box centred on a covalent target.
    pub const COVALENT_EDGE: f64 = 15.0;

    pub fn new(center: Point3<f64>, size: Vector3<f64>) -> Result<Self, ConfigError> {
        if !center.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                parameter: "box.center",
                reason: format!("coordinates must be finite, got {:?}", center.coords.as_slice()),
            });
        }
        if !size.iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "box.size",
                reason: format!(
                    "extents must be positive and finite, got {:?}",
                    size.as_slice()
                ),
            });
        }
        Ok(Self { center, size })
    }

    /// A cube of edge `edge` centred on `center`.
    pub fn around(center: Point3<f64>, edge: f64) -> Result<Self, ConfigError> {
        Self::new(center, Vector3::new(edge, edge, edge))
    }

    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    pub fn size(&self) -> Vector3<f64> {
        self.size
    }

    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let half = self.size / 2.0;
        (0..3).all(|i| (point[i] - self.center[i]).abs() <= half[i])
    }
}

impl Default for DockingBox {
    fn default() -> Self {
        let edge = Self::DEFAULT_EDGE;
        Self {
            center: Point3::origin(),
            size: Vector3::new(edge, edge, edge),
        }
    }
}

/// One engine invocation's parameters. Built fresh per request.
#[derive(Debug, Clone, PartialEq)]
pub struct DockingConfig {
    pub receptor: PathBuf,
    pub ligand: PathBuf,
    pub docking_box: DockingBox,
    pub exhaustiveness: u32,
    pub num_modes: u32,
}

impl DockingConfig {
    pub const DEFAULT_EXHAUSTIVENESS: u32 = 8;
    pub const DEFAULT_NUM_MODES: u32 = 9;

    /// Serializes the configuration as the engine's `key = value` config file.
    pub fn to_engine_text(&self) -> String {
        let c = self.docking_box.center();
        let s = self.docking_box.size();
        format!(
            "receptor = {}\nligand = {}\n\
center_x = {:.3}\ncenter_y = {:.3}\ncenter_z = {:.3}\n\
size_x = {:.3}\nsize_y = {:.3}\nsize_z = {:.3}\n\
exhaustiveness = {}\nnum_modes = {}\n",
            self.receptor.display(),
            self.ligand.display(),
            c.x,
            c.y,
            c.z,
            s.x,
            s.y,
            s.z,
            self.exhaustiveness,
            self.num_modes,
        )
    }
}

#[derive(Default)]
pub struct DockingConfigBuilder {
    receptor: Option<PathBuf>,
    ligand: Option<PathBuf>,
    docking_box: Option<DockingBox>,
    exhaustiveness: Option<u32>,
    num_modes: Option<u32>,
}

impl DockingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receptor(mut self, path: PathBuf) -> Self {
        self.receptor = Some(path);
        self
    }
    pub fn ligand(mut self, path: PathBuf) -> Self {
        self.ligand = Some(path);
        self
    }
    pub fn docking_box(mut self, docking_box: DockingBox) -> Self {
        self.docking_box = Some(docking_box);
        self
    }
    pub fn exhaustiveness(mut self, exhaustiveness: u32) -> Self {
        self.exhaustiveness = Some(exhaustiveness);
        self
    }
    pub fn num_modes(mut self, n: u32) -> Self {
        self.num_modes = Some(n);
        self
    }

    pub fn build(self) -> Result<DockingConfig, ConfigError> {
        let exhaustiveness = positive(
            "exhaustiveness",
            self.exhaustiveness
                .unwrap_or(DockingConfig::DEFAULT_EXHAUSTIVENESS),
        )?;
        let num_modes = positive(
            "num_modes",
            self.num_modes.unwrap_or(DockingConfig::DEFAULT_NUM_MODES),
        )?;
        Ok(DockingConfig {
            receptor: self
                .receptor
                .ok_or(ConfigError::MissingParameter("receptor"))?,
            ligand: self.ligand.ok_or(ConfigError::MissingParameter("ligand"))?,
            docking_box: self.docking_box.unwrap_or_default(),
            exhaustiveness,
            num_modes,
        })
    }
}

fn positive(parameter: &'static str, value: u32) -> Result<u32, ConfigError> {
    if value == 0 {
        Err(ConfigError::InvalidParameter {
            parameter,
            reason: "must be at least 1".to_string(),
        })
    } else {
        Ok(value)
    }
}

/// Settings shared by every request a pipeline runs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub vina_path: PathBuf,
    pub exhaustiveness: u32,
    pub num_modes: u32,
    /// The box used when no target residue is given or it cannot be resolved.
    pub default_box: DockingBox,
    /// Nucleophile atom looked up in the target residue.
    pub target_atom_name: String,
    pub covalent_box_edge: f64,
    pub scoring_policy: ScoringPolicy,
    /// Parent directory of per-request working directories; the system temp dir if unset.
    pub scratch_root: Option<PathBuf>,
    pub keep_workdir: bool,
    pub embed: EmbedOptions,
    /// Drop `HETATM` records (ligands, ions) from the receptor before conversion.
    pub remove_heteroatoms: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vina_path: PathBuf::from("vina"),
            exhaustiveness: DockingConfig::DEFAULT_EXHAUSTIVENESS,
            num_modes: DockingConfig::DEFAULT_NUM_MODES,
            default_box: DockingBox::default(),
            target_atom_name: "SG".to_string(),
            covalent_box_edge: DockingBox::COVALENT_EDGE,
            scoring_policy: ScoringPolicy::default(),
            scratch_root: None,
            keep_workdir: false,
            embed: EmbedOptions::default(),
            remove_heteroatoms: false,
        }
    }
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    vina_path: Option<PathBuf>,
    exhaustiveness: Option<u32>,
    num_modes: Option<u32>,
    default_box: Option<DockingBox>,
    target_atom_name: Option<String>,
    covalent_box_edge: Option<f64>,
    scoring_policy: Option<ScoringPolicy>,
    scratch_root: Option<PathBuf>,
    keep_workdir: Option<bool>,
    embed: Option<EmbedOptions>,
    remove_heteroatoms: Option<bool>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vina_path(mut self, path: PathBuf) -> Self {
        self.vina_path = Some(path);
        self
    }
    pub fn exhaustiveness(mut self, exhaustiveness: u32) -> Self {
        self.exhaustiveness = Some(exhaustiveness);
        self
    }
    pub fn num_modes(mut self, n: u32) -> Self {
        self.num_modes = Some(n);
        self
    }
    pub fn default_box(mut self, docking_box: DockingBox) -> Self {
        self.default_box = Some(docking_box);
        self
    }
    pub fn target_atom_name(mut self, name: impl Into<String>) -> Self {
        self.target_atom_name = Some(name.into());
        self
    }
    pub fn covalent_box_edge(mut self, edge: f64) -> Self {
        self.covalent_box_edge = Some(edge);
        self
    }
    pub fn scoring_policy(mut self, policy: ScoringPolicy) -> Self {
        self.scoring_policy = Some(policy);
        self
    }
    pub fn scratch_root(mut self, path: PathBuf) -> Self {
        self.scratch_root = Some(path);
        self
    }
    pub fn keep_workdir(mut self, keep: bool) -> Self {
        self.keep_workdir = Some(keep);
        self
    }
    pub fn embed(mut self, options: EmbedOptions) -> Self {
        self.embed = Some(options);
        self
    }
    pub fn remove_heteroatoms(mut self, remove: bool) -> Self {
        self.remove_heteroatoms = Some(remove);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let defaults = PipelineConfig::default();
        let covalent_box_edge = self.covalent_box_edge.unwrap_or(defaults.covalent_box_edge);
        if !(covalent_box_edge.is_finite() && covalent_box_edge > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "covalent_box_edge",
                reason: format!("must be positive and finite, got {covalent_box_edge}"),
            });
        }
        let target_atom_name = self
            .target_atom_name
            .unwrap_or(defaults.target_atom_name)
            .trim()
            .to_string();
        if target_atom_name.is_empty() {
            return Err(ConfigError::MissingParameter("target_atom_name"));
        }

        Ok(PipelineConfig {
            vina_path: self.vina_path.unwrap_or(defaults.vina_path),
            exhaustiveness: positive(
                "exhaustiveness",
                self.exhaustiveness.unwrap_or(defaults.exhaustiveness),
            )?,
            num_modes: positive("num_modes", self.num_modes.unwrap_or(defaults.num_modes))?,
            default_box: self.default_box.unwrap_or(defaults.default_box),
            target_atom_name,
            covalent_box_edge,
            scoring_policy: self.scoring_policy.unwrap_or(defaults.scoring_policy),
            scratch_root: self.scratch_root.or(defaults.scratch_root),
            keep_workdir: self.keep_workdir.unwrap_or(defaults.keep_workdir),
            embed: self.embed.unwrap_or(defaults.embed),
            remove_heteroatoms: self.remove_heteroatoms.unwrap_or(defaults.remove_heteroatoms),
        })
    }
}
