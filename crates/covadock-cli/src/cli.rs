use clap::{Args, Parser, Subcommand, ValueEnum};
use covadock::core::io::normalize::StructureRole;
use covadock::core::scoring::covalent::ScoringPolicy;
use covadock::engine::config::ResidueSpecifier;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "covadock - Structure-based covalent docking with AutoDock Vina: prepares receptors and ligands, docks, and scores poses for covalent-bond potential.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of ligands docked in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dock one or more ligands against a receptor and score covalent potential.
    Dock(DockArgs),
    /// Detect reactive warheads in SMILES strings.
    Warheads(WarheadsArgs),
    /// List the cysteines of a receptor and potential disulfide bonds.
    Cysteines(CysteinesArgs),
    /// Convert a PDB receptor into a rigid PDBQT receptor.
    PrepareReceptor(PrepareReceptorArgs),
    /// Sanitize PDBQT text so the docking engine accepts it.
    Normalize(NormalizeArgs),
}

/// Arguments for the `dock` subcommand.
#[derive(Args, Debug, Clone)]
pub struct DockArgs {
    // --- Core Arguments ---
    /// Ligand SMILES. Can be given multiple times to dock several ligands.
    #[arg(short, long = "smiles", required = true, value_name = "SMILES", num_args(1..))]
    pub smiles: Vec<String>,

    /// Path to the receptor structure (PDB or PDBQT).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub receptor: PathBuf,

    /// Target residue for covalent docking, written CHAIN:NUMBER (e.g. A:145).
    #[arg(short, long, value_name = "CHAIN:NUMBER")]
    pub target: Option<ResidueSpecifier>,

    /// Directory for poses.csv and per-pose PDBQT files.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Engine Overrides ---
    /// Override the AutoDock Vina executable.
    #[arg(long, value_name = "PATH")]
    pub vina: Option<PathBuf>,

    /// Override the Open Babel executable.
    #[arg(long, value_name = "PATH")]
    pub obabel: Option<PathBuf>,

    /// Override the search exhaustiveness.
    #[arg(short, long, value_name = "INT")]
    pub exhaustiveness: Option<u32>,

    /// Override the number of poses requested from the engine.
    #[arg(short = 'n', long, value_name = "INT")]
    pub num_modes: Option<u32>,

    /// Override the per-process timeout, in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    // --- Scoring Overrides ---
    /// Override the covalent scoring policy.
    #[arg(short, long, value_name = "POLICY")]
    pub policy: Option<ScoringPolicy>,

    /// Keep each request's working directory after docking.
    #[arg(long)]
    pub keep_workdir: bool,

    /// Drop HETATM records (bound ligands, ions) from the receptor before conversion.
    #[arg(long)]
    pub remove_heteroatoms: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S engine.exhaustiveness=16
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `warheads` subcommand.
#[derive(Args, Debug)]
pub struct WarheadsArgs {
    /// SMILES strings to inspect.
    #[arg(required = true, value_name = "SMILES")]
    pub smiles: Vec<String>,

    /// Use a custom warhead catalogue (TOML) instead of the built-in one.
    #[arg(long, value_name = "PATH")]
    pub catalogue: Option<PathBuf>,
}

/// Arguments for the `cysteines` subcommand.
#[derive(Args, Debug)]
pub struct CysteinesArgs {
    /// Path to the receptor structure (PDB or PDBQT).
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,
}

/// Arguments for the `prepare-receptor` subcommand.
#[derive(Args, Debug)]
pub struct PrepareReceptorArgs {
    /// Path to the input PDB structure.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the rigid PDBQT receptor.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Override the Open Babel executable.
    #[arg(long, value_name = "PATH")]
    pub obabel: Option<PathBuf>,

    /// Drop HETATM records before conversion.
    #[arg(long)]
    pub remove_heteroatoms: bool,
}

/// Arguments for the `normalize` subcommand.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Path to the PDBQT text to sanitize.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Write the result here instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Whether the text is a flexible ligand or a rigid receptor.
    #[arg(long, value_enum, default_value_t = RoleArg::Ligand)]
    pub role: RoleArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleArg {
    Ligand,
    Receptor,
}

impl From<RoleArg> for StructureRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Ligand => StructureRole::Ligand,
            RoleArg::Receptor => StructureRole::Receptor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dock_arguments_parse_target_and_policy() {
        let cli = Cli::try_parse_from([
            "covadock", "-vv", "dock", "-s", "C=CC(=O)N", "-s", "CCO", "-r", "protein.pdb",
            "-t", "A:145", "-o", "out", "--policy", "logistic", "-S", "engine.num-modes=4",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Dock(args) = cli.command else {
            panic!("expected dock");
        };
        assert_eq!(args.smiles, vec!["C=CC(=O)N", "CCO"]);
        assert_eq!(args.target, Some(ResidueSpecifier::new('A', 145)));
        assert_eq!(args.policy, Some(ScoringPolicy::Logistic));
        assert_eq!(args.set_values, vec!["engine.num-modes=4"]);
    }

    #[test]
    fn malformed_target_is_rejected_by_the_parser() {
        let result = Cli::try_parse_from([
            "covadock", "dock", "-s", "CCO", "-r", "p.pdb", "-t", "145", "-o", "out",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["covadock", "-q", "-v", "cysteines", "p.pdb"]).is_err());
    }

    #[test]
    fn normalize_defaults_to_the_ligand_role() {
        let cli = Cli::try_parse_from(["covadock", "normalize", "in.pdbqt"]).unwrap();
        let Commands::Normalize(args) = cli.command else {
            panic!("expected normalize");
        };
        assert_eq!(StructureRole::from(args.role), StructureRole::Ligand);
        assert!(args.output.is_none());
    }
}
