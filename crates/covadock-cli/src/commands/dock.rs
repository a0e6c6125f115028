use crate::cli::DockArgs;
use crate::config::{AppConfig, build_config};
use crate::error::{CliError, Result};
use crate::utils::process::TimedProcess;
use crate::utils::progress::CliProgressHandler;
use covadock::{
    core::{
        io::{poses::write_pose_files, report::PoseTableWriter},
        warheads::catalogue::WarheadCatalogue,
    },
    engine::{
        error::EngineError,
        progress::{Progress, ProgressReporter},
        toolkit::OpenBabel,
        vina::VinaRunner,
    },
    workflows::{
        self,
        dock::{Capabilities, DockingResult},
    },
};
use rayon::prelude::*;
use std::path::Path;
use tracing::{error, info, warn};

type LigandOutcome = (String, std::result::Result<DockingResult, EngineError>);

pub async fn run(args: DockArgs) -> Result<()> {
    let app = build_config(&args)?;

    if !args.receptor.is_file() {
        return Err(CliError::Argument(format!(
            "Receptor file does not exist: {}",
            args.receptor.display()
        )));
    }

    let custom_catalogue = app
        .catalogue_path
        .as_deref()
        .map(WarheadCatalogue::load)
        .transpose()
        .map_err(|e| CliError::Config(e.to_string()))?;
    let catalogue = custom_catalogue
        .as_ref()
        .unwrap_or_else(|| WarheadCatalogue::global());
    info!(patterns = catalogue.len(), "Warhead catalogue ready");

    let process = TimedProcess::new(tokio::runtime::Handle::current(), app.timeout);
    let toolkit = OpenBabel::new(&app.obabel_path, &process);
    let capabilities = Capabilities::new(&process, &toolkit).with_catalogue(catalogue);

    let outcomes = tokio::task::block_in_place(|| -> Result<Vec<LigandOutcome>> {
        let version = VinaRunner::new(&app.pipeline.vina_path, &process).check_available()?;
        info!(%version, "Found AutoDock Vina");
        match toolkit.check_available() {
            Ok(version) => info!(%version, "Found Open Babel"),
            Err(e) => warn!(error = %e, "Open Babel is not usable; ligand embedding will fail"),
        }
        Ok(dock_all(&args, &app, capabilities))
    })?;

    write_outputs(&args.output, outcomes)
}

fn dock_all(args: &DockArgs, app: &AppConfig, capabilities: Capabilities<'_>) -> Vec<LigandOutcome> {
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    if let [smiles] = args.smiles.as_slice() {
        println!("Docking {} ...", smiles);
        return vec![dock_one(smiles, args, app, capabilities, &reporter)];
    }

    println!("Docking {} ligands ...", args.smiles.len());
    reporter.report(Progress::BatchStart {
        total: args.smiles.len() as u64,
    });
    let silent = ProgressReporter::new();
    let outcomes = args
        .smiles
        .par_iter()
        .map(|smiles| {
            let outcome = dock_one(smiles, args, app, capabilities, &silent);
            reporter.report(Progress::BatchAdvance);
            outcome
        })
        .collect();
    reporter.report(Progress::BatchFinish);
    outcomes
}

fn dock_one(
    smiles: &str,
    args: &DockArgs,
    app: &AppConfig,
    capabilities: Capabilities<'_>,
    reporter: &ProgressReporter,
) -> LigandOutcome {
    let result = workflows::dock::run(
        smiles,
        &args.receptor,
        args.target,
        &app.pipeline,
        capabilities,
        reporter,
    );
    (smiles.to_string(), result)
}

fn write_outputs(output: &Path, outcomes: Vec<LigandOutcome>) -> Result<()> {
    std::fs::create_dir_all(output)?;
    let table_path = output.join("poses.csv");
    let mut table = PoseTableWriter::create(&table_path)?;

    let total = outcomes.len();
    let mut last_error = None;
    let mut succeeded = 0usize;

    for (index, (smiles, outcome)) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(result) => {
                table.write_poses(&smiles, &result.poses)?;
                let pose_dir = output.join(format!("ligand_{}", index + 1));
                write_pose_files(&result.poses, &pose_dir)?;
                print_summary(index + 1, &result, &pose_dir);
                succeeded += 1;
            }
            Err(e) => {
                error!(%smiles, error = %e, "Docking failed");
                eprintln!("✗ Ligand {} ({}) failed: {}", index + 1, smiles, e);
                last_error = Some(e);
            }
        }
    }
    table.finish()?;

    info!(succeeded, total, "Docking run finished");
    match last_error {
        Some(e) if succeeded == 0 => Err(e.into()),
        _ => {
            println!(
                "{}/{} ligand(s) docked. Pose table written to: {}",
                succeeded,
                total,
                table_path.display()
            );
            Ok(())
        }
    }
}

fn print_summary(index: usize, result: &DockingResult, pose_dir: &Path) {
    println!("✓ Ligand {}: {}", index, result.smiles);
    let warheads = if result.has_warhead {
        result
            .warheads
            .iter()
            .map(|w| w.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        "none".to_string()
    };
    println!("  Warheads:           {}", warheads);
    if let Some(target) = &result.target {
        println!(
            "  Target:             {} {} ({})",
            target.residue_name, target.spec, target.atom_name
        );
    }
    println!("  Covalent potential: {}", result.covalent_potential);
    if let Some(best) = result.best_pose() {
        let affinity = best.affinity.unwrap_or_default();
        match (best.distance_to_target, best.covalent_score) {
            (Some(distance), Some(score)) => println!(
                "  Best pose:          mode {} ({:.2} kcal/mol, {:.2} Å, score {:.3})",
                best.mode, affinity, distance, score
            ),
            _ => println!(
                "  Best pose:          mode {} ({:.2} kcal/mol)",
                best.mode, affinity
            ),
        }
    }
    if let Some(gap) = &result.correlation_gap {
        warn!(?gap, "Score table and coordinate blocks disagree");
    }
    println!(
        "  Poses:              {} written to {}",
        result.poses.len(),
        pose_dir.display()
    );
    if let Some(workdir) = &result.workdir {
        println!("  Working directory:  {}", workdir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covadock::core::models::pose::Pose;
    use covadock::engine::config::DockingBox;
    use covadock::engine::ligand::LigandTier;
    use covadock::workflows::dock::CovalentPotential;
    use std::fs;
    use tempfile::tempdir;

    fn docked(smiles: &str) -> DockingResult {
        let pose = Pose {
            affinity: Some(-7.5),
            ..Pose::new(1, "MODEL 1\nENDMDL\n".to_string())
        };
        DockingResult {
            smiles: smiles.to_string(),
            poses: vec![pose],
            has_warhead: false,
            warheads: vec![],
            best_affinity: Some(-7.5),
            covalent_potential: CovalentPotential::NoWarhead,
            docking_box: DockingBox::default(),
            target: None,
            ligand_tier: LigandTier::DirectWriter,
            correlation_gap: None,
            workdir: None,
        }
    }

    #[test]
    fn partial_failures_still_write_the_successful_ligands() {
        let dir = tempdir().unwrap();
        let outcomes = vec![
            ("CCO".to_string(), Ok(docked("CCO"))),
            ("C=CC(=O)N".to_string(), Err(EngineError::NoPoses)),
        ];
        write_outputs(dir.path(), outcomes).unwrap();

        let table = fs::read_to_string(dir.path().join("poses.csv")).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ligand,mode,affinity"));
        assert!(lines[1].starts_with("CCO,1,-7.5"));
        assert!(dir.path().join("ligand_1/pose_1.pdbqt").is_file());
        assert!(!dir.path().join("ligand_2").exists());
    }

    #[test]
    fn all_ligands_failing_is_an_error() {
        let dir = tempdir().unwrap();
        let outcomes = vec![("CCO".to_string(), Err(EngineError::NoPoses))];
        assert!(matches!(
            write_outputs(dir.path(), outcomes),
            Err(CliError::Covadock(EngineError::NoPoses))
        ));
    }
}
