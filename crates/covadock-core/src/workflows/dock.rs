use crate::core::io::poses::{CorrelationGap, parse_poses};
use crate::core::models::pose::Pose;
use crate::core::scoring::covalent::{CovalentPrediction, CovalentScorer};
use crate::core::utils::geometry::min_distance;
use crate::core::warheads::catalogue::WarheadCatalogue;
use crate::core::warheads::detector::{WarheadDetector, WarheadMatch, WarheadReport};
use crate::engine::config::{DockingBox, DockingConfigBuilder, PipelineConfig, ResidueSpecifier};
use crate::engine::error::EngineError;
use crate::engine::ligand::{AtomCorrelation, LigandPreparer, LigandTier, PreparedLigand};
use crate::engine::process::ExternalProcess;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::receptor::{ReceptorPreparer, read_structure};
use crate::engine::state::{DockingStage, StageTracker};
use crate::engine::target::{TargetSite, locate_target};
use crate::engine::toolkit::{ChemistryToolkit, NativeToolkit};
use crate::engine::vina::VinaRunner;
use crate::engine::workspace::RequestWorkspace;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// The external capabilities a docking request runs on.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    pub process: &'a dyn ExternalProcess,
    pub toolkit: &'a dyn ChemistryToolkit,
    pub catalogue: &'a WarheadCatalogue,
}

impl<'a> Capabilities<'a> {
    /// Capabilities using the built-in warhead catalogue.
    pub fn new(process: &'a dyn ExternalProcess, toolkit: &'a dyn ChemistryToolkit) -> Self {
        Self {
            process,
            toolkit,
            catalogue: WarheadCatalogue::global(),
        }
    }

    pub fn with_catalogue(mut self, catalogue: &'a WarheadCatalogue) -> Self {
        self.catalogue = catalogue;
        self
    }
}

/// Overall verdict for a docked ligand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CovalentPotential {
    /// The ligand carries no recognised warhead.
    NoWarhead,
    /// A warhead is present but no pose could be scored against a target.
    Unassessed,
    /// At least one pose is predicted to react.
    Likely,
    Unlikely,
}

impl CovalentPotential {
    pub fn as_str(&self) -> &'static str {
        match self {
            CovalentPotential::NoWarhead => "no-warhead",
            CovalentPotential::Unassessed => "unassessed",
            CovalentPotential::Likely => "likely",
            CovalentPotential::Unlikely => "unlikely",
        }
    }

    fn classify(has_warhead: bool, poses: &[Pose]) -> Self {
        if !has_warhead {
            return CovalentPotential::NoWarhead;
        }
        let scored: Vec<&Pose> = poses.iter().filter(|p| p.is_scored()).collect();
        if scored.is_empty() {
            CovalentPotential::Unassessed
        } else if scored
            .iter()
            .any(|p| p.covalent_prediction == Some(CovalentPrediction::Likely))
        {
            CovalentPotential::Likely
        } else {
            CovalentPotential::Unlikely
        }
    }
}

impl fmt::Display for CovalentPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct DockingResult {
    pub smiles: String,
    /// Poses in ascending mode order.
    pub poses: Vec<Pose>,
    pub has_warhead: bool,
    pub warheads: Vec<WarheadMatch>,
    /// The most negative affinity over all poses.
    pub best_affinity: Option<f64>,
    pub covalent_potential: CovalentPotential,
    pub docking_box: DockingBox,
    pub target: Option<TargetSite>,
    pub ligand_tier: LigandTier,
    pub correlation_gap: Option<CorrelationGap>,
    /// The kept working directory, when the configuration asks to keep it.
    pub workdir: Option<PathBuf>,
}

impl DockingResult {
    pub fn best_pose(&self) -> Option<&Pose> {
        self.poses
            .iter()
            .filter_map(|p| p.affinity.map(|affinity| (p, affinity)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(pose, _)| pose)
    }
}

/// Docks one ligand, given as SMILES, against one receptor.
///
/// When `target` is given the box is recentered on the target nucleophile and poses are
/// scored for covalent potential. A target residue missing from the receptor is not fatal:
/// the request docks in the default box and leaves the poses unscored.
#[instrument(skip_all, name = "docking_workflow", fields(smiles = %smiles))]
pub fn run(
    smiles: &str,
    receptor: &Path,
    target: Option<ResidueSpecifier>,
    config: &PipelineConfig,
    capabilities: Capabilities<'_>,
    reporter: &ProgressReporter,
) -> Result<DockingResult, EngineError> {
    let mut stages = StageTracker::new();
    let session = DockingSession {
        smiles,
        receptor,
        target,
        config,
        capabilities,
        reporter,
    };
    let result = session.execute(&mut stages);
    if let Err(e) = &result {
        warn!(stage = stages.current().name(), error = %e, "Docking request failed");
        stages.fail();
    }
    result
}

struct DockingSession<'a> {
    smiles: &'a str,
    receptor: &'a Path,
    target: Option<ResidueSpecifier>,
    config: &'a PipelineConfig,
    capabilities: Capabilities<'a>,
    reporter: &'a ProgressReporter<'a>,
}

impl DockingSession<'_> {
    fn execute(&self, stages: &mut StageTracker) -> Result<DockingResult, EngineError> {
        let workspace = RequestWorkspace::create(self.config.scratch_root.as_deref())?;
        info!(workdir = %workspace.path().display(), "Starting docking request");

        // === Phase 1: Receptor preparation and target resolution ===
        let receptor_path = workspace.file("receptor.pdbqt");
        let (target, docking_box) = self.reporter.phase("Preparing Receptor", || -> Result<_, EngineError> {
            ReceptorPreparer::new(self.capabilities.toolkit, &NativeToolkit)
                .remove_heteroatoms(self.config.remove_heteroatoms)
                .prepare(self.receptor, &receptor_path)?;
            self.resolve_target()
        })?;
        stages.advance(DockingStage::ProteinReady)?;

        // === Phase 2: Ligand embedding and preparation ===
        let ligand_path = workspace.file("ligand.pdbqt");
        let prepared = self.reporter.phase("Preparing Ligand", || {
            self.prepare_ligand(workspace.path(), &ligand_path)
        })?;
        stages.advance(DockingStage::LigandPrepared)?;

        // === Phase 3: Docking ===
        let run = self.reporter.phase("Docking", || -> Result<_, EngineError> {
            let docking_config = DockingConfigBuilder::new()
                .receptor(receptor_path.clone())
                .ligand(prepared.path.clone())
                .docking_box(docking_box)
                .exhaustiveness(self.config.exhaustiveness)
                .num_modes(self.config.num_modes)
                .build()?;
            VinaRunner::new(&self.config.vina_path, self.capabilities.process)
                .run(&docking_config, workspace.path())
        })?;
        stages.advance(DockingStage::Docked)?;

        // === Phase 4: Pose parsing ===
        let parsed = parse_poses(&run.stdout, &run.output_text()?);
        if parsed.poses.is_empty() {
            return Err(EngineError::NoPoses);
        }
        info!(poses = parsed.poses.len(), "Parsed docking poses");
        stages.advance(DockingStage::Parsed)?;

        // === Phase 5: Warhead detection and covalent scoring ===
        let mut poses = parsed.poses;
        let report = self.reporter.phase("Scoring", || {
            let report = self.detect_warheads();
            if let Some(report) = &report {
                score_poses(
                    &mut poses,
                    report,
                    &prepared.correlation,
                    target.as_ref(),
                    &CovalentScorer::new(self.config.scoring_policy),
                );
            }
            report
        });
        stages.advance(DockingStage::Scored)?;

        // === Phase 6: Assemble result ===
        let has_warhead = report.as_ref().is_some_and(|r| r.has_warhead);
        let covalent_potential = match &report {
            Some(_) => CovalentPotential::classify(has_warhead, &poses),
            None => CovalentPotential::Unassessed,
        };
        let best_affinity = poses
            .iter()
            .filter_map(|p| p.affinity)
            .min_by(f64::total_cmp);
        let workdir = if self.config.keep_workdir {
            Some(workspace.persist())
        } else {
            None
        };
        stages.advance(DockingStage::Done)?;

        info!(
            %covalent_potential,
            best_affinity = ?best_affinity,
            "Docking request complete"
        );
        Ok(DockingResult {
            smiles: self.smiles.to_string(),
            poses,
            has_warhead,
            warheads: report.map(|r| r.matches).unwrap_or_default(),
            best_affinity,
            covalent_potential,
            docking_box,
            target,
            ligand_tier: prepared.tier,
            correlation_gap: parsed.gap,
            workdir,
        })
    }

    fn resolve_target(&self) -> Result<(Option<TargetSite>, DockingBox), EngineError> {
        let Some(spec) = self.target else {
            return Ok((None, self.config.default_box));
        };

        let structure = read_structure(self.receptor)?;
        match locate_target(&structure, spec, &self.config.target_atom_name) {
            Ok(site) => {
                let docking_box = site.docking_box(self.config.covalent_box_edge)?;
                info!(
                    target = %spec,
                    atom = %site.atom_name,
                    center = ?[site.position.x, site.position.y, site.position.z],
                    "Docking box centred on target"
                );
                Ok((Some(site), docking_box))
            }
            Err(EngineError::MissingTargetResidue { spec }) => {
                warn!(target = %spec, "Target residue not found; docking in the default box without covalent scoring");
                self.reporter.report(Progress::Message(format!(
                    "Target residue {spec} not found; poses will not be scored"
                )));
                Ok((None, self.config.default_box))
            }
            Err(e) => Err(e),
        }
    }

    fn prepare_ligand(&self, workdir: &Path, output: &Path) -> Result<PreparedLigand, EngineError> {
        let molecule = self
            .capabilities
            .toolkit
            .embed(self.smiles, &self.config.embed, workdir)
            .map_err(|e| EngineError::ConversionFailure {
                molecule: self.smiles.to_string(),
                tier: "3d-embedding".to_string(),
                reason: e.to_string(),
            })?;
        debug!(atoms = molecule.len(), heavy_atoms = molecule.heavy_atom_count(), "Embedded ligand");
        LigandPreparer::new(self.capabilities.toolkit).prepare(&molecule, output)
    }

    /// `None` when the SMILES cannot be read in-process; scoring is then skipped.
    fn detect_warheads(&self) -> Option<WarheadReport> {
        match WarheadDetector::with_catalogue(self.capabilities.catalogue).detect_smiles(self.smiles) {
            Ok(report) => {
                info!(warheads = ?report.names(), "Warhead detection finished");
                Some(report)
            }
            Err(e) => {
                warn!(error = %e, "Warhead detection failed; skipping covalent scoring");
                None
            }
        }
    }
}

/// Fills the covalent fields of every pose.
///
/// Without a warhead every pose is "unlikely". With a warhead, a pose is scored only when a
/// target is known and at least one reactive atom maps to a pose atom.
fn score_poses(
    poses: &mut [Pose],
    report: &WarheadReport,
    correlation: &AtomCorrelation,
    target: Option<&TargetSite>,
    scorer: &CovalentScorer,
) {
    if !report.has_warhead {
        for pose in poses.iter_mut() {
            pose.covalent_prediction = Some(CovalentPrediction::Unlikely);
            pose.assessment = Some(CovalentScorer::assess(false, 0.0, 0.0));
        }
        return;
    }
    let Some(target) = target else {
        return;
    };

    let reactive: Vec<usize> = report
        .reactive_atoms()
        .into_iter()
        .filter_map(|idx| correlation.get(idx))
        .collect();
    if reactive.is_empty() {
        warn!("No reactive atom maps onto the prepared ligand; poses left unscored");
        return;
    }

    for pose in poses.iter_mut() {
        let positions = pose.atom_positions();
        let Some(distance) = min_distance(
            reactive.iter().filter_map(|&ordinal| positions.get(ordinal)),
            &target.position,
        ) else {
            debug!(mode = pose.mode, "Pose is missing the reactive atoms; left unscored");
            continue;
        };
        pose.distance_to_target = Some(distance);

        let Some(affinity) = pose.affinity else {
            continue;
        };
        let score = scorer.score(affinity, distance);
        pose.covalent_score = Some(score.score);
        pose.covalent_prediction = Some(scorer.predict(&score, true));
        pose.assessment = Some(CovalentScorer::assess(true, distance, affinity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::record::format_pdbqt_line;
    use crate::core::models::atom::AtomRecord;
    use crate::core::models::molecule::Molecule;
    use crate::core::scoring::covalent::ScoringPolicy;
    use crate::engine::config::PipelineConfigBuilder;
    use crate::engine::process::testing::{ScriptedProcess, exit, flag_value};
    use crate::engine::toolkit::{ConversionOptions, EmbedOptions, ToolkitError};
    use nalgebra::Point3;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::{TempDir, tempdir};

    const RECEPTOR: &str = "\
ATOM      1  N   CYS A 145      -1.000   0.000   0.000  1.00  0.00           N
ATOM      2  CA  CYS A 145      -1.000   1.000   0.000  1.00  0.00           C
ATOM      3  SG  CYS A 145       0.000   0.000   0.000  1.00  0.00           S
ATOM      4  N   GLY A 146      -5.000   0.000   0.000  1.00  0.00           N
END
";

    /// Embeds to fixed coordinates and converts in-process.
    struct FixedToolkit {
        atoms: Vec<(&'static str, Point3<f64>)>,
    }

    impl ChemistryToolkit for FixedToolkit {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn embed(&self, smiles: &str, _: &EmbedOptions, _: &Path) -> Result<Molecule, ToolkitError> {
            let atoms = self
                .atoms
                .iter()
                .enumerate()
                .map(|(i, (element, position))| {
                    AtomRecord::new(i + 1, &format!("{element}{}", i + 1), element, *position)
                })
                .collect();
            Ok(Molecule::new(smiles, atoms))
        }

        fn convert(&self, input: &Path, output: &Path, options: &ConversionOptions) -> Result<(), ToolkitError> {
            NativeToolkit.convert(input, output, options)
        }
    }

    /// Points on a sphere of `radius` around the target sulfur at the origin.
    fn on_sphere(elements: &[&'static str], radius: f64) -> Vec<(&'static str, Point3<f64>)> {
        let directions = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        elements
            .iter()
            .zip(directions.iter().cycle())
            .map(|(e, d)| (*e, Point3::from(d.coords * radius)))
            .collect()
    }

    fn vina_output(atoms: &[(&'static str, Point3<f64>)], modes: &[u32]) -> String {
        let mut text = String::new();
        for mode in modes {
            text.push_str(&format!("MODEL {mode}\n"));
            for (i, (element, position)) in atoms.iter().enumerate() {
                let atom = AtomRecord::new(i + 1, &format!("{element}{}", i + 1), element, *position);
                text.push_str(&format_pdbqt_line(&atom, 0.0, element));
                text.push('\n');
            }
            text.push_str("ENDMDL\n");
        }
        text
    }

    fn vina_stdout(affinities: &[f64]) -> String {
        let mut out = String::from("mode |   affinity | dist from best mode\n-----+------------+----------+----------\n");
        for (i, affinity) in affinities.iter().enumerate() {
            out.push_str(&format!("   {}       {affinity:.1}      0.000      0.000\n", i + 1));
        }
        out
    }

    fn vina_process(pose_atoms: Vec<(&'static str, Point3<f64>)>, affinities: Vec<f64>) -> ScriptedProcess {
        ScriptedProcess::new(move |inv| {
            let modes: Vec<u32> = (1..=affinities.len() as u32).collect();
            fs::write(flag_value(inv, "--out").unwrap(), vina_output(&pose_atoms, &modes)).unwrap();
            exit(0, &vina_stdout(&affinities), "")
        })
    }

    struct Fixture {
        dir: TempDir,
        receptor: PathBuf,
        config: PipelineConfig,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let receptor = dir.path().join("protein.pdb");
        fs::write(&receptor, RECEPTOR).unwrap();
        let config = PipelineConfigBuilder::new()
            .scratch_root(dir.path().join("scratch"))
            .build()
            .unwrap();
        Fixture {
            dir,
            receptor,
            config,
        }
    }

    const ACRYLAMIDE: [&str; 5] = ["C", "C", "C", "O", "N"];

    fn dock(
        fx: &Fixture,
        smiles: &str,
        target: Option<ResidueSpecifier>,
        toolkit: &FixedToolkit,
        process: &ScriptedProcess,
    ) -> Result<DockingResult, EngineError> {
        run(
            smiles,
            &fx.receptor,
            target,
            &fx.config,
            Capabilities::new(process, toolkit),
            &ProgressReporter::new(),
        )
    }

    #[test]
    fn acrylamide_near_the_target_is_likely() {
        let fx = fixture();
        let toolkit = FixedToolkit {
            atoms: on_sphere(&ACRYLAMIDE, 10.0),
        };
        let process = vina_process(on_sphere(&ACRYLAMIDE, 4.0), vec![-8.0]);
        let result = dock(&fx, "C=CC(=O)N", Some(ResidueSpecifier::new('A', 145)), &toolkit, &process).unwrap();

        assert!(result.has_warhead);
        assert!(result.warheads.iter().any(|m| m.name == "acrylamide"));
        assert_eq!(result.ligand_tier, LigandTier::PlainConversion);
        assert_eq!(result.docking_box.center(), Point3::origin());
        assert_eq!(result.docking_box.size().x, 15.0);
        assert_eq!(result.target.as_ref().unwrap().atom_name, "SG");

        let pose = &result.poses[0];
        assert!((pose.distance_to_target.unwrap() - 4.0).abs() < 1e-9);
        assert!((pose.covalent_score.unwrap() - 0.8 * (4.0 / 6.0) * 10.0).abs() < 1e-9);
        assert_eq!(pose.covalent_prediction, Some(CovalentPrediction::Likely));
        assert!(pose.assessment.as_ref().unwrap().is_covalent);
        assert_eq!(result.covalent_potential, CovalentPotential::Likely);
        assert_eq!(result.best_affinity, Some(-8.0));
        assert_eq!(process.program_names(), vec!["vina"]);
    }

    #[test]
    fn acrylamide_far_from_the_target_is_unlikely() {
        let fx = fixture();
        let toolkit = FixedToolkit {
            atoms: on_sphere(&ACRYLAMIDE, 10.0),
        };
        let process = vina_process(on_sphere(&ACRYLAMIDE, 9.0), vec![-8.0, -7.5]);
        let result = dock(&fx, "C=CC(=O)N", Some(ResidueSpecifier::new('A', 145)), &toolkit, &process).unwrap();

        assert_eq!(result.poses.len(), 2);
        for pose in &result.poses {
            assert_eq!(pose.covalent_prediction, Some(CovalentPrediction::Unlikely));
            assert!(!pose.assessment.as_ref().unwrap().is_covalent);
        }
        assert_eq!(result.covalent_potential, CovalentPotential::Unlikely);
    }

    #[test]
    fn ligand_without_warhead_is_always_unlikely() {
        let fx = fixture();
        let atoms = on_sphere(&["C", "C", "O"], 3.0);
        let toolkit = FixedToolkit { atoms: atoms.clone() };
        let process = vina_process(atoms, vec![-9.5]);
        let result = dock(&fx, "CCO", Some(ResidueSpecifier::new('A', 145)), &toolkit, &process).unwrap();

        assert!(!result.has_warhead);
        assert!(result.warheads.is_empty());
        assert_eq!(result.covalent_potential, CovalentPotential::NoWarhead);
        let pose = &result.poses[0];
        assert_eq!(pose.covalent_prediction, Some(CovalentPrediction::Unlikely));
        assert_eq!(pose.distance_to_target, None);
        assert_eq!(pose.covalent_score, None);
    }

    #[test]
    fn missing_target_residue_docks_in_the_default_box_unscored() {
        let fx = fixture();
        let toolkit = FixedToolkit {
            atoms: on_sphere(&ACRYLAMIDE, 10.0),
        };
        let process = vina_process(on_sphere(&ACRYLAMIDE, 4.0), vec![-8.0]);
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            if let Progress::Message(m) = event {
                sink.lock().unwrap().push(m);
            }
        }));

        let result = run(
            "C=CC(=O)N",
            &fx.receptor,
            Some(ResidueSpecifier::new('B', 7)),
            &fx.config,
            Capabilities::new(&process, &toolkit),
            &reporter,
        )
        .unwrap();

        assert!(result.target.is_none());
        assert_eq!(result.docking_box, DockingBox::default());
        assert!(result.poses.iter().all(|p| !p.is_scored() && p.distance_to_target.is_none()));
        assert_eq!(result.covalent_potential, CovalentPotential::Unassessed);
        assert!(messages.lock().unwrap()[0].contains("B:7"));
    }

    #[test]
    fn engine_failure_is_fatal_and_cleans_the_workspace() {
        let fx = fixture();
        let toolkit = FixedToolkit {
            atoms: on_sphere(&ACRYLAMIDE, 10.0),
        };
        let process = ScriptedProcess::new(|_| exit(1, "", "Parse error on line 1"));
        let err = dock(&fx, "C=CC(=O)N", None, &toolkit, &process).unwrap_err();
        match err {
            EngineError::DockingEngineFailure { receptor, ligand, exit_code, .. } => {
                assert_eq!(exit_code, Some(1));
                assert!(receptor.ends_with("receptor.pdbqt"));
                assert!(ligand.ends_with("ligand.pdbqt"));
            }
            other => panic!("unexpected error: {other}"),
        }
        let leftover = fs::read_dir(fx.dir.path().join("scratch")).unwrap().count();
        assert_eq!(leftover, 0);
    }

    #[test]
    fn clean_exit_with_empty_output_is_an_engine_failure() {
        let fx = fixture();
        let toolkit = FixedToolkit {
            atoms: on_sphere(&ACRYLAMIDE, 10.0),
        };
        let process = ScriptedProcess::new(|inv| {
            fs::write(flag_value(inv, "--out").unwrap(), "").unwrap();
            exit(0, "", "")
        });
        assert!(matches!(
            dock(&fx, "C=CC(=O)N", None, &toolkit, &process),
            Err(EngineError::DockingEngineFailure { .. })
        ));
    }

    #[test]
    fn output_without_poses_is_rejected() {
        let fx = fixture();
        let toolkit = FixedToolkit {
            atoms: on_sphere(&ACRYLAMIDE, 10.0),
        };
        let process = ScriptedProcess::new(|inv| {
            fs::write(flag_value(inv, "--out").unwrap(), "REMARK nothing docked\n").unwrap();
            exit(0, "", "")
        });
        assert!(matches!(
            dock(&fx, "C=CC(=O)N", None, &toolkit, &process),
            Err(EngineError::NoPoses)
        ));
    }

    #[test]
    fn logistic_policy_and_kept_workdir() {
        let mut fx = fixture();
        fx.config = PipelineConfigBuilder::new()
            .scratch_root(fx.dir.path().join("scratch"))
            .scoring_policy(ScoringPolicy::Logistic)
            .keep_workdir(true)
            .build()
            .unwrap();
        let toolkit = FixedToolkit {
            atoms: on_sphere(&ACRYLAMIDE, 10.0),
        };
        let process = vina_process(on_sphere(&ACRYLAMIDE, 4.0), vec![-2.0]);
        let result = dock(&fx, "C=CC(=O)N", Some(ResidueSpecifier::new('A', 145)), &toolkit, &process).unwrap();

        // Logistic at 4 Å is 0.5; exp(1) for -2 kcal/mol.
        let expected = 0.5 * 1.0f64.exp() * 10.0;
        assert!((result.poses[0].covalent_score.unwrap() - expected).abs() < 1e-9);
        let workdir = result.workdir.unwrap();
        assert!(workdir.join("config.txt").exists());
        assert!(workdir.join("receptor.pdbqt").exists());
    }

    #[test]
    fn unmapped_reactive_atoms_leave_poses_unscored() {
        let mut pose = Pose::new(1, vina_output(&on_sphere(&ACRYLAMIDE, 4.0), &[1]));
        pose.affinity = Some(-8.0);
        let mut poses = vec![pose];
        let report = WarheadDetector::new().detect_smiles("C=CC(=O)N").unwrap();
        let site = TargetSite {
            spec: ResidueSpecifier::new('A', 1),
            residue_name: "CYS".into(),
            atom_name: "SG".into(),
            position: Point3::origin(),
        };
        score_poses(
            &mut poses,
            &report,
            &AtomCorrelation::from_map(vec![None; 5]),
            Some(&site),
            &CovalentScorer::default(),
        );
        assert_eq!(poses[0].distance_to_target, None);
        assert!(!poses[0].is_scored());
    }

    #[test]
    fn classification_prefers_any_likely_pose() {
        let mut likely = Pose::new(1, String::new());
        likely.covalent_score = Some(6.0);
        likely.covalent_prediction = Some(CovalentPrediction::Likely);
        let mut unlikely = Pose::new(2, String::new());
        unlikely.covalent_score = Some(1.0);
        unlikely.covalent_prediction = Some(CovalentPrediction::Unlikely);

        assert_eq!(
            CovalentPotential::classify(true, &[unlikely.clone(), likely]),
            CovalentPotential::Likely
        );
        assert_eq!(CovalentPotential::classify(true, &[unlikely]), CovalentPotential::Unlikely);
        assert_eq!(CovalentPotential::classify(true, &[Pose::new(1, String::new())]), CovalentPotential::Unassessed);
        assert_eq!(CovalentPotential::classify(false, &[]), CovalentPotential::NoWarhead);
    }
}
