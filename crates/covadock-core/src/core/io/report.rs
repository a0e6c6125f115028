use crate::core::models::pose::Pose;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct PoseRow<'a> {
    ligand: &'a str,
    mode: u32,
    affinity: Option<f64>,
    rmsd_lb: Option<f64>,
    rmsd_ub: Option<f64>,
    distance_to_target: Option<f64>,
    covalent_score: Option<f64>,
    prediction: Option<&'static str>,
    is_covalent: Option<bool>,
    confidence: Option<f64>,
}

/// Writes one CSV row per pose, for any number of ligands, under a single header.
pub struct PoseTableWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl PoseTableWriter<File> {
    pub fn create(path: &Path) -> Result<Self, ReportError> {
        let file = File::create(path).map_err(|e| ReportError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(Self::new(file))
    }
}

impl<W: Write> PoseTableWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn write_poses(&mut self, ligand: &str, poses: &[Pose]) -> Result<(), ReportError> {
        for pose in poses {
            self.writer.serialize(PoseRow {
                ligand,
                mode: pose.mode,
                affinity: pose.affinity,
                rmsd_lb: pose.rmsd_lower_bound,
                rmsd_ub: pose.rmsd_upper_bound,
                distance_to_target: pose.distance_to_target,
                covalent_score: pose.covalent_score,
                prediction: pose.covalent_prediction.map(|p| p.as_str()),
                is_covalent: pose.assessment.as_ref().map(|a| a.is_covalent),
                confidence: pose.assessment.as_ref().map(|a| a.confidence),
            })?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<W, ReportError> {
        self.writer.flush().map_err(csv::Error::from)?;
        self.writer
            .into_inner()
            .map_err(|e| ReportError::Csv(csv::Error::from(e.into_error())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::covalent::{CovalentPrediction, CovalentScorer};

    #[test]
    fn writes_header_and_one_row_per_pose() {
        let mut scored = Pose::new(1, "MODEL 1\nENDMDL\n".into());
        scored.affinity = Some(-8.0);
        scored.distance_to_target = Some(4.0);
        scored.covalent_score = Some(5.333);
        scored.covalent_prediction = Some(CovalentPrediction::Likely);
        scored.assessment = Some(CovalentScorer::assess(true, 4.0, -8.0));
        let unscored = Pose::new(2, "MODEL 2\nENDMDL\n".into());

        let mut table = PoseTableWriter::new(Vec::new());
        table.write_poses("C=CC(=O)N", &[scored, unscored]).unwrap();
        let text = String::from_utf8(table.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "ligand,mode,affinity,rmsd_lb,rmsd_ub,distance_to_target,covalent_score,prediction,is_covalent,confidence"
        );
        assert_eq!(lines[1], "C=CC(=O)N,1,-8.0,,,4.0,5.333,likely,true,0.95");
        assert_eq!(lines[2], "C=CC(=O)N,2,,,,,,,,");
    }
}
