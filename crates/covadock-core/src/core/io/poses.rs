use super::record::record_name;
use crate::core::models::pose::Pose;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One row of the engine's stdout score table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRow {
    pub mode: u32,
    pub affinity: f64,
    pub rmsd_lower_bound: f64,
    pub rmsd_upper_bound: f64,
}

/// One `MODEL`..`ENDMDL` block of the engine's output file.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBlock {
    pub mode: u32,
    pub text: String,
}

impl ModelBlock {
    /// The `REMARK VINA RESULT:` values embedded in the block, if present.
    pub fn embedded_result(&self) -> Option<ScoreRow> {
        self.text.lines().find_map(|line| {
            let rest = line.trim_start().strip_prefix("REMARK VINA RESULT:")?;
            let values: Vec<f64> = rest
                .split_whitespace()
                .map_while(|t| t.parse::<f64>().ok())
                .collect();
            let affinity = *values.first()?;
            Some(ScoreRow {
                mode: self.mode,
                affinity,
                rmsd_lower_bound: values.get(1).copied().unwrap_or(0.0),
                rmsd_upper_bound: values.get(2).copied().unwrap_or(0.0),
            })
        })
    }
}

/// Disagreements between the score table and the coordinate blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationGap {
    /// Score rows whose mode has no coordinate block. These rows are dropped.
    pub rows_without_block: Vec<u32>,
    /// Coordinate blocks whose mode has no score row. These poses are kept.
    pub blocks_without_row: Vec<u32>,
    /// Modes that appeared more than once in either source; the first occurrence won.
    pub duplicate_modes: Vec<u32>,
}

impl CorrelationGap {
    pub fn is_empty(&self) -> bool {
        self.rows_without_block.is_empty()
            && self.blocks_without_row.is_empty()
            && self.duplicate_modes.is_empty()
    }
}

impl fmt::Display for CorrelationGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows without block {:?}, blocks without row {:?}, duplicate modes {:?}",
            self.rows_without_block, self.blocks_without_row, self.duplicate_modes
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPoses {
    /// Poses in ascending mode order.
    pub poses: Vec<Pose>,
    pub gap: Option<CorrelationGap>,
}

/// Parses the score table out of engine stdout.
///
/// Rows are read after the `-----+-----` separator when one is present, else from the
/// whole text. A row is any line whose first four whitespace-separated tokens are a mode
/// number followed by three numbers.
pub fn parse_score_table(stdout: &str) -> Vec<ScoreRow> {
    let lines: Vec<&str> = stdout.lines().collect();
    let start = lines
        .iter()
        .position(|l| l.trim_start().starts_with("-----+"))
        .map_or(0, |idx| idx + 1);

    lines[start..]
        .iter()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let mode = tokens.next()?.parse::<u32>().ok()?;
            let mut next_f64 = || tokens.next()?.parse::<f64>().ok().filter(|v| v.is_finite());
            Some(ScoreRow {
                mode,
                affinity: next_f64()?,
                rmsd_lower_bound: next_f64()?,
                rmsd_upper_bound: next_f64()?,
            })
        })
        .collect()
}

/// Splits engine output into `MODEL` blocks.
///
/// A block runs from its `MODEL` line through `ENDMDL`; a block cut short by the next
/// `MODEL` or by the end of the text is kept. A `MODEL` line without a readable number
/// takes the next sequential mode. Text with atoms but no `MODEL` markers is one block,
/// mode 1.
pub fn parse_model_blocks(text: &str) -> Vec<ModelBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<ModelBlock> = None;
    let mut sequence = 0u32;

    for line in text.lines() {
        match record_name(line) {
            "MODEL" => {
                blocks.extend(current.take());
                sequence += 1;
                let mode = line
                    .split_whitespace()
                    .nth(1)
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(sequence);
                current = Some(ModelBlock {
                    mode,
                    text: format!("{line}\n"),
                });
            }
            "ENDMDL" => {
                if let Some(mut block) = current.take() {
                    block.text.push_str(line);
                    block.text.push('\n');
                    blocks.push(block);
                }
            }
            _ => {
                if let Some(block) = current.as_mut() {
                    block.text.push_str(line);
                    block.text.push('\n');
                }
            }
        }
    }
    blocks.extend(current);

    if blocks.is_empty() && text.lines().any(super::record::is_atom_line) {
        blocks.push(ModelBlock {
            mode: 1,
            text: format!("MODEL 1\n{}ENDMDL\n", with_trailing_newline(text)),
        });
    }
    blocks
}

fn with_trailing_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

/// Correlates the stdout score table with the output file's coordinate blocks.
pub fn parse_poses(stdout: &str, output_text: &str) -> ParsedPoses {
    let mut gap = CorrelationGap::default();

    let mut rows: BTreeMap<u32, ScoreRow> = BTreeMap::new();
    for row in parse_score_table(stdout) {
        if rows.contains_key(&row.mode) {
            gap.duplicate_modes.push(row.mode);
        } else {
            rows.insert(row.mode, row);
        }
    }

    let mut blocks: BTreeMap<u32, ModelBlock> = BTreeMap::new();
    for block in parse_model_blocks(output_text) {
        if blocks.contains_key(&block.mode) {
            gap.duplicate_modes.push(block.mode);
        } else {
            blocks.insert(block.mode, block);
        }
    }

    let block_modes: HashSet<u32> = blocks.keys().copied().collect();
    gap.rows_without_block = rows
        .keys()
        .copied()
        .filter(|mode| !block_modes.contains(mode))
        .collect();

    let poses: Vec<Pose> = blocks
        .into_values()
        .map(|block| {
            let row = rows.get(&block.mode).copied().or_else(|| {
                gap.blocks_without_row.push(block.mode);
                block.embedded_result()
            });
            let mut pose = Pose::new(block.mode, block.text);
            if let Some(row) = row {
                pose.affinity = Some(row.affinity);
                pose.rmsd_lower_bound = Some(row.rmsd_lower_bound);
                pose.rmsd_upper_bound = Some(row.rmsd_upper_bound);
            }
            pose
        })
        .collect();

    gap.duplicate_modes.sort_unstable();
    gap.duplicate_modes.dedup();

    let gap = if gap.is_empty() {
        None
    } else {
        warn!(%gap, "Score table and coordinate blocks disagree");
        Some(gap)
    };

    ParsedPoses { poses, gap }
}

/// Writes each pose's coordinate block to `pose_<mode>.pdbqt` under `dir`.
pub fn write_pose_files(poses: &[Pose], dir: &Path) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    poses
        .iter()
        .map(|pose| {
            let path = dir.join(format!("pose_{}.pdbqt", pose.mode));
            fs::write(&path, &pose.coordinates)?;
            Ok(path)
        })
        .collect()
}
