use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::DockArgs;
use crate::error::{CliError, Result};
use covadock::engine::config as core_config;
use directories::ProjectDirs;
use nalgebra::{Point3, Vector3};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Where per-request working directories go when neither the flags nor the file say.
fn default_scratch_root() -> Option<PathBuf> {
    ProjectDirs::from("edu", "caltech", "covadock").map(|dirs| dirs.cache_dir().join("work"))
}

pub fn build_config(args: &DockArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let engine_file = file_config.engine.take().unwrap_or_default();
    let vina_path = args
        .vina
        .clone()
        .or(engine_file.vina)
        .unwrap_or_else(|| PathBuf::from(&defaults.vina));
    let obabel_path = args
        .obabel
        .clone()
        .or(engine_file.obabel)
        .unwrap_or_else(|| PathBuf::from(&defaults.obabel));
    let exhaustiveness = args
        .exhaustiveness
        .or(engine_file.exhaustiveness)
        .unwrap_or(defaults.exhaustiveness);
    let num_modes = args
        .num_modes
        .or(engine_file.num_modes)
        .unwrap_or(defaults.num_modes);
    let timeout_secs = args
        .timeout
        .or(engine_file.timeout_secs)
        .unwrap_or(defaults.timeout_secs);

    let box_file = file_config.docking_box.take().unwrap_or_default();
    let center = box_file.center.unwrap_or(defaults.box_center);
    let size = box_file.size.unwrap_or(defaults.box_size);
    let default_box = core_config::DockingBox::new(
        Point3::new(center[0], center[1], center[2]),
        Vector3::new(size[0], size[1], size[2]),
    )
    .map_err(|e| CliError::Config(e.to_string()))?;

    let target_file = file_config.target.take().unwrap_or_default();
    let scoring_file = file_config.scoring.take().unwrap_or_default();
    let workspace_file = file_config.workspace.take().unwrap_or_default();
    let warheads_file = file_config.warheads.take().unwrap_or_default();

    let scratch_root = workspace_file
        .scratch_dir
        .or_else(default_scratch_root);
    let keep_workdir = args.keep_workdir || workspace_file.keep.unwrap_or(defaults.keep_workdir);
    let remove_heteroatoms =
        args.remove_heteroatoms || workspace_file.remove_heteroatoms.unwrap_or(false);

    let mut builder = core_config::PipelineConfigBuilder::new()
        .vina_path(vina_path)
        .exhaustiveness(exhaustiveness)
        .num_modes(num_modes)
        .default_box(default_box)
        .target_atom_name(
            target_file
                .atom_name
                .unwrap_or(defaults.target_atom_name),
        )
        .covalent_box_edge(target_file.box_size.unwrap_or(defaults.target_box_size))
        .scoring_policy(
            args.policy
                .or(scoring_file.policy)
                .unwrap_or(defaults.scoring_policy),
        )
        .keep_workdir(keep_workdir)
        .remove_heteroatoms(remove_heteroatoms);
    if let Some(root) = scratch_root {
        builder = builder.scratch_root(root);
    }
    let pipeline = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        pipeline,
        obabel_path,
        timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        catalogue_path: warheads_file.catalogue,
    })
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
    })
}

fn parse_triple(key: &str, value_str: &str) -> Result<[f64; 3]> {
    let parts: Vec<f64> = value_str
        .split(',')
        .map(|p| parse_value(key, p, "float"))
        .collect::<Result<_>>()?;
    parts.try_into().map_err(|_| {
        CliError::Config(format!(
            "Invalid value for {}: '{}'. Expected X,Y,Z.",
            key, value_str
        ))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let parts: Vec<_> = kv_pair.splitn(2, '=').collect();
        if parts.len() != 2 {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        }
        let key = parts[0];
        let value_str = parts[1];

        match key {
            "engine.vina" => {
                config.engine.get_or_insert_with(Default::default).vina =
                    Some(PathBuf::from(value_str));
            }
            "engine.obabel" => {
                config.engine.get_or_insert_with(Default::default).obabel =
                    Some(PathBuf::from(value_str));
            }
            "engine.exhaustiveness" => {
                config
                    .engine
                    .get_or_insert_with(Default::default)
                    .exhaustiveness = Some(parse_value(key, value_str, "integer")?);
            }
            "engine.num-modes" => {
                config.engine.get_or_insert_with(Default::default).num_modes =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "engine.timeout-secs" => {
                config
                    .engine
                    .get_or_insert_with(Default::default)
                    .timeout_secs = Some(parse_value(key, value_str, "integer")?);
            }
            "box.center" => {
                config.docking_box.get_or_insert_with(Default::default).center =
                    Some(parse_triple(key, value_str)?);
            }
            "box.size" => {
                config.docking_box.get_or_insert_with(Default::default).size =
                    Some(parse_triple(key, value_str)?);
            }
            "target.atom-name" => {
                config.target.get_or_insert_with(Default::default).atom_name =
                    Some(value_str.to_string());
            }
            "target.box-size" => {
                config.target.get_or_insert_with(Default::default).box_size =
                    Some(parse_value(key, value_str, "float")?);
            }
            "scoring.policy" => {
                config.scoring.get_or_insert_with(Default::default).policy =
                    Some(value_str.parse().map_err(|e| {
                        CliError::Config(format!("Invalid value for {}: {}", key, e))
                    })?);
            }
            "workspace.keep" => {
                config.workspace.get_or_insert_with(Default::default).keep =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
