use covadock::core::scoring::covalent::ScoringPolicy;
use covadock::engine::config::{DockingBox, DockingConfig};

pub struct DefaultsConfig {
    pub vina: String,
    pub obabel: String,
    pub exhaustiveness: u32,
    pub num_modes: u32,
    pub timeout_secs: u64,
    pub box_center: [f64; 3],
    pub box_size: [f64; 3],
    pub target_atom_name: String,
    pub target_box_size: f64,
    pub scoring_policy: ScoringPolicy,
    pub keep_workdir: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let edge = DockingBox::DEFAULT_EDGE;
        Self {
            vina: "vina".to_string(),
            obabel: "obabel".to_string(),
            exhaustiveness: DockingConfig::DEFAULT_EXHAUSTIVENESS,
            num_modes: DockingConfig::DEFAULT_NUM_MODES,
            timeout_secs: 600,
            box_center: [0.0, 0.0, 0.0],
            box_size: [edge, edge, edge],
            target_atom_name: "SG".to_string(),
            target_box_size: DockingBox::COVALENT_EDGE,
            scoring_policy: ScoringPolicy::Discrete,
            keep_workdir: false,
        }
    }
}
