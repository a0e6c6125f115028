use crate::cli::NormalizeArgs;
use crate::error::{CliError, Result};
use covadock::core::io::normalize::{StructureRole, normalize, validate};
use tracing::{info, warn};

pub async fn run(args: NormalizeArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.input)?;
    let role = StructureRole::from(args.role);
    let normalized = normalize(&text, role);
    if !validate(&normalized) {
        warn!("Normalized text contains no atom records");
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &normalized).map_err(CliError::Io)?;
            info!("Normalized {:?} written to {:?}", &args.input, path);
            println!("✓ Normalized structure written to: {}", path.display());
        }
        None => print!("{}", normalized),
    }
    Ok(())
}
