use crate::cli::WarheadsArgs;
use crate::error::{CliError, Result};
use covadock::core::warheads::catalogue::WarheadCatalogue;
use covadock::workflows;
use tracing::{info, warn};

pub async fn run(args: WarheadsArgs) -> Result<()> {
    let custom = args
        .catalogue
        .as_deref()
        .map(WarheadCatalogue::load)
        .transpose()
        .map_err(|e| CliError::Config(e.to_string()))?;
    let catalogue = custom
        .as_ref()
        .unwrap_or_else(|| WarheadCatalogue::global());
    info!(patterns = catalogue.len(), "Scanning for warheads");

    let mut unparseable = 0usize;
    for smiles in &args.smiles {
        match workflows::warheads::detect_with(smiles, catalogue) {
            Ok(report) if report.has_warhead => {
                println!("{}: {}", smiles, report.names().join(", "));
                for m in &report.matches {
                    let kind = m.kind.map_or("custom", |k| k.as_str());
                    println!("  {} [{}] atoms {:?}", m.name, kind, m.atom_indices);
                }
            }
            Ok(_) => println!("{}: no warhead", smiles),
            Err(e) => {
                warn!(%smiles, error = %e, "Could not parse SMILES");
                println!("{}: unparseable ({})", smiles, e);
                unparseable += 1;
            }
        }
    }

    if unparseable == args.smiles.len() {
        return Err(CliError::Argument(
            "None of the given SMILES could be parsed".to_string(),
        ));
    }
    Ok(())
}
