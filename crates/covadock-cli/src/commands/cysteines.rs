use crate::cli::CysteinesArgs;
use crate::error::Result;
use covadock::workflows;
use tracing::info;

pub async fn run(args: CysteinesArgs) -> Result<()> {
    info!("Loading receptor structure from {:?}", &args.input);
    let analysis = workflows::cysteines::analyze_path(&args.input)?;

    if analysis.cysteines.is_empty() {
        println!("No cysteine residues found.");
        return Ok(());
    }

    println!("Found {} cysteine residue(s):", analysis.cysteines.len());
    for (chain, residues) in &analysis.chain_groups {
        let numbers: Vec<String> = residues.iter().map(ToString::to_string).collect();
        println!("  Chain {}: {}", chain, numbers.join(", "));
    }
    let without_sulfur = analysis.cysteines.iter().filter(|c| c.sulfur.is_none()).count();
    if without_sulfur > 0 {
        println!("  ({} without an SG atom)", without_sulfur);
    }

    if analysis.potential_disulfide_bonds.is_empty() {
        println!("No potential disulfide bonds.");
    } else {
        println!("Potential disulfide bonds:");
        for pair in &analysis.potential_disulfide_bonds {
            println!(
                "  {}:{} - {}:{} ({:.2} Å)",
                pair.first.0, pair.first.1, pair.second.0, pair.second.1, pair.distance
            );
        }
    }
    Ok(())
}
