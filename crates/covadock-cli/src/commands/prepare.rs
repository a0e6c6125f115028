use crate::cli::PrepareReceptorArgs;
use crate::error::{CliError, Result};
use crate::utils::process::TimedProcess;
use covadock::engine::receptor::ReceptorPreparer;
use covadock::engine::toolkit::{NativeToolkit, OpenBabel};
use std::path::PathBuf;
use tracing::info;

pub async fn run(args: PrepareReceptorArgs) -> Result<()> {
    if !args.input.is_file() {
        return Err(CliError::Argument(format!(
            "Input structure does not exist: {}",
            args.input.display()
        )));
    }

    let process = TimedProcess::new(tokio::runtime::Handle::current(), None);
    let obabel = args.obabel.clone().unwrap_or_else(|| PathBuf::from("obabel"));
    let converter = OpenBabel::new(obabel, &process);
    let preparer =
        ReceptorPreparer::new(&converter, &NativeToolkit).remove_heteroatoms(args.remove_heteroatoms);

    info!("Preparing receptor {:?} -> {:?}", &args.input, &args.output);
    tokio::task::block_in_place(|| preparer.prepare(&args.input, &args.output))?;
    println!("✓ Receptor written to: {}", args.output.display());
    Ok(())
}
