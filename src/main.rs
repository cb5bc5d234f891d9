// Entry point for the exchange ledger CLI
use clap::Parser;
use exchange_ledger::{execute, LedgerError, Opt, Settings, GLOBAL_CONFIG};
use log::{error, warn, LevelFilter};
use std::process;

fn main() {
    // RUST_LOG still wins over the Info default
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run(opt) {
        // precondition rejections are expected outcomes, not failures of the tool
        match e.downcast_ref::<LedgerError>() {
            Some(err) if err.is_rejection() => warn!("Rejected: {err}"),
            _ => error!("Error: {e}"),
        }
        process::exit(1);
    }
}

fn run(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = opt.config.as_deref() {
        GLOBAL_CONFIG.replace(Settings::load(Some(path))?);
    }
    if let Some(dir) = opt.data_dir {
        GLOBAL_CONFIG.set_data_dir(dir);
    }

    let settings = GLOBAL_CONFIG.get();
    settings.validate()?;
    for line in execute(opt.command, &settings)? {
        println!("{line}");
    }
    Ok(())
}
