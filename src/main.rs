use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(version, about)]
/// Application CLI arguments
struct Args {
    /// whether to be verbose
    #[arg(short = 'v')]
    verbose: bool,

    /// path to a TOML config file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.verbose {
        println!("DEBUG {args:?}");
    }

    let cfg = foreman::settings::AppConfig::load(args.config.as_deref())?;
    foreman::trace::init(cfg.log_format)?;

    let node = foreman::bootstrap::start(&cfg).await?;

    tokio::signal::ctrl_c().await?;
    node.shutdown().await;
    Ok(())
}
