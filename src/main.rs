use clap::Parser;
use pathwright::cli::{run_cli, Cli};
use pathwright::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env())?;
    run_cli(cli)
}
