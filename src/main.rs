use clap::Parser;
use std::process::ExitCode;
use subtally::cli::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    env_logger::Builder::from_default_env()
        .filter_level(config.verbosity().log_level_filter())
        .init();
    subtally::cli::run(config).await
}
