use clap::Parser;

mod cli;
mod commands;
mod exit_codes;
mod output;

use cli::Cli;

#[tokio::main]
async fn main() {
    // .env may carry FRAME337_* defaults for the clap `env` fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let exit_code = match cli.command {
        cli::Command::Sources(args) => commands::sources::execute(args).await,
        cli::Command::References(args) => commands::references::execute(args).await,
        cli::Command::Test(args) => commands::run::execute(args).await,
        cli::Command::Info(args) => commands::info::execute(args),
    };

    std::process::exit(exit_code);
}
