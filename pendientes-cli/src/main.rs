mod cli;
mod config;
mod tracker;

use clap::Parser;
use colored::*;

use cli::Cli;

fn init_logging(cli: &Cli) {
    // RUST_LOG wins; otherwise -v raises the default from warn
    let default = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .write_style(if cli.no_color {
            env_logger::WriteStyle::Never
        } else {
            env_logger::WriteStyle::Auto
        })
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_logging(&cli);

    if let Err(e) = cli::commands::run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
