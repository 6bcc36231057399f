//! SearchMap CLI - Build, edit and inspect mind-map documents

mod cli;
mod outline;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    let mut app = cli::SearchMapApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
