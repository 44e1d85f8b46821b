mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();
    cli::context::init(args.dir.as_deref(), args.authorized_keys.as_deref());

    let result = match &args.command {
        Commands::Init { bin_path } => cli::commands::init::execute(bin_path),
        Commands::User { action } => cli::commands::user::execute(action),
        Commands::Repo { action } => cli::commands::repo::execute(action),
        Commands::Log {
            author,
            subject,
            since,
            last,
        } => cli::commands::log::execute(
            author.as_deref(),
            subject.as_deref(),
            since.as_deref(),
            *last,
        ),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
