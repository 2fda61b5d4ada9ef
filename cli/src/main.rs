use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use catalog_core::{config, ApiClient, FileSessionStore, SessionContext, UreqTransport};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "catalog")]
#[command(about = "Manage the product catalog from the terminal.", long_about = None)]
struct Cli {
    /// Base address of the catalog API
    #[arg(long, global = true, env = config::BASE_URL_ENV, default_value = config::DEFAULT_BASE_URL)]
    base_url: String,

    /// File holding the session token (defaults to the user data directory)
    #[arg(long, global = true, env = "CATALOG_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CATALOG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CATALOG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// List all items
    List,

    /// Add an item
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Replace an item's name and description; omitted fields keep their value
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete an item
    Delete { id: i64 },
}

fn default_token_file() -> PathBuf {
    directories::ProjectDirs::from("", "", "catalog")
        .map(|dirs| dirs.data_dir().join(config::TOKEN_KEY))
        .unwrap_or_else(|| PathBuf::from(".catalog").join(config::TOKEN_KEY))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", commands::describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let token_file = cli.token_file.unwrap_or_else(default_token_file);
    let ctx = SessionContext::new(
        ApiClient::new(&cli.base_url),
        FileSessionStore::new(token_file),
        UreqTransport::new(),
    );

    match cli.command {
        Commands::Register { email, password } => commands::register(&ctx, email, password),
        Commands::Login { email, password } => commands::login(&ctx, email, password),
        Commands::Logout => {
            ctx.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::List => commands::list(&ctx),
        Commands::Add { name, description } => commands::add(&ctx, name, description),
        Commands::Update {
            id,
            name,
            description,
        } => commands::update(&ctx, id, name, description),
        Commands::Delete { id } => commands::delete(&ctx, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_fields_are_optional() {
        let cli = Cli::try_parse_from(["catalog", "update", "7", "--name", "New"]).unwrap();
        match cli.command {
            Commands::Update {
                id,
                name,
                description,
            } => {
                assert_eq!(id, 7);
                assert_eq!(name.as_deref(), Some("New"));
                assert!(description.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_description_defaults_to_empty() {
        let cli = Cli::try_parse_from(["catalog", "add", "Widget"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Add { ref name, ref description } if name == "Widget" && description.is_empty()
        ));
    }
}
