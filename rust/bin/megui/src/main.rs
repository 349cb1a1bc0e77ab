//! `megui`: command-line client for the ERP maintenance screens.
//!
//! Manages contexts and sessions, and lists, creates, edits and deletes
//! records of any catalog entity through the same form engine the
//! screens use.

mod commands;
mod config;

use clap::{Parser, Subcommand};

use commands::resource::ListOptions;

/// Megui CLI tool.
#[derive(Parser, Debug)]
#[command(name = "megui", about = "ERP maintenance client")]
struct Cli {
    /// Path to client config file (default: ~/.megui/config.toml).
    #[arg(long = "config", global = true, env = config::CONFIG_ENV)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage contexts (one per backend).
    #[command(name = "context")]
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    #[command(name = "use")]
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Session of the current context.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Logout: clear the session of the current context.
    Logout,

    /// List the entities this client knows about.
    Entities,

    /// List records of an entity.
    List {
        /// Entity (e.g. cargos, equipos, tarifas-ruta).
        resource: String,
        /// Case-insensitive text filter over the searchable fields.
        #[arg(long)]
        filter: Option<String>,
        /// Sort by this field.
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending.
        #[arg(long)]
        desc: bool,
        /// Category filter value (e.g. PROPIO, ARRENDADO, all).
        #[arg(long)]
        category: Option<String>,
        /// Page number, starting at 1.
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Rows per page (10, 25 or 50).
        #[arg(long = "page-size", default_value_t = 0)]
        page_size: usize,
    },

    /// Show one record.
    Get {
        resource: String,
        id: String,
    },

    /// Create a record.
    Create {
        resource: String,
        /// JSON body.
        #[arg(long = "json")]
        json_body: Option<String>,
        /// Read JSON from file.
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },

    /// Edit a record. Only the given fields change.
    Update {
        resource: String,
        id: String,
        /// JSON body.
        #[arg(long = "json")]
        json_body: Option<String>,
        /// Read JSON from file.
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },

    /// Delete a record.
    Delete {
        resource: String,
        id: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Check server status.
    Status,

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a new context.
    Create {
        name: String,
        /// Backend base URL (default: VITE_API_URL).
        #[arg(long)]
        server: Option<String>,
    },
    /// List all contexts.
    List,
    /// Set properties on a context.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
    },
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[derive(Subcommand, Debug)]
enum SessionAction {
    /// Store a bearer token issued by the backend.
    Set {
        #[arg(long)]
        token: String,
        #[arg(long)]
        user: Option<String>,
        /// The user is a super user (may delete).
        #[arg(long = "super-user")]
        super_user: bool,
        /// The user is an administrator (may delete).
        #[arg(long)]
        admin: bool,
    },
}

fn read_body(json_body: Option<String>, file: Option<String>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(&path)?)
    } else if let Some(json) = json_body {
        Ok(json)
    } else {
        anyhow::bail!("Provide --json or -f <file>.");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = config::ConfigFile::locate(cli.config.as_deref());
    let json_output = cli.output == "json";

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Create { name, server } => {
                commands::context::create(&name, server.as_deref(), &config_path)?;
            }
            ContextAction::List => {
                commands::context::list(&config_path)?;
            }
            ContextAction::Set { name, server } => {
                commands::context::set(&name, server.as_deref(), &config_path)?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, &config_path)?;
            }
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => {
                commands::context::use_context(&name, &config_path)?;
            }
        },

        Commands::Session { action } => match action {
            SessionAction::Set {
                token,
                user,
                super_user,
                admin,
            } => {
                commands::session::set(&token, user.as_deref(), super_user, admin, &config_path)?;
            }
        },

        Commands::Logout => {
            commands::session::logout(&config_path)?;
        }

        Commands::Entities => {
            commands::resource::entities();
        }

        Commands::List {
            resource,
            filter,
            sort,
            desc,
            category,
            page,
            page_size,
        } => {
            let opts = ListOptions {
                filter,
                sort,
                desc,
                category,
                page,
                page_size,
            };
            commands::resource::list(&resource, &opts, json_output, &config_path).await?;
        }

        Commands::Get { resource, id } => {
            commands::resource::get(&resource, &id, json_output, &config_path).await?;
        }

        Commands::Create {
            resource,
            json_body,
            file,
        } => {
            let body = read_body(json_body, file)?;
            commands::resource::create(&resource, &body, &config_path).await?;
        }

        Commands::Update {
            resource,
            id,
            json_body,
            file,
        } => {
            let body = read_body(json_body, file)?;
            commands::resource::update(&resource, &id, &body, &config_path).await?;
        }

        Commands::Delete { resource, id, yes } => {
            commands::resource::delete(&resource, &id, yes, &config_path).await?;
        }

        Commands::Status => {
            commands::resource::status(&config_path).await?;
        }

        Commands::Version => {
            println!("megui cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
