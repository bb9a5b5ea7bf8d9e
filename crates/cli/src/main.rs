mod commands;
mod config;
mod shell;

use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "clipring")]
#[command(about = "Clipboard history over a local socket")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon in the foreground, watching the clipboard
    #[command(display_order = 1)]
    Watch,
    /// Show history entries, newest first
    #[command(display_order = 2)]
    List,
    /// Show entries whose text contains a query
    #[command(display_order = 3)]
    Find {
        /// Words matched case-insensitively against entry text
        query: Vec<String>,
    },
    /// Put entry N back on the clipboard
    #[command(display_order = 4)]
    Copy {
        /// Zero-based history index
        index: Option<String>,
    },
    /// Record text as the newest entry
    #[command(display_order = 5)]
    Add {
        /// Words joined with single spaces
        text: Vec<String>,
    },
    /// Delete entries by index, comma list, or range (3 or 1,4 or 0-2)
    #[command(display_order = 6)]
    Del {
        /// Targets, applied highest index first
        targets: Vec<String>,
    },
    /// Remove every entry
    #[command(display_order = 7)]
    Clear,
    /// Swap entry N with the one above it
    #[command(display_order = 8)]
    Up { index: Option<String> },
    /// Swap entry N with the one below it
    #[command(display_order = 9)]
    Down { index: Option<String> },
    /// Move entry N to the top
    #[command(display_order = 10)]
    Top { index: Option<String> },
    /// Print CLI and daemon versions
    #[command(display_order = 11)]
    Version,
    /// Ask the daemon to shut down
    #[command(display_order = 12)]
    Quit,
    /// Interactive prompt speaking the same commands
    #[command(display_order = 13)]
    Shell,
}

fn main() -> ExitCode {
    // `clipring 3` is shorthand for `clipring copy 3`.
    let mut args: Vec<OsString> = std::env::args_os().collect();
    if args.len() == 2 {
        let is_bare_index = args[1]
            .to_str()
            .map_or(false, |arg| !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()));
        if is_bare_index {
            args.insert(1, OsString::from("copy"));
        }
    }
    let cli = Cli::parse_from(args);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("clipring: failed to start async runtime: {err}");
            return ExitCode::from(commands::EXIT_GENERIC);
        }
    };
    rt.block_on(async_main(cli.command))
}

async fn async_main(command: Commands) -> ExitCode {
    // Client commands stay quiet unless something is wrong; the foreground
    // daemon narrates at INFO. RUST_LOG overrides either default.
    let default_level = if matches!(command, Commands::Watch) {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    let config = match config::load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("clipring: {err:#}");
            return ExitCode::from(commands::EXIT_GENERIC);
        }
    };

    let code = match command {
        Commands::Watch => commands::watch(&config).await,
        Commands::List => commands::forward(&config, "LIST").await,
        Commands::Find { query } => commands::find(&config, &query).await,
        Commands::Copy { index } => {
            commands::forward(&config, &commands::index_line("COPY", index.as_deref())).await
        }
        Commands::Add { text } => commands::add(&config, &text).await,
        Commands::Del { targets } => commands::del(&config, &targets).await,
        Commands::Clear => commands::forward(&config, "CLEAR").await,
        Commands::Up { index } => {
            commands::forward(&config, &commands::index_line("UP", index.as_deref())).await
        }
        Commands::Down { index } => {
            commands::forward(&config, &commands::index_line("DOWN", index.as_deref())).await
        }
        Commands::Top { index } => {
            commands::forward(&config, &commands::index_line("TOP", index.as_deref())).await
        }
        Commands::Version => commands::version(&config).await,
        Commands::Quit => commands::forward(&config, "QUIT").await,
        Commands::Shell => shell::run(&config).await,
    };
    ExitCode::from(code)
}
