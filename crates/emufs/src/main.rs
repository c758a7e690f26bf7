//! emufs - inspect and manage emulator user directories

use clap::{Parser, Subcommand, ValueEnum};
use emufs_config::UserPath;
use emufs_fs::DirectorySeparator;
use std::path::PathBuf;
use tracing::error;

mod commands;

use commands::{
    copy_dir_command, init_command, list_command, paths_command, remove_command,
    sanitize_command, set_command, short_name_command, size_command,
};

/// emufs - emulator user directory tool
#[derive(Parser)]
#[command(name = "emufs")]
#[command(about = "Inspect and manage emulator user directories")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every user directory
    Paths {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create every user directory
    Init,
    /// Persist a directory override for one category
    Set {
        /// Category, e.g. sdmc_dir or screenshots
        category: UserPath,
        /// Existing directory to use
        dir: String,
    },
    /// Normalize separators in a path
    Sanitize {
        path: String,
        #[arg(short, long, value_enum, default_value_t = Separator::Native)]
        separator: Separator,
    },
    /// Derive the FAT 8.3 short name of a filename
    ShortName { filename: String },
    /// List the entries of a directory
    Ls { dir: PathBuf },
    /// Print the size of a file
    Size { path: PathBuf },
    /// Copy a directory tree without overwriting
    CopyDir { src: PathBuf, dst: PathBuf },
    /// Delete a file or directory
    Remove {
        path: PathBuf,
        /// Delete directory contents too
        #[arg(short, long)]
        recursive: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Separator {
    Forward,
    Backward,
    Native,
}

impl From<Separator> for DirectorySeparator {
    fn from(separator: Separator) -> Self {
        match separator {
            Separator::Forward => DirectorySeparator::ForwardSlash,
            Separator::Backward => DirectorySeparator::BackwardSlash,
            Separator::Native => DirectorySeparator::PlatformDefault,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Paths { json } => paths_command(json),
        Commands::Init => init_command(),
        Commands::Set { category, dir } => set_command(category, &dir),
        Commands::Sanitize { path, separator } => sanitize_command(&path, separator.into()),
        Commands::ShortName { filename } => short_name_command(&filename),
        Commands::Ls { dir } => list_command(&dir),
        Commands::Size { path } => size_command(&path),
        Commands::CopyDir { src, dst } => copy_dir_command(&src, &dst),
        Commands::Remove { path, recursive } => remove_command(&path, recursive),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
