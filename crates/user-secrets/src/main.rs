//! user-secrets - open a project's secrets.json
//!
//! Reads the UserSecretsId from a .csproj/.fsproj/.vbproj (adding one derived
//! from the file name if missing), creates the matching secrets.json under
//! the user profile if needed, and opens it in $VISUAL / $EDITOR.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use user_secrets::{discover_manifest, editor, Config, Locator};
use user_secrets_core::{Platform, SystemEnvironment};

#[derive(Parser)]
#[command(name = "user-secrets")]
#[command(about = "Open (creating if needed) the user secrets store of a .NET project")]
#[command(version)]
#[command(after_help = r#"STORE LOCATION:
    Windows:        %APPDATA%\Microsoft\UserSecrets\<id>\secrets.json
    macOS / Linux:  ~/.microsoft/usersecrets/<id>/secrets.json

If the project has no <UserSecretsId>, one is derived from the project file
name (lowercased, non-alphanumeric runs replaced by '-') and written into the
first <PropertyGroup>."#)]
struct Cli {
    /// Project file (default: the only *.csproj/*.fsproj/*.vbproj in the current directory)
    manifest: Option<PathBuf>,

    /// Don't launch an editor
    #[arg(long)]
    no_open: bool,

    /// Print only the store path (implies --no-open)
    #[arg(long)]
    print_path: bool,

    /// Config file (default: ~/.config/user-secrets/config.yaml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: Failed to open user secrets: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let manifest = match cli.manifest {
        Some(path) => path,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            discover_manifest(&cwd)?
        }
    };

    let resolution = Locator::system().resolve(&manifest)?;

    if cli.print_path {
        if resolution.created_id {
            eprintln!("info: Created new UserSecretsId: {}", resolution.id);
        }
        println!("{}", resolution.store.display());
        return Ok(());
    }

    if resolution.created_id {
        println!("info: Created new UserSecretsId: {}", resolution.id);
    }

    if cli.no_open || !config.open {
        println!("{}", resolution.store.display());
    } else {
        let editor = editor::resolve_editor(
            &SystemEnvironment,
            config.editor.as_deref(),
            Platform::current(),
        );
        editor::open(&editor, &resolution.store)?;
    }

    println!(
        "success: Opened user secrets for: {}",
        resolution.manifest_name()
    );

    Ok(())
}
