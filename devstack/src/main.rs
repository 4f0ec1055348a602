//! `devstack` command-line entry point.
//!
//! `opensearch` and `serve` always exit 0 once they have run: the container
//! start result and the server's exit code are reported as text only. Exit
//! code 1 is reserved for the launcher's own failures (bad config, I/O).
//! Both commands wait for Enter before exiting, on the error path too, so the
//! message stays readable when the launcher runs in its own console window.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use devstack::bootstrap::bootstrap_container;
use devstack::core::env::ProcessEnv;
use devstack::io::config::{
    DEFAULT_CONFIG_FILE, DevstackConfig, load_config, render_config, write_config,
};
use devstack::io::console::pause;
use devstack::io::process::SystemRunner;
use devstack::io::status_text::StatusText;
use devstack::logging;
use devstack::serve::launch_server;

#[derive(Parser)]
#[command(
    name = "devstack",
    version,
    about = "Start the local OpenSearch container and the API server"
)]
struct Cli {
    /// Configuration file (defaults apply when it does not exist).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Exit without waiting for Enter.
    #[arg(long, global = true)]
    no_pause: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stop, remove, and restart the OpenSearch container.
    Opensearch,
    /// Activate the virtual environment and run the API server.
    Serve,
    /// Write the default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Print the effective configuration.
    Config,
}

impl Command {
    /// Launcher commands that wait for Enter before exiting.
    fn pauses(&self) -> bool {
        matches!(self, Command::Opensearch | Command::Serve)
    }
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    // Cleared by `pause = false` once the config has loaded.
    let mut should_pause = cli.command.pauses() && !cli.no_pause;
    let result = run(&cli, &mut should_pause);
    if let Err(err) = &result {
        eprintln!("{:#}", err);
    }
    if should_pause && let Err(err) = pause(&mut io::stdin().lock(), &mut io::stdout()) {
        eprintln!("{:#}", err);
    }
    if result.is_err() {
        std::process::exit(1);
    }
}

fn run(cli: &Cli, should_pause: &mut bool) -> Result<()> {
    match cli.command {
        Command::Opensearch => {
            let cfg = load_config(&cli.config)?;
            *should_pause &= cfg.pause;
            cmd_opensearch(&cfg)
        }
        Command::Serve => {
            let cfg = load_config(&cli.config)?;
            *should_pause &= cfg.pause;
            cmd_serve(&cfg)
        }
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Config => cmd_config(&cli.config),
    }
}

fn cmd_opensearch(cfg: &DevstackConfig) -> Result<()> {
    let text = StatusText::new()?;
    let mut out = io::stdout().lock();
    bootstrap_container(&SystemRunner, &cfg.container, &text, &mut out)?;
    Ok(())
}

fn cmd_serve(cfg: &DevstackConfig) -> Result<()> {
    let text = StatusText::new()?;
    let root = std::env::current_dir().context("resolve current directory")?;
    let env = ProcessEnv::from_vars(std::env::vars_os());
    let mut out = io::stdout();
    let mut err = io::stderr();
    launch_server(
        &SystemRunner,
        &cfg.server,
        &text,
        &root,
        &env,
        &mut out,
        &mut err,
    )?;
    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("{} already exists (use --force to overwrite)", path.display());
        return Ok(());
    }
    write_config(path, &DevstackConfig::default())?;
    println!("wrote {}", path.display());
    Ok(())
}

fn cmd_config(path: &Path) -> Result<()> {
    let cfg = load_config(path)?;
    print!("{}", render_config(&cfg)?);
    Ok(())
}
