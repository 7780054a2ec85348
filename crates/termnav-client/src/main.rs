// crates/termnav-client/src/main.rs
mod api;

use anyhow::Result;
use api::DaemonClient;
use clap::{Parser, Subcommand};
use termnav_common::config::load_client_config;
use termnav_workspace::{translate, Translation};

#[derive(Parser)]
#[command(name = "termnav", version = termnav_common::VERSION)]
#[command(about = "Resolve and navigate to the cwd of terminal sessions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a terminal session with the daemon
    Register {
        /// Terminal name, e.g. "1" or "build"
        name: String,
        /// Root pid of the terminal; defaults to the invoking shell
        #[arg(long)]
        pid: Option<i32>,
    },
    /// Remove a terminal registration
    Unregister { name: String },
    /// List registered terminals
    List,
    /// Print the absolute cwd of a terminal's shell
    Cwd { name: String },
    /// Print the workspace-relative navigation target for a terminal
    Show { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_client_config()?;
    let client = DaemonClient::new(&config.daemon_url);

    match cli.command {
        Command::Register { name, pid } => {
            let pid = pid.unwrap_or_else(|| std::os::unix::process::parent_id() as i32);
            let entry = client.register(&name, pid).await?;
            println!("registered {} (pid {})", entry.name, entry.root_pid);
        }
        Command::Unregister { name } => {
            client.unregister(&name).await?;
            println!("unregistered {}", name);
        }
        Command::List => {
            for entry in client.list().await? {
                println!(
                    "{:<16} {:>8}  {}",
                    entry.name, entry.root_pid, entry.registered_at
                );
            }
        }
        Command::Cwd { name } => {
            println!("{}", client.terminal_cwd(&name).await?);
        }
        Command::Show { name } => {
            let cwd = client.terminal_cwd(&name).await?;
            // Outside the workspace degrades to the root rather than failing.
            let target = match translate(&cwd, &config.workspace_root) {
                Translation::Relative(rel) if !rel.is_empty() => rel,
                Translation::Relative(_) | Translation::OutsideWorkspace => ".".to_string(),
            };
            println!("{target}");
        }
    }

    Ok(())
}
