mod config;
mod errors;
mod logging;
mod sandbox;
mod server;
mod workspaces;

use crate::config::Config;
use crate::workspaces::WorkspaceStore;
use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

const DEFAULT_CONFIG: &str = "workspace-files.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut init_project: Option<String> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                if i >= args.len() { eprintln!("--config requires a path"); std::process::exit(2); }
                config_path = Some(PathBuf::from(&args[i]));
            }
            "--init" => {
                i += 1;
                if i >= args.len() { eprintln!("--init requires a project id"); std::process::exit(2); }
                init_project = Some(args[i].clone());
            }
            _ => {}
        }
        i += 1;
    }

    let mut cfg = match &config_path {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None if PathBuf::from(DEFAULT_CONFIG).exists() => {
            Config::load(&PathBuf::from(DEFAULT_CONFIG)).context("loading config")?
        }
        None => Config::default(),
    };
    cfg.apply_env(|k| std::env::var(k).ok()).context("reading environment")?;
    cfg.validate().context("validating config")?;

    logging::init(&cfg.logging);

    let store = WorkspaceStore::new(cfg.workspaces.root_dir.clone());
    store
        .ensure_root()
        .with_context(|| format!("creating workspace root {}", store.root().display()))?;

    if let Some(id) = init_project {
        let dir = store.create(&id).context("initializing workspace")?;
        info!(project_id = %id, path = %dir.display(), "workspace ready");
        println!("{}", dir.display());
        return Ok(());
    }

    let addr = cfg.socket_addr()?;
    info!(
        addr = %addr,
        base_path = %cfg.server.base_path,
        root_dir = %store.root().display(),
        "workspace-files ready"
    );

    server::serve(cfg, store).await
}
