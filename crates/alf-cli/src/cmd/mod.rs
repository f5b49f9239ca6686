pub mod catalog;
pub mod config;
pub mod export;
pub mod import;
pub mod init;
pub mod reconcile;
pub mod status;
pub mod step;
pub mod submit;
pub mod validate;

use alf_core::config::Config;
use alf_core::session::WizardSession;
use anyhow::Context;
use std::io::Read;
use std::path::Path;

/// Load config and session together; every wizard command needs both.
pub fn load_project(root: &Path) -> anyhow::Result<(Config, WizardSession)> {
    let config = Config::load(root).context("failed to load config")?;
    let session = WizardSession::load(root, &config.policy()).context("failed to load session")?;
    Ok((config, session))
}

/// Read a JSON document from `path`, or from stdin when `path` is `-`.
pub fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}
