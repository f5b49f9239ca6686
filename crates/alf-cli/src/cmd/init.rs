use alf_core::{config::Config, io, paths, session::WizardSession};
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let project_name = match name {
        Some(n) => n.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string()),
    };

    println!("Initializing ALF in: {}", root.display());

    for dir in [paths::ALF_DIR, paths::EXPORTS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    if paths::config_path(root).exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Config::new(&project_name)
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    if paths::session_path(root).exists() {
        println!("  exists:  {}", paths::SESSION_FILE);
    } else {
        WizardSession::new()
            .save(root)
            .context("failed to write session.json")?;
        println!("  created: {}", paths::SESSION_FILE);
    }

    println!("\nNext: alf step show");
    Ok(())
}
