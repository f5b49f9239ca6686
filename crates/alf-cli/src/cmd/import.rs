use crate::cmd::read_json;
use crate::output::print_json;
use alf_core::config::Config;
use alf_core::session::WizardSession;
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let record = read_json(file)?;
    let (session, report) = WizardSession::import(&record, &config.policy());
    session.save(root).context("failed to write session")?;

    if json {
        return print_json(&serde_json::json!({
            "currentStep": session.current_step,
            "report": report,
        }));
    }

    println!("Imported wizard record from {}", file.display());
    if report.is_clean() {
        println!("All references resolve.");
    } else {
        for d in &report.dangling {
            println!("  dangling:  {d}");
        }
        for dup in &report.duplicates {
            println!("  duplicate: {}[{}]", dup.collection, dup.id);
        }
        println!("Run 'alf reconcile --drop' to clean these up.");
    }
    Ok(())
}
