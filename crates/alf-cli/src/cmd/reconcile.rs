use crate::cmd::load_project;
use crate::output::{print_json, print_table};
use alf_core::reconcile::ReconcileMode;
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, drop: bool, json: bool) -> anyhow::Result<()> {
    let (_, mut session) = load_project(root)?;
    let mode = if drop {
        ReconcileMode::Drop
    } else {
        ReconcileMode::Flag
    };
    let report = session.reconcile(mode);

    if drop && !report.is_clean() {
        session.save(root).context("failed to write session")?;
    }

    if json {
        return print_json(&serde_json::json!({ "mode": mode, "report": report }));
    }

    if report.is_clean() {
        println!("All references resolve.");
        return Ok(());
    }

    if !report.dangling.is_empty() {
        let rows = report
            .dangling
            .iter()
            .map(|d| {
                vec![
                    d.collection.clone(),
                    d.owner_id.clone(),
                    d.field.clone(),
                    d.target.clone(),
                ]
            })
            .collect();
        print_table(&["COLLECTION", "OWNER", "FIELD", "MISSING TARGET"], rows);
    }
    for dup in &report.duplicates {
        match &dup.reassigned {
            Some(fresh) => println!("duplicate {}[{}] -> {fresh}", dup.collection, dup.id),
            None => println!("duplicate {}[{}]", dup.collection, dup.id),
        }
    }
    if drop {
        println!("\nDangling references cleared and duplicates re-ided.");
    } else {
        println!("\nRun with --drop to clear these.");
    }
    Ok(())
}
