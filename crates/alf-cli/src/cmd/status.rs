use crate::cmd::load_project;
use crate::output::{print_json, print_table};
use alf_core::completeness::evaluate_completeness;
use alf_core::rules::Bucket;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, session) = load_project(root)?;
    let report = evaluate_completeness(&session.data, &config);

    if json {
        return print_json(&report);
    }

    println!("Project: {}", config.project.name);
    println!(
        "Step:    {} ({}/{})",
        session.current_step.title(),
        session.current_step.index() + 1,
        alf_core::steps::WizardStep::all().len()
    );
    println!();

    let rows = Bucket::all()
        .iter()
        .map(|b| {
            let missing = &report.bucket(*b).missing;
            vec![
                b.to_string(),
                format!("{}%", report.percentage(*b)),
                missing.len().to_string(),
            ]
        })
        .collect();
    print_table(&["BUCKET", "READY", "MISSING"], rows);
    println!("Overall: {}%", report.summary.overall);

    let missing: Vec<_> = Bucket::all()
        .iter()
        .flat_map(|b| report.bucket(*b).missing.iter().map(move |m| (*b, m)))
        .collect();
    if !missing.is_empty() {
        println!("\nStill missing:");
        for (bucket, item) in missing {
            println!("  [{bucket}] {item}");
        }
    }
    Ok(())
}
