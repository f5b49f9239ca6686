use crate::cmd::load_project;
use crate::output::print_json;
use alf_core::steps::WizardStep;
use alf_core::validation::validate_step;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum StepSubcommand {
    /// Show the current step and its draft patch
    Show,

    /// List every step with its validation state
    List,

    /// Go back one step
    Back,

    /// Jump to a step without validating
    Goto {
        /// Step name (subjects, grade, materials, vision, standards, phases, rubrics, logistics, review)
        step: String,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: StepSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        StepSubcommand::Show => show(root, json),
        StepSubcommand::List => list(root, json),
        StepSubcommand::Back => navigate(root, json, |s| {
            s.back();
            Ok(())
        }),
        StepSubcommand::Goto { step } => {
            let target: WizardStep = step.parse()?;
            navigate(root, json, move |s| {
                s.goto(target);
                Ok(())
            })
        }
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, session) = load_project(root)?;
    let step = session.current_step;
    let draft = session.draft(&config.policy());

    if json {
        return print_json(&serde_json::json!({
            "step": step,
            "title": step.title(),
            "draft": draft,
        }));
    }

    println!("Step {}: {} ({step})", step.index() + 1, step.title());
    if step == WizardStep::Review {
        println!("Nothing to edit. Use 'alf preview' or 'alf export'.");
        return Ok(());
    }
    println!("Edit this draft and pass it to 'alf submit --patch <file>':\n");
    println!("{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, session) = load_project(root)?;
    let entries: Vec<_> = WizardStep::all()
        .iter()
        .map(|step| (*step, validate_step(*step, &session.data, &config)))
        .collect();

    if json {
        let value: Vec<_> = entries
            .iter()
            .map(|(step, errors)| {
                serde_json::json!({
                    "step": step,
                    "current": *step == session.current_step,
                    "errors": errors,
                })
            })
            .collect();
        return print_json(&value);
    }

    for (step, errors) in &entries {
        let marker = if *step == session.current_step { ">" } else { " " };
        let state = if errors.is_empty() {
            "ok".to_string()
        } else {
            format!("{} issue(s)", errors.len())
        };
        println!("{marker} {:<10} {:<28} {state}", step.as_str(), step.title());
    }
    Ok(())
}

fn navigate(
    root: &Path,
    json: bool,
    apply: impl FnOnce(&mut alf_core::session::WizardSession) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let (_, mut session) = load_project(root)?;
    apply(&mut session)?;
    session.save(root).context("failed to write session")?;
    if json {
        print_json(&serde_json::json!({ "step": session.current_step }))
    } else {
        println!("Now at: {} ({})", session.current_step.title(), session.current_step);
        Ok(())
    }
}
