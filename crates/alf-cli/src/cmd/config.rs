use crate::output::{print_json, print_table};
use alf_core::config::{Config, WarnLevel};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration and tier policy
    Show,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let policy = config.policy();

    if json {
        return print_json(&serde_json::json!({
            "config": config,
            "policy": policy,
        }));
    }

    let t = &config.thresholds;
    println!("Project:            {}", config.project.name);
    println!("Default confidence: {}", policy.confidence());
    println!("Learning goals:     at least {}", t.min_learning_goals);
    println!("Success criteria:   at least {}", t.min_success_criteria);
    println!("Big idea:           at least {} characters", t.min_big_idea_chars);
    println!("Essential question: at least {} characters", t.min_essential_question_chars);
    println!("Export prefix:      {}", config.export.file_prefix);
    println!();

    let rows = policy
        .entries()
        .map(|(kind, tier)| {
            let source = if config.tier_defaults.contains_key(&kind) {
                "config"
            } else {
                "built-in"
            };
            vec![kind.to_string(), tier.to_string(), source.to_string()]
        })
        .collect();
    print_table(&["ENTITY", "DEFAULT TIER", "SOURCE"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
