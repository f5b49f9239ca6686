use crate::cmd::{load_project, read_json};
use crate::output::print_json;
use alf_core::AlfError;
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, patch_path: &Path, json: bool) -> anyhow::Result<()> {
    let (config, mut session) = load_project(root)?;
    let patch = read_json(patch_path)?;
    let step = session.current_step;

    match session.submit(&patch, &config) {
        Ok(next) => {
            session.save(root).context("failed to write session")?;
            if json {
                print_json(&serde_json::json!({
                    "submitted": step,
                    "step": next,
                }))
            } else {
                println!("Saved {}.", step.title());
                if next == step {
                    println!("All steps done. Run 'alf export' to write a snapshot.");
                } else {
                    println!("Next: {} ({next})", next.title());
                }
                Ok(())
            }
        }
        Err(AlfError::Validation { step, errors }) => {
            if json {
                print_json(&serde_json::json!({
                    "submitted": step,
                    "errors": errors,
                }))?;
            } else {
                println!("Step '{step}' needs attention:");
                for (field, messages) in errors.iter() {
                    for m in messages {
                        println!("  {field}: {m}");
                    }
                }
            }
            anyhow::bail!("step '{step}' was not saved")
        }
        Err(e) => Err(e).context("submit failed"),
    }
}
