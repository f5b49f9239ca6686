use crate::cmd::load_project;
use crate::output::print_json;
use alf_core::steps::WizardStep;
use alf_core::validation::{first_blocking_step, validate_step};
use std::path::Path;

pub fn run(root: &Path, step: Option<&str>, json: bool) -> anyhow::Result<()> {
    let (config, session) = load_project(root)?;

    let blocking = match step {
        Some(name) => {
            let step: WizardStep = name.parse()?;
            let errors = validate_step(step, &session.data, &config);
            (!errors.is_empty()).then_some((step, errors))
        }
        None => first_blocking_step(session.current_step, &session.data, &config),
    };

    if json {
        let value = match &blocking {
            Some((step, errors)) => serde_json::json!({ "valid": false, "step": step, "errors": errors }),
            None => serde_json::json!({ "valid": true }),
        };
        print_json(&value)?;
    } else {
        match &blocking {
            Some((step, errors)) => {
                println!("{} ({step}):", step.title());
                for (field, messages) in errors.iter() {
                    for m in messages {
                        println!("  {field}: {m}");
                    }
                }
            }
            None => println!("No blocking issues."),
        }
    }

    if let Some((step, _)) = blocking {
        anyhow::bail!("step '{step}' has validation errors");
    }
    Ok(())
}
