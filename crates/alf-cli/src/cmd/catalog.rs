use crate::cmd::load_project;
use crate::output::{print_json, print_table};
use alf_core::catalog::{
    grade_band_for, rubric_template, search_standards, CatalogEntry, GRADE_BANDS, MATERIALS,
    RUBRIC_TEMPLATES, SUBJECTS, TECHNOLOGY,
};
use alf_core::types::StandardFramework;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum CatalogSubcommand {
    /// List subjects
    Subjects,

    /// List grade bands, or the band containing one grade
    Grades {
        /// Grade to look up, e.g. 7 or K
        grade: Option<String>,
    },

    /// List technology and material options
    Materials,

    /// List rubric templates
    Rubrics,

    /// Search the standards table
    Standards {
        /// Text to match against code or label
        query: Option<String>,
        /// Restrict to one framework (ngss, ccss_math, ccss_ela, c3, iste)
        #[arg(long)]
        framework: Option<String>,
    },

    /// Add a rubric built from a template to the session
    AddRubric {
        /// Template key (see 'alf catalog rubrics')
        template: String,
    },

    /// Align a standard from the table to the session
    AddStandard {
        /// Standard code, e.g. MS-LS2-1
        code: String,
        #[arg(long)]
        framework: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: CatalogSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CatalogSubcommand::Subjects => entries(SUBJECTS, json),
        CatalogSubcommand::Grades { grade } => grades(grade.as_deref(), json),
        CatalogSubcommand::Materials => materials(json),
        CatalogSubcommand::Rubrics => rubrics(json),
        CatalogSubcommand::Standards { query, framework } => {
            standards(query.as_deref().unwrap_or(""), framework.as_deref(), json)
        }
        CatalogSubcommand::AddRubric { template } => add_rubric(root, &template, json),
        CatalogSubcommand::AddStandard { code, framework } => {
            add_standard(root, &code, framework.as_deref(), json)
        }
    }
}

fn parse_framework(name: Option<&str>) -> anyhow::Result<Option<StandardFramework>> {
    match name {
        None => Ok(None),
        Some(n) => StandardFramework::parse(n)
            .map(Some)
            .with_context(|| format!("unknown framework '{n}'")),
    }
}

// ---------------------------------------------------------------------------
// listings
// ---------------------------------------------------------------------------

fn entries(list: &[CatalogEntry], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&list);
    }
    let rows = list
        .iter()
        .map(|e| vec![e.key.to_string(), e.label.to_string()])
        .collect();
    print_table(&["KEY", "LABEL"], rows);
    Ok(())
}

fn grades(grade: Option<&str>, json: bool) -> anyhow::Result<()> {
    let bands: Vec<_> = match grade {
        Some(g) => vec![grade_band_for(g).with_context(|| format!("no grade band contains '{g}'"))?],
        None => GRADE_BANDS.iter().collect(),
    };
    if json {
        return print_json(&bands);
    }
    let rows = bands
        .iter()
        .map(|b| vec![b.key.to_string(), b.label.to_string(), b.grades.join(", ")])
        .collect();
    print_table(&["BAND", "LABEL", "GRADES"], rows);
    Ok(())
}

fn materials(json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "technology": TECHNOLOGY,
            "materials": MATERIALS,
        }));
    }
    println!("Technology:");
    entries(TECHNOLOGY, false)?;
    println!("\nMaterials:");
    entries(MATERIALS, false)
}

fn rubrics(json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&RUBRIC_TEMPLATES);
    }
    let rows = RUBRIC_TEMPLATES
        .iter()
        .map(|t| {
            vec![
                t.key.to_string(),
                t.name.to_string(),
                t.scale_label.to_string(),
                t.criteria.join(", "),
            ]
        })
        .collect();
    print_table(&["KEY", "NAME", "SCALE", "CRITERIA"], rows);
    Ok(())
}

fn standards(query: &str, framework: Option<&str>, json: bool) -> anyhow::Result<()> {
    let hits = search_standards(parse_framework(framework)?, query);
    if json {
        return print_json(&hits);
    }
    if hits.is_empty() {
        println!("No standards match.");
        return Ok(());
    }
    let rows = hits
        .iter()
        .map(|s| {
            vec![
                s.framework.to_string(),
                s.code.to_string(),
                s.label.to_string(),
            ]
        })
        .collect();
    print_table(&["FRAMEWORK", "CODE", "LABEL"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// session edits
// ---------------------------------------------------------------------------

fn add_rubric(root: &Path, key: &str, json: bool) -> anyhow::Result<()> {
    let (_, mut session) = load_project(root)?;
    let rubric = rubric_template(key)?.instantiate();
    let id = rubric.id.clone();
    session.add_rubric(rubric);
    session.save(root).context("failed to write session")?;

    if json {
        print_json(&serde_json::json!({ "rubricId": id }))
    } else {
        println!("Added rubric {id} from template '{key}'.");
        Ok(())
    }
}

fn add_standard(root: &Path, code: &str, framework: Option<&str>, json: bool) -> anyhow::Result<()> {
    let (config, mut session) = load_project(root)?;
    let framework = parse_framework(framework)?;
    let entry = search_standards(framework, code)
        .into_iter()
        .find(|s| s.code.eq_ignore_ascii_case(code))
        .with_context(|| format!("no standard with code '{code}'"))?;
    let standard = entry.to_standard(&config.policy());
    let key = standard.key();
    let added = session.align_standard(standard);
    if added {
        session.save(root).context("failed to write session")?;
    }

    if json {
        print_json(&serde_json::json!({ "standard": key, "added": added }))
    } else if added {
        println!("Aligned {key}.");
        Ok(())
    } else {
        println!("{key} is already aligned.");
        Ok(())
    }
}
