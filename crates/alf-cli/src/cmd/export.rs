use crate::cmd::load_project;
use crate::output::print_json;
use alf_core::config::Config;
use alf_core::paths;
use alf_core::session::WizardSession;
use alf_core::snapshot::{
    copy_snapshot_preview, download_wizard_snapshot, render_snapshot_preview, snapshot_for,
    ClipboardSink, WizardSnapshot,
};
use alf_core::AlfError;
use std::path::Path;

fn current_snapshot(config: &Config, session: &WizardSession) -> WizardSnapshot {
    let snapshot = snapshot_for(&session.data, config);
    if snapshot.metrics.dangling_references > 0 {
        tracing::warn!(
            count = snapshot.metrics.dangling_references,
            "snapshot contains dangling references; see 'alf reconcile'"
        );
    }
    snapshot
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

pub fn run(root: &Path, out: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let (config, session) = load_project(root)?;
    let snapshot = current_snapshot(&config, &session);
    let dir = match out {
        Some(dir) => dir.to_path_buf(),
        None => paths::export_dir(root, config.export.dir.as_deref()),
    };
    let path = download_wizard_snapshot(&snapshot, &dir, &config.export.file_prefix)?;

    if json {
        print_json(&serde_json::json!({
            "path": path,
            "completeness": snapshot.completeness.summary,
            "metrics": snapshot.metrics,
        }))
    } else {
        println!("Wrote {}", path.display());
        println!("Overall readiness: {}%", snapshot.completeness.summary.overall);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// preview
// ---------------------------------------------------------------------------

pub fn preview(root: &Path) -> anyhow::Result<()> {
    let (config, session) = load_project(root)?;
    print!("{}", render_snapshot_preview(&current_snapshot(&config, &session)));
    Ok(())
}

// ---------------------------------------------------------------------------
// copy
// ---------------------------------------------------------------------------

#[cfg(not(target_os = "android"))]
struct SystemClipboard(arboard::Clipboard);

#[cfg(not(target_os = "android"))]
impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        self.0.set_text(text).map_err(|e| e.to_string())
    }
}

#[cfg(not(target_os = "android"))]
fn system_clipboard() -> Result<SystemClipboard, String> {
    arboard::Clipboard::new()
        .map(SystemClipboard)
        .map_err(|e| e.to_string())
}

/// On X11 and Wayland the selection is served by this process and is gone
/// once it exits, unless a clipboard manager has taken it over.
const CLIPBOARD_OUTLIVES_PROCESS: bool =
    !cfg!(all(unix, not(any(target_os = "macos", target_os = "android"))));

#[cfg(target_os = "android")]
struct SystemClipboard;

#[cfg(target_os = "android")]
impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, _text: &str) -> Result<(), String> {
        Err("no clipboard on this platform".to_string())
    }
}

#[cfg(target_os = "android")]
fn system_clipboard() -> Result<SystemClipboard, String> {
    Ok(SystemClipboard)
}

/// Copy the preview; when no clipboard is reachable, print the text instead
/// so it can still be copied by hand.
pub fn copy(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, session) = load_project(root)?;
    let snapshot = current_snapshot(&config, &session);

    let outcome = system_clipboard()
        .map_err(AlfError::ClipboardUnavailable)
        .and_then(|mut sink| copy_snapshot_preview(&snapshot, &mut sink));

    match outcome {
        Ok(text) if CLIPBOARD_OUTLIVES_PROCESS => {
            if json {
                print_json(&serde_json::json!({ "copied": true, "verified": true }))
            } else {
                println!("Preview copied to clipboard ({} characters).", text.chars().count());
                Ok(())
            }
        }
        Ok(text) => {
            if json {
                print_json(&serde_json::json!({
                    "copied": true,
                    "verified": false,
                    "text": text,
                }))
            } else {
                eprintln!("Preview sent to the clipboard; it is kept only if a clipboard manager is running. Preview follows.");
                print!("{text}");
                Ok(())
            }
        }
        Err(AlfError::ClipboardUnavailable(reason)) => {
            tracing::warn!(%reason, "clipboard unavailable, printing preview");
            let text = render_snapshot_preview(&snapshot);
            if json {
                print_json(&serde_json::json!({
                    "copied": false,
                    "verified": false,
                    "reason": reason,
                    "text": text,
                }))
            } else {
                eprintln!("Clipboard unavailable ({reason}); preview follows.");
                print!("{text}");
                Ok(())
            }
        }
        Err(e) => Err(e.into()),
    }
}
