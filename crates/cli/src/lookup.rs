//! `qgrid lookup` and `qgrid candidates`.

use std::time::Duration;

use questgrid_resolve::identity::pick_canonical;
use questgrid_resolve::{
    Candidate, LookupOptions, ProgressSnapshot, QuestRecord, Resolution, ResolutionPipeline,
};
use serde::Serialize;

use crate::exit_codes::{resolution_exit_code, EXIT_HANDLE_NOT_FOUND};
use crate::output::{print_json, progress_bar, Meta};
use crate::settings::Settings;
use crate::CliError;

const BAR_WIDTH: usize = 20;

#[derive(Serialize)]
struct LookupReport<'a> {
    meta: Meta,
    handle: &'a str,
    resolution: &'a Resolution,
}

pub fn cmd_lookup(
    settings: &Settings,
    handle: &str,
    json: bool,
    timeout_secs: Option<u64>,
) -> Result<(), CliError> {
    let source = settings.open_source()?;
    let pipeline = ResolutionPipeline::new(source, settings.resolver.clone());
    let options = LookupOptions {
        timeout: timeout_secs.map(Duration::from_secs),
    };

    let resolution = pipeline
        .resolve_with(handle, &options)
        .map_err(CliError::source)?;

    if json {
        print_json(&LookupReport {
            meta: Meta::now(settings.origin.as_deref()),
            handle,
            resolution: &resolution,
        })?;
    }

    // Human summary to stderr
    print_summary(&resolution);

    outcome(settings, handle, &resolution)
}

fn print_summary(resolution: &Resolution) {
    match resolution {
        Resolution::Resolved(player) => {
            eprintln!(
                "{} ({})",
                player.identity.handle, player.identity.display_name
            );
            print_progress(&player.progress);
            eprintln!(
                "completed ({}): {}",
                player.quests_completed.len(),
                quest_list(&player.quests_completed, true)
            );
            eprintln!(
                "open ({}): {}",
                player.quests_open.len(),
                quest_list(&player.quests_open, false)
            );
            if player.candidate_count > 1 {
                eprintln!(
                    "note: handle listed {} times, using row {} col {}",
                    player.candidate_count,
                    player.candidate.row + 1,
                    player.candidate.col + 1
                );
            }
        }
        Resolution::NameRowNotFound { identity, progress } => {
            eprintln!("{} ({})", identity.handle, identity.display_name);
            print_progress(progress);
        }
        Resolution::HandleNotFound { .. } | Resolution::TimedOut { .. } => {}
    }
}

fn print_progress(progress: &ProgressSnapshot) {
    eprintln!(
        "level {}  {}  {}",
        progress.level,
        progress_bar(progress.progress, BAR_WIDTH),
        progress.label
    );
    if progress.is_terminal {
        eprintln!("status: game over");
    }
}

fn quest_list(quests: &[QuestRecord], completed: bool) -> String {
    if quests.is_empty() {
        return "-".to_string();
    }
    quests
        .iter()
        .map(|q| {
            if completed {
                format!("{} (+{} XP)", q.definition.label, q.display_xp)
            } else {
                format!("{} ({} XP)", q.definition.label, q.display_xp)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn outcome(settings: &Settings, handle: &str, resolution: &Resolution) -> Result<(), CliError> {
    let code = resolution_exit_code(resolution);
    match resolution {
        Resolution::Resolved(_) => Ok(()),
        Resolution::HandleNotFound { .. } => Err(CliError::new(
            code,
            format!(
                "handle '{}' not found in sheet '{}'",
                handle.trim(),
                settings.resolver.identity.sheet
            ),
        )
        .with_hint("handles match case-insensitively; check [identity] header_marker")),
        Resolution::NameRowNotFound { identity, .. } => Err(CliError::new(
            code,
            format!(
                "no row in sheet '{}' matches name '{}'",
                settings.resolver.quests.sheet, identity.display_name
            ),
        )
        .with_hint(format!(
            "names are searched in the first {} columns from row {}",
            settings.resolver.names.window,
            settings.resolver.quests.data_start_row + 1
        ))),
        Resolution::TimedOut { stage } => Err(CliError::new(
            code,
            format!("lookup timed out during {stage}"),
        )
        .with_hint("raise --timeout")),
    }
}

// ============================================================================
// candidates
// ============================================================================

#[derive(Serialize)]
struct CandidateEntry<'a> {
    #[serde(flatten)]
    candidate: &'a Candidate,
    chosen: bool,
}

#[derive(Serialize)]
struct CandidatesReport<'a> {
    meta: Meta,
    handle: &'a str,
    candidates: Vec<CandidateEntry<'a>>,
}

pub fn cmd_candidates(settings: &Settings, handle: &str, json: bool) -> Result<(), CliError> {
    let pipeline = ResolutionPipeline::new(settings.open_source()?, settings.resolver.clone());
    let candidates = pipeline.candidates(handle).map_err(CliError::source)?;
    let chosen = pick_canonical(&candidates);

    let entries: Vec<CandidateEntry> = candidates
        .iter()
        .map(|c| CandidateEntry {
            candidate: c,
            chosen: chosen.is_some_and(|w| std::ptr::eq(w, c)),
        })
        .collect();

    if json {
        print_json(&CandidatesReport {
            meta: Meta::now(settings.origin.as_deref()),
            handle,
            candidates: entries,
        })?;
    } else {
        for entry in &entries {
            let c = entry.candidate;
            eprintln!(
                "{} row {:>4} col {:>3}  xp {:>6}  level {:<10} status {:<12}{}",
                if entry.chosen { "*" } else { " " },
                c.row + 1,
                c.col + 1,
                c.xp,
                c.level_raw,
                c.status,
                if c.is_terminal { "  (terminal)" } else { "" }
            );
        }
    }

    if candidates.is_empty() {
        return Err(CliError::new(
            EXIT_HANDLE_NOT_FOUND,
            format!(
                "handle '{}' not found in sheet '{}'",
                handle.trim(),
                settings.resolver.identity.sheet
            ),
        ));
    }
    Ok(())
}
