//! `remix generate`: run one generation cycle and curate the result.

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::MultiSelect;
use futures_util::future::join_all;

use remix_types::generation::GenerationRequest;
use remix_types::platform::Platform;
use remix_types::post::{CandidateState, CandidateView};

use crate::cli::{preview, spinner};
use crate::state::AppState;

pub struct GenerateArgs {
    pub text: Option<String>,
    pub file: Option<PathBuf>,
    pub platform: Platform,
    pub prompt: Option<String>,
    pub save: Option<String>,
    pub no_interactive: bool,
}

/// Generate candidates, let the user pick some, and save them.
///
/// # Examples
///
/// ```bash
/// remix generate "$(cat post.md)" --platform linkedin
/// remix generate --file post.md --save all
/// cat post.md | remix generate --save 1,3 --no-interactive
/// ```
pub async fn generate(state: &AppState, args: GenerateArgs, json: bool) -> Result<()> {
    let source = read_source(args.text, args.file.as_deref()).await?;
    let platform = args.platform;
    let template = args
        .prompt
        .unwrap_or_else(|| state.config.prompts.template_for(platform).to_string());

    let request = GenerationRequest::new(source, template, platform);
    let controller = state.controller(platform)?;

    let progress = spinner(format!("Generating {}...", platform.plural_label()));
    let result = controller.run_generation(&request).await;
    progress.finish_and_clear();
    let candidates = result?;

    if candidates.is_empty() {
        if json {
            println!("{}", serde_json::json!({ "candidates": [], "saved": [] }));
        } else {
            println!();
            println!(
                "  {} The reply contained no usable {}.",
                style("i").blue().bold(),
                platform.plural_label()
            );
            println!();
        }
        return Ok(());
    }

    let interactive = !json && !args.no_interactive && std::io::stdin().is_terminal();

    if !json {
        print_candidates(&controller.candidates().await, platform);
    }

    let selected = match args.save.as_deref() {
        Some(selection) => parse_selection(selection, candidates.len()).map_err(anyhow::Error::msg)?,
        None if interactive => {
            let items: Vec<String> = candidates
                .iter()
                .map(|c| format!("{}  ({})", preview(&c.content, 70), c.char_count()))
                .collect();
            MultiSelect::new()
                .with_prompt("Select posts to save (space to toggle, enter to confirm)")
                .items(&items)
                .interact()?
        }
        None => Vec::new(),
    };

    if !selected.is_empty() {
        let progress = spinner(format!("Saving {} post(s)...", selected.len()));
        let saves = selected.iter().map(|&i| controller.save(&candidates[i]));
        let results = join_all(saves).await;
        progress.finish_and_clear();

        if !json {
            println!();
            for (&i, result) in selected.iter().zip(&results) {
                match result {
                    Ok(post) => println!(
                        "  {} Saved #{} as {}",
                        style("✓").green().bold(),
                        i + 1,
                        style(post.id.to_string()).dim()
                    ),
                    Err(e) => println!("  {} #{} not saved: {e}", style("✗").red().bold(), i + 1),
                }
            }
        }
    }

    let views = controller.candidates().await;

    if json {
        let saved: Vec<_> = controller
            .saved_posts()
            .await
            .into_iter()
            .map(|v| v.post)
            .collect();
        let output = serde_json::json!({
            "candidates": views,
            "saved": saved,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let failed = views
        .iter()
        .filter(|v| matches!(v.state, CandidateState::SaveFailed { .. }))
        .count();
    if !selected.is_empty() {
        println!();
        if controller.is_view_stale().await {
            println!(
                "  {} Saved, but the post list could not be refreshed.",
                style("!").yellow().bold()
            );
        } else {
            let total = controller.saved_posts().await.len();
            println!(
                "  {} {} saved {} on file",
                style(total).bold(),
                platform,
                if total == 1 { "post" } else { "posts" }
            );
        }
        if failed > 0 {
            println!(
                "  {} {failed} post(s) failed to save",
                style("✗").red().bold()
            );
        }
        println!();
    }

    Ok(())
}

async fn read_source(text: Option<String>, file: Option<&std::path::Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()));
    }
    if std::io::stdin().is_terminal() {
        bail!("no source text: pass TEXT, --file, or pipe it on stdin");
    }
    let source = tokio::task::spawn_blocking(|| {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map(|_| buf)
    })
    .await??;
    Ok(source)
}

fn print_candidates(views: &[CandidateView], platform: Platform) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Post").fg(Color::White),
        Cell::new("Length").fg(Color::White),
        Cell::new("State").fg(Color::White),
    ]);

    for view in views {
        let state_cell = match &view.state {
            CandidateState::Generated => Cell::new("○ generated").fg(Color::DarkGrey),
            CandidateState::Saving => Cell::new("◌ saving").fg(Color::Yellow),
            CandidateState::Saved { .. } => Cell::new("● saved").fg(Color::Green),
            CandidateState::SaveFailed { .. } => Cell::new("✗ failed").fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(view.candidate.ordinal + 1).fg(Color::Cyan),
            Cell::new(&view.candidate.content),
            length_cell(&view.candidate.content, platform),
            state_cell,
        ]);
    }

    println!();
    println!("{table}");
    println!();
}

fn length_cell(content: &str, platform: Platform) -> Cell {
    let text = format!("{}/{}", content.chars().count(), platform.char_limit());
    if platform.fits(content) {
        Cell::new(text).fg(Color::DarkGrey)
    } else {
        Cell::new(text).fg(Color::Red)
    }
}

/// Parse `all` or a comma-separated list of 1-based positions into sorted,
/// de-duplicated 0-based indices.
pub fn parse_selection(selection: &str, count: usize) -> Result<Vec<usize>, String> {
    let selection = selection.trim();
    if selection.eq_ignore_ascii_case("all") {
        return Ok((0..count).collect());
    }

    let mut picked = Vec::new();
    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let n: usize = part
            .parse()
            .map_err(|_| format!("'{part}' is not a position"))?;
        if n == 0 || n > count {
            return Err(format!("position {n} is out of range (1-{count})"));
        }
        picked.push(n - 1);
    }
    if picked.is_empty() {
        return Err("nothing selected".to_string());
    }
    picked.sort_unstable();
    picked.dedup();
    Ok(picked)
}
