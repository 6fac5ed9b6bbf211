//! Saved-post CLI commands: list, show, edit, delete, share.

use anyhow::{Result, anyhow};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Editor};

use remix_infra::share::share_url;
use remix_types::platform::Platform;
use remix_types::post::{PostId, SavedPost};

use crate::cli::{format_length, format_relative_time, preview, spinner};
use crate::state::AppState;

fn parse_id(raw: &str) -> Result<PostId> {
    raw.parse()
        .map_err(|_| anyhow!("'{raw}' is not a post id"))
}

async fn load(state: &AppState, raw_id: &str) -> Result<SavedPost> {
    let id = parse_id(raw_id)?;
    Ok(state.post_service.get(&id, &state.default_owner()).await?)
}

/// List saved posts for a platform in a table, newest first.
pub async fn list_posts(
    state: &AppState,
    platform: Platform,
    limit: Option<i64>,
    json: bool,
) -> Result<()> {
    let posts = state
        .post_service
        .list(platform, &state.default_owner(), limit)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }

    if posts.is_empty() {
        println!();
        println!(
            "  {} No saved {} yet. Create some with: {}",
            style("i").blue().bold(),
            platform.plural_label(),
            style(format!("remix generate --platform {platform}")).yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Post").fg(Color::White),
        Cell::new("Length").fg(Color::White),
        Cell::new("Saved").fg(Color::White),
    ]);

    for post in &posts {
        let count = post.content.chars().count();
        let length = Cell::new(format!("{count}/{}", platform.char_limit()));
        let length = if platform.fits(&post.content) {
            length.fg(Color::DarkGrey)
        } else {
            length.fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(post.id.to_string()).fg(Color::DarkGrey),
            Cell::new(preview(&post.content, 60)).fg(Color::Cyan),
            length,
            Cell::new(format_relative_time(&post.created_at)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} {} post{}",
        style(posts.len()).bold(),
        platform,
        if posts.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Show one saved post in full.
pub async fn show_post(state: &AppState, raw_id: &str, json: bool) -> Result<()> {
    let post = load(state, raw_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&post)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("── Post ──").dim());
    for line in post.content.lines() {
        println!("  {line}");
    }
    println!();
    println!("  {}", style("── Details ──").dim());
    println!("  {}        {}", style("ID:").bold(), style(post.id.to_string()).dim());
    println!("  {}  {}", style("Platform:").bold(), post.platform);
    println!("  {}    {}", style("Length:").bold(), format_length(&post.content, post.platform));
    println!(
        "  {}   {}",
        style("Created:").bold(),
        post.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    if post.updated_at != post.created_at {
        println!(
            "  {}   {}",
            style("Updated:").bold(),
            post.updated_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    println!();

    Ok(())
}

/// Replace a post's content, from `--content` or an editor.
pub async fn edit_post(
    state: &AppState,
    raw_id: &str,
    content: Option<String>,
    json: bool,
) -> Result<()> {
    let post = load(state, raw_id).await?;

    let edited = match content {
        Some(c) => Some(c),
        None => Editor::new().edit(&post.content)?,
    };

    let Some(edited) = edited.filter(|e| e.trim_end() != post.content.trim_end()) else {
        if json {
            println!("{}", serde_json::to_string_pretty(&post)?);
        } else {
            println!("  No changes.");
        }
        return Ok(());
    };

    let progress = spinner("Updating post...");
    let result = state
        .post_service
        .update(&post.id, edited.trim_end(), &state.default_owner())
        .await;
    progress.finish_and_clear();
    let updated = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        println!(
            "  {} Post {} updated ({}).",
            style("✓").green().bold(),
            style(updated.id.to_string()).dim(),
            format_length(&updated.content, updated.platform)
        );
    }

    Ok(())
}

/// Delete a saved post permanently with confirmation.
pub async fn delete_post(state: &AppState, raw_id: &str, force: bool, json: bool) -> Result<()> {
    let post = load(state, raw_id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete '{}'?",
                style(preview(&post.content, 40)).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let progress = spinner("Deleting post...");
    let result = state
        .post_service
        .delete(&post.id, &state.default_owner())
        .await;
    progress.finish_and_clear();
    result?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "id": post.id}));
    } else {
        println!("  {} Post deleted.", style("✓").red().bold());
    }

    Ok(())
}

/// Print the platform share link for a saved post.
pub async fn share_post(
    state: &AppState,
    raw_id: &str,
    page_url: Option<&str>,
    json: bool,
) -> Result<()> {
    let post = load(state, raw_id).await?;
    let url = share_url(post.platform, &post.content, page_url)?;

    if json {
        println!(
            "{}",
            serde_json::json!({"id": post.id, "platform": post.platform, "url": url.as_str()})
        );
    } else {
        println!();
        println!("  {} Share on {}:", style("↗").cyan().bold(), post.platform);
        println!("  {}", style(url.as_str()).underlined());
        println!();
    }

    Ok(())
}
