//! `remix check`: confirm the configured provider answers.

use anyhow::Result;
use console::style;

use remix_infra::llm::check_provider;

use crate::cli::spinner;
use crate::state::AppState;

pub async fn check(state: &AppState, json: bool) -> Result<()> {
    let provider = state.provider()?;

    let progress = spinner(format!("Contacting {}...", provider.name()));
    let result = check_provider(&provider).await;
    progress.finish_and_clear();

    if json {
        let report = match &result {
            Ok(reply) => serde_json::json!({
                "ok": true,
                "provider": provider.name(),
                "model": provider.model(),
                "reply": reply.as_str(),
            }),
            Err(e) => serde_json::json!({
                "ok": false,
                "provider": provider.name(),
                "model": provider.model(),
                "type": e.kind(),
                "error": e.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        result?;
        return Ok(());
    }

    println!();
    println!(
        "  {}  {}",
        style("Provider:").bold(),
        style(provider.name()).cyan()
    );
    if let Some(model) = provider.model() {
        println!("  {}     {}", style("Model:").bold(), model);
    }
    println!(
        "  {}  {}",
        style("Data dir:").bold(),
        style(state.data_dir.display()).dim()
    );
    println!();

    let reply = result?;
    println!("  {} Provider answered:", style("✓").green().bold());
    println!("  {}", style(reply.as_str().trim()).dim());
    println!();

    Ok(())
}
