//! CLI command definitions for the `remix` binary.
//!
//! Uses clap derive macros for argument parsing. Resource commands follow a
//! verb-noun pattern (e.g., `remix list posts`, `remix delete post <id>`).

pub mod check;
pub mod generate;
pub mod post;

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use remix_types::platform::Platform;

/// Turn long-form text into ready-to-post social content.
#[derive(Parser)]
#[command(name = "remix", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for info, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Data directory (config.toml, remix.db).
    #[arg(long, global = true, env = "REMIX_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Model to request from the provider.
    #[arg(long, global = true, env = "REMIX_MODEL")]
    pub model: Option<String>,

    /// Generate through a running `remix serve` at this URL instead of
    /// calling the provider directly.
    #[arg(long, global = true, env = "REMIX_REMOTE_URL")]
    pub remote: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate candidate posts from source text and pick which to save.
    #[command(alias = "gen")]
    Generate {
        /// Source text. Read from --file or stdin when omitted.
        text: Option<String>,

        /// Read the source text from a file.
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Platform to write for.
        #[arg(short, long, default_value = "twitter")]
        platform: Platform,

        /// Prompt template. Defaults to the configured template for the platform.
        #[arg(long)]
        prompt: Option<String>,

        /// Save without asking: `all`, or 1-based positions like `1,3`.
        #[arg(long)]
        save: Option<String>,

        /// Never prompt; only save what --save names.
        #[arg(long)]
        no_interactive: bool,
    },

    /// List resources.
    #[command(alias = "ls")]
    List {
        #[command(subcommand)]
        resource: ListResource,
    },

    /// Show one saved post.
    Show {
        /// Post id.
        id: String,
    },

    /// Edit a resource.
    Edit {
        #[command(subcommand)]
        resource: EditResource,
    },

    /// Delete a resource.
    #[command(alias = "rm")]
    Delete {
        #[command(subcommand)]
        resource: DeleteResource,
    },

    /// Print the platform share link for a saved post.
    Share {
        /// Post id.
        id: String,

        /// Page to attach to a LinkedIn share.
        #[arg(long)]
        page_url: Option<String>,
    },

    /// Send a test prompt to the provider.
    Check,

    /// Start the HTTP server.
    Serve {
        /// Port to listen on. Defaults to the configured port.
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to. Defaults to the configured host.
        #[arg(long)]
        host: Option<String>,

        /// Log one JSON object per line.
        #[arg(long)]
        log_json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ListResource {
    /// List saved posts, newest first.
    Posts {
        #[arg(short, long, default_value = "twitter")]
        platform: Platform,

        /// Maximum number of posts.
        #[arg(short, long)]
        limit: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum EditResource {
    /// Replace a saved post's content.
    Post {
        /// Post id.
        id: String,

        /// New content. Opens an editor when omitted.
        #[arg(long)]
        content: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum DeleteResource {
    /// Permanently delete a saved post.
    Post {
        /// Post id.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

// --- Shared output helpers ---

pub(crate) fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// `chars/limit`, red when over the platform limit.
pub(crate) fn format_length(content: &str, platform: Platform) -> String {
    let count = content.chars().count();
    let text = format!("{count}/{}", platform.char_limit());
    if platform.fits(content) {
        format!("{}", style(text).dim())
    } else {
        format!("{}", style(text).red().bold())
    }
}

pub(crate) fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let diff = Utc::now() - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

/// First line of `content`, cut to `max` characters.
pub(crate) fn preview(content: &str, max: usize) -> String {
    let first = content.lines().next().unwrap_or("");
    if first.chars().count() > max {
        let cut: String = first.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else if content.lines().nth(1).is_some() {
        format!("{first} ...")
    } else {
        first.to_string()
    }
}
