//! Session startup: resolve flags and config into session options, print
//! the banner, and hand over to the session runtime.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use stencil_core::config::{self, Config};
use stencil_core::paths::{default_workspace_parent, stencil_root, workspace_root};
use stencil_core::{Environment, ShutdownMode};
use stencil_daemon::{start_blocking, SessionOptions};
use stencil_remote::HttpRemote;

#[derive(Args, Debug, Default)]
pub struct LaunchArgs {
    /// API token sent as a bearer credential with every request.
    #[arg(short = 't', long)]
    pub token: Option<String>,

    /// Backend environment: localhost, development or production.
    #[arg(short = 'e', long = "env", default_value = "production")]
    pub env: String,

    /// Parent directory for the session workspace.
    #[arg(short = 'p', long)]
    pub path: Option<PathBuf>,

    /// Push pending edits before exiting instead of discarding them.
    #[arg(long)]
    pub flush_on_exit: bool,

    /// Quiet period before a modified file is pushed, in milliseconds.
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

/// Everything needed to start a session.
#[derive(Debug)]
struct LaunchPlan {
    token: String,
    options: SessionOptions,
    warnings: Vec<String>,
}

impl LaunchArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = config::load_at(&home).context("failed to load config")?;
        let plan = self.plan(&home, &config)?;

        for warning in &plan.warnings {
            eprintln!("{} {warning}", "warning:".yellow().bold());
        }
        print_banner(&plan.options);

        let remote = HttpRemote::new(
            plan.options.base_url.clone(),
            plan.token,
            config.request_timeout(),
        );
        start_blocking(plan.options, Arc::new(remote)).context("session exited with error")
    }

    fn plan(&self, home: &Path, config: &Config) -> Result<LaunchPlan> {
        let token = self
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .context("missing API token; pass --token <TOKEN>")?;

        let mut warnings = Vec::new();
        let environment = Environment::lookup(&self.env).unwrap_or_else(|| {
            warnings.push(format!(
                "unknown environment '{}', using {}",
                self.env,
                Environment::Production
            ));
            Environment::Production
        });

        let parent = self
            .path
            .clone()
            .or_else(|| config.workspace_parent.clone())
            .unwrap_or_else(|| default_workspace_parent(home));
        let root = workspace_root(&parent, environment, token);

        let mut options = SessionOptions::from_config(root, environment, config);
        if let Some(ms) = self.debounce_ms {
            options.debounce = Duration::from_millis(ms);
        }
        if self.flush_on_exit {
            options.shutdown = ShutdownMode::Flush;
        }
        options.template_override_dir = Some(stencil_root(home));

        Ok(LaunchPlan {
            token: token.to_string(),
            options,
            warnings,
        })
    }
}

fn print_banner(options: &SessionOptions) {
    println!(
        "{} {}",
        "stencil".bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    println!(
        "  {:<12} {} ({})",
        "environment",
        options.environment.to_string().cyan(),
        options.base_url
    );
    println!(
        "  {:<12} {}",
        "workspace",
        options.root.display().to_string().green()
    );
    let on_exit = match options.shutdown {
        ShutdownMode::Discard => "pending edits are discarded",
        ShutdownMode::Flush => "pending edits are pushed",
    };
    println!(
        "  Edits are pushed {} ms after the last save. Press Ctrl-C to stop; the workspace is deleted and {on_exit}.",
        options.debounce.as_millis()
    );
}
