//! transition-router
//!
//! Runs a scripted sequence of navigations against a route tree declared in
//! a TOML file and prints the resulting router state as JSON.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml
//!       │
//!       ▼
//!  ┌──────────┐   routes    ┌──────────┐   matches   ┌───────────────┐
//!  │  config  │────────────▶│ routing  │────────────▶│  navigation   │
//!  │ fixtures │             │  tree +  │             │ Router        │
//!  └──────────┘             │ matcher  │             │  executor     │
//!       │ script            └──────────┘             │  revalidation │
//!       │                                            │  redirects    │
//!       └───────────────── navigate() ──────────────▶│  boundaries   │
//!                                                    └──────┬────────┘
//!                                     push/replace/pop      │ commit
//!                                   ┌─────────────┐         ▼
//!                                   │   history   │◀── RouterState (ArcSwap)
//!                                   │  (memory)   │         │ broadcast
//!                                   └─────────────┘         ▼
//!                                                        stdout (JSON)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast::error::RecvError;

use transition_router::config::fixtures::build_routes;
use transition_router::config::load_config;
use transition_router::config::schema::NavigationStep;
use transition_router::history::MemoryHistory;
use transition_router::navigation::{
    NavigateOptions, NavigationOutcome, NavigationTarget, Router, Submission,
};
use transition_router::observability::logging::init_logging;
use transition_router::routing::RouteTree;

#[derive(Parser)]
#[command(name = "transition-router")]
#[command(about = "Run scripted navigations against a declared route tree", long_about = None)]
struct Cli {
    /// Path to the TOML configuration.
    #[arg(short, long)]
    config: PathBuf,

    /// Only load and validate the configuration.
    #[arg(long)]
    validate: bool,

    /// Print every committed state, not just the final one.
    #[arg(long)]
    follow: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    if cli.validate {
        println!("{}: configuration OK", cli.config.display());
        return Ok(());
    }

    init_logging(&config.observability)?;
    tracing::info!(
        config = %cli.config.display(),
        routes = config.routes.len(),
        navigations = config.navigations.len(),
        "transition-router v0.1.0 starting"
    );

    let tree = RouteTree::new(build_routes(&config.routes))?;
    let entries = &config.history.entries;
    let index = config
        .history
        .index
        .unwrap_or(entries.len().saturating_sub(1));
    let history = MemoryHistory::with_entries(entries.iter().map(String::as_str), index);

    let router = Router::new(
        tree,
        Arc::new(history.clone()),
        config.router.clone(),
        config.hydration.clone(),
    )?;

    if cli.follow {
        let mut rx = router.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(state) => match serde_json::to_string(&*state) {
                        Ok(line) => println!("{}", line),
                        Err(e) => tracing::warn!(error = %e, "Failed to serialize state"),
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "State stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    router.initialize().await?;

    for (i, step) in config.navigations.iter().enumerate() {
        let outcome = run_step(&router, &history, step).await?;
        tracing::info!(
            step = i + 1,
            outcome = outcome_label(&outcome),
            location = %router.state().location.href(),
            "Navigation step finished"
        );
    }

    let state = router.state();
    println!("{}", serde_json::to_string_pretty(&*state)?);

    router.dispose();
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_step(
    router: &Router,
    history: &MemoryHistory,
    step: &NavigationStep,
) -> Result<NavigationOutcome, Box<dyn std::error::Error>> {
    if step.revalidate {
        return Ok(router.revalidate().await?);
    }

    if let Some(delta) = step.delta {
        let mut rx = router.subscribe();
        let before = history.index();
        let outcome = router
            .navigate(NavigationTarget::Delta(delta), NavigateOptions::new())
            .await?;
        if history.index() != before {
            wait_for_idle(&mut rx).await;
        }
        return Ok(outcome);
    }

    let Some(to) = step.to.as_deref() else {
        return Err("navigation step has no target".into());
    };
    let mut options = NavigateOptions::new();
    if step.replace {
        options = options.replace();
    }
    if let Some(method) = step.method {
        options = options.submission(Submission::new(method, step.form.clone()));
    }
    Ok(router.navigate(to, options).await?)
}

/// Pops are driven by the router's history listener; wait for the result.
async fn wait_for_idle(rx: &mut tokio::sync::broadcast::Receiver<Arc<transition_router::RouterState>>) {
    loop {
        match rx.recv().await {
            Ok(state) if state.is_idle() => break,
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

fn outcome_label(outcome: &NavigationOutcome) -> &'static str {
    match outcome {
        NavigationOutcome::Committed(_) => "committed",
        NavigationOutcome::Superseded => "superseded",
        NavigationOutcome::Delegated => "delegated",
    }
}
