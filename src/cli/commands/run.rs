//! Scheduler run command.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use console::style;
use tokio::sync::watch;
use tracing::info;

use crate::cli::helpers::open_context;
use crate::config::Settings;
use crate::oracle::OllamaOracle;
use crate::pipeline::{Scheduler, SystemClock};

pub async fn cmd_run(
    data_dir: &Path,
    settings: &Settings,
    once: bool,
    break_secs: Option<u64>,
) -> anyhow::Result<()> {
    let ctx = open_context(data_dir, settings)?;
    ctx.init_schema().await?;

    let oracle = OllamaOracle::new(settings.oracle.clone())?;
    if !oracle.is_available().await {
        println!(
            "{} Oracle not reachable at {} — sections will fail until it is",
            style("!").yellow(),
            settings.oracle.endpoint
        );
    }

    let mut config = settings.pipeline.scheduler_config();
    if let Some(secs) = break_secs {
        config.break_duration = Duration::from_secs(secs);
    }

    let scheduler = Scheduler::new(
        Arc::new(ctx.jobs()),
        Arc::new(ctx.bank()),
        Arc::new(oracle),
        Arc::new(SystemClock),
        config,
    );

    if once {
        let outcome = scheduler.tick().await?;
        println!("tick: {outcome:?}");
        return Ok(());
    }

    println!(
        "{} Scheduler running (tick every {}s, Ctrl-C to stop)",
        style("▶").green(),
        settings.pipeline.tick_secs
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    scheduler.run(shutdown_rx).await;
    println!("{} Scheduler stopped", style("■").yellow());

    // In-flight work interrupted by Ctrl-C is requeued on the next run.
    Ok(())
}
