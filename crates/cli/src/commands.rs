//! Subcommand implementations.

use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use colored::Colorize;
use ps_core::config::loader::load_config;
use ps_core::config::models::{AppConfig, ConfigSource};
use ps_core::content::ContentProvider;
use ps_core::init::{generate_showcase_structure, InitOptions};
use ps_core::state::manager::start_session;
use ps_protocol::catalog_models::{Catalog, ProcessDef};
use ps_protocol::ipc::{Event, Op};
use std::path::Path;
use tracing::{debug, info};

pub async fn load(root: &Path) -> Result<AppConfig> {
    let config = load_config(root)
        .await
        .wrap_err_with(|| format!("Failed to load the showcase under {}", root.display()))?;
    match &config.source {
        ConfigSource::Directory(dir) => debug!(dir = %dir.display(), "Loaded catalog from disk"),
        ConfigSource::Embedded => debug!("Using the built-in catalog"),
    }
    Ok(config)
}

fn find_process<'a>(catalog: &'a Catalog, process_id: &str) -> Result<&'a ProcessDef> {
    catalog.process(process_id).ok_or_else(|| {
        let known: Vec<&str> = catalog.processes.iter().map(|p| p.id.as_str()).collect();
        eyre!(
            "Unknown process '{}'. Available: {}",
            process_id,
            known.join(", ")
        )
    })
}

pub async fn init(root: &Path, force: bool, minimal: bool) -> Result<()> {
    let written = generate_showcase_structure(InitOptions {
        target_dir: root.to_path_buf(),
        force,
        minimal,
    })
    .await?;

    println!(
        "{} {} files into {}",
        "Wrote".green().bold(),
        written.len(),
        root.join(".showcase").display()
    );
    for path in written {
        println!("  {path}");
    }
    Ok(())
}

pub async fn list(root: &Path, json: bool) -> Result<()> {
    let config = load(root).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(config.catalog.as_ref())?);
        return Ok(());
    }

    for process in &config.catalog.processes {
        println!(
            "{:<12} {} ({} stages)",
            process.id.bold(),
            process.title,
            process.stage_count()
        );
        for (i, stage) in process.stages.iter().enumerate() {
            let marker = if config.content.lookup(&process.id, &stage.id).is_some() {
                " "
            } else {
                "!"
            };
            println!("  {marker}{}. {:<10} {}", i + 1, stage.id, stage.name.dimmed());
        }
    }
    Ok(())
}

pub async fn show(root: &Path, process_id: &str, stage_id: &str) -> Result<()> {
    let config = load(root).await?;
    let process = find_process(&config.catalog, process_id)?;
    let Some(stage) = process.stage(stage_id) else {
        bail!("Unknown stage '{}' in process '{}'", stage_id, process_id);
    };

    let Some(content) = config.content.lookup(&process.id, &stage.id) else {
        println!("{} has no code sample", stage.name);
        return Ok(());
    };

    println!("{}", content.title.bold());
    if !content.description.is_empty() {
        println!("{}", content.description.dimmed());
    }
    if !content.tools.is_empty() {
        println!("{} {}", "Tools:".cyan(), content.tools.join(", "));
    }
    if !content.language.is_empty() {
        println!("{}", format!("[{}]", content.language).dimmed());
    }
    println!();
    println!("{}", content.source_text);
    Ok(())
}

/// One output line for a run event, or `None` for events not printed.
fn format_event(catalog: &Catalog, event: &Event) -> Option<String> {
    let stage_name = |id: &str| {
        catalog
            .processes
            .iter()
            .find_map(|p| p.stage(id))
            .map_or_else(|| id.to_string(), |s| s.name.clone())
    };

    let line = match event {
        Event::RunStarted {
            process_id,
            stage_count,
            ..
        } => format!(
            "{} {} ({} stages)",
            "▶ Running".cyan().bold(),
            process_id,
            stage_count
        ),
        Event::StageStarted {
            stage_id, index, ..
        } => format!(
            "  [{}] {} {}...",
            index + 1,
            "Executing".yellow(),
            stage_name(stage_id)
        ),
        Event::RevealFinished { stage_id, .. } => {
            format!("      {} code walkthrough complete", stage_name(stage_id).dimmed())
        }
        Event::StageCompleted { stage_id, .. } => {
            format!("      {} {}", "✓".green().bold(), stage_name(stage_id))
        }
        Event::RunCompleted { .. } => "✓ Pipeline finished".green().bold().to_string(),
        Event::RunCancelled { completed, .. } => format!(
            "{} after {} stage(s)",
            "✗ Run cancelled".red().bold(),
            completed.len()
        ),
        Event::OpRejected { reason } => format!("{} {}", "Rejected:".red(), reason),
        Event::ProcessSelected { .. }
        | Event::StageSelected { .. }
        | Event::RevealProgress { .. } => return None,
    };
    Some(line)
}

/// Play one run of `process_id` headlessly, printing events until it ends.
/// Ctrl-C cancels the run.
pub async fn run(root: &Path, process_id: &str, speed: f64) -> Result<()> {
    if !speed.is_finite() || speed <= 0.0 {
        bail!("--speed must be a positive number, got {}", speed);
    }

    let config = load(root).await?;
    let process = find_process(&config.catalog, process_id)?;
    if process.stages.is_empty() {
        bail!("Process '{}' has no stages", process_id);
    }

    let timing = config.timing().scaled(speed);
    info!(process_id, speed, dwell_ms = timing.stage_dwell_ms, "Starting headless run");

    let mut session = start_session(&config, timing)?;
    if session.simulator.snapshot().active_process != process.id {
        session.op_tx.send(Op::SelectProcess {
            process_id: process.id.clone(),
        })?;
    }
    session.op_tx.send(Op::StartRun)?;

    let mut cancel_sent = false;
    let outcome = loop {
        tokio::select! {
            event = session.event_rx.recv() => {
                let Some(event) = event else {
                    break Err(eyre!("Simulator stopped before the run ended"));
                };
                if let Some(line) = format_event(&config.catalog, &event) {
                    println!("{line}");
                }
                match event {
                    Event::RunCompleted { .. } => break Ok(()),
                    Event::RunCancelled { .. } => break Err(eyre!("Run cancelled")),
                    Event::OpRejected { reason } => break Err(eyre!(reason)),
                    _ => {}
                }
            }
            signal = tokio::signal::ctrl_c(), if !cancel_sent => {
                signal.wrap_err("Failed to listen for Ctrl-C")?;
                cancel_sent = true;
                session.op_tx.send(Op::CancelRun)?;
            }
        }
    };

    session.op_tx.send(Op::Shutdown)?;
    session.task.await?;
    outcome
}
