//! Command implementations

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::info;

use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::session::SessionSnapshot;
use crate::cli::args::{CutArgs, PredictArgs, ProbeArgs, SettingsArgs, ToolsArgs};
use crate::cli::prompt::StdinOverwritePrompt;
use crate::domain::errors::{DomainError, InvalidRequest};
use crate::domain::model::{Severity, Tool, TrimRequest};
use crate::ports::{MediaToolsPort, SettingsPort, PREFER_INSTALLED_KEY};
use crate::utils::time::format_time_for_input;

/// Execute the probe command
pub async fn probe(container: &DefaultAppContainer, args: ProbeArgs) -> Result<()> {
    info!("Probing {}", args.input.display());
    let duration = container
        .toolkit()
        .media_duration(&args.input)
        .await
        .with_context(|| format!("Failed to probe {}", args.input.display()))?;

    if args.json {
        let report = json!({
            "input": args.input,
            "duration": duration,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{:.3}s ({})", duration, format_time_for_input(duration));
    }
    Ok(())
}

/// Execute the predict command
pub async fn predict(container: &DefaultAppContainer, args: PredictArgs) -> Result<()> {
    let request = TrimRequest::parse(&args.start, &args.end)?;
    if !request.is_executable() {
        return Err(DomainError::from(InvalidRequest::EmptyRange).into());
    }

    let prediction = container
        .toolkit()
        .predict_cut(&args.input, request.start, request.end)
        .await
        .with_context(|| format!("Failed to predict cut for {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        println!("{}", prediction);
    }
    Ok(())
}

/// Execute the cut command through a trim session
pub async fn cut(container: &DefaultAppContainer, args: CutArgs) -> Result<()> {
    let session = container.session(Arc::new(StdinOverwritePrompt::new(args.yes)));

    session
        .select_input(args.input.clone())
        .await
        .context("Loading the input failed")?;
    let loaded = session.snapshot();
    if loaded.status.is_error() {
        eprintln!("{}", loaded.status.text);
    }

    if let Some(output) = args.output {
        session.set_output(output)?;
    }
    session.set_start_text(args.start);
    if let Some(end) = args.end {
        session.set_end_text(end);
    }

    let mut handle = match session.request_cut().await {
        Ok(handle) => handle,
        Err(DomainError::InvalidRequest(InvalidRequest::EndClamped { end })) => {
            bail!(
                "End time exceeded file length ({}). Run again with --end {} or less.",
                format_time_for_input(end),
                format_time_for_input(end)
            );
        }
        Err(e) => return Err(e.into()),
    };

    let mut updates = session.subscribe();
    let mut last_percent = None;
    loop {
        tokio::select! {
            joined = &mut handle => {
                joined.context("Cut task failed")?;
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    (&mut handle).await.context("Cut task failed")?;
                    break;
                }
                let percent = (updates.borrow_and_update().progress * 100.0).round() as u32;
                if last_percent != Some(percent) {
                    last_percent = Some(percent);
                    eprint!("\rCutting... {:>3}%", percent);
                    let _ = std::io::stderr().flush();
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if signal.is_ok() && session.cancel_cut() {
                    eprintln!("\nCancelling...");
                }
            }
        }
    }
    if last_percent.is_some() {
        eprintln!();
    }

    report_cut(&session.snapshot())
}

fn report_cut(snapshot: &SessionSnapshot) -> Result<()> {
    if let Some(prediction) = snapshot.source.as_ref().and_then(|s| s.prediction) {
        println!("{}", prediction);
    }

    match snapshot.status.severity {
        Severity::Success => {
            println!("{}", snapshot.status.text);
            Ok(())
        }
        Severity::Error | Severity::Info => bail!("{}", snapshot.status.text),
    }
}

/// Execute the tools command
pub async fn tools(container: &DefaultAppContainer, args: ToolsArgs) -> Result<()> {
    let toolkit = container.toolkit();
    let policy = toolkit.policy();
    let resolved: Vec<(Tool, Option<String>)> = [Tool::Ffmpeg, Tool::Ffprobe]
        .into_iter()
        .map(|tool| {
            let path = toolkit
                .resolve(tool)
                .ok()
                .map(|resolved| resolved.path.display().to_string());
            (tool, path)
        })
        .collect();
    let installed_available = toolkit.installed_tools_available();

    if args.json {
        let report = json!({
            "policy": policy,
            "tools": resolved
                .iter()
                .map(|(tool, path)| json!({ "tool": tool, "path": path }))
                .collect::<Vec<_>>(),
            "installed_available": installed_available,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("policy: {:?}", policy);
    for (tool, path) in &resolved {
        println!("{}: {}", tool, path.as_deref().unwrap_or("not found"));
    }
    println!(
        "installed tools: {}",
        if installed_available { "available" } else { "not available" }
    );
    Ok(())
}

/// Execute the settings command
pub async fn settings(container: &DefaultAppContainer, args: SettingsArgs) -> Result<()> {
    let store = container.settings();
    if let Some(prefer_installed) = args.prefer_installed {
        store
            .set_bool(PREFER_INSTALLED_KEY, prefer_installed)
            .context("Failed to save settings")?;
    }

    println!("prefer_installed_tools = {}", store.prefer_installed_tools());
    if let Some(path) = store.file_path() {
        println!("settings file: {}", path.display());
    }
    Ok(())
}
