//! Trim session controller
//!
//! Owns the current [`MediaSource`] and drives the duration probe, the
//! debounced cut prediction and the cut itself on worker tasks. Every worker
//! is tagged with the input path it was started for and re-checks that path
//! under the state lock before applying its result, so a result computed for
//! a replaced input is dropped even if aborting the worker came too late.
//!
//! All public methods spawn tasks and must be called from within a Tokio
//! runtime.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::plan_cut;
use crate::ports::*;
use crate::utils::path::display_name;
use crate::utils::time::{format_time_for_input, parse_time};

/// Synthetic progress never passes this until the cut has actually finished
pub const PROGRESS_CAP: f64 = 0.9;

const IDLE_STATUS: &str = "Choose an input and output, then request a cut.";

/// Delays used by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// Quiet period after the last range edit before a prediction runs
    pub debounce: Duration,
    /// Interval of the synthetic progress ticker
    pub progress_tick: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(220),
            progress_tick: Duration::from_millis(120),
        }
    }
}

/// Estimated cut progress: elapsed time over the clip length, capped below 1
pub fn synthetic_progress(elapsed: Duration, estimated_seconds: f64) -> f64 {
    (elapsed.as_secs_f64() / estimated_seconds.max(1.0)).min(PROGRESS_CAP)
}

/// Read-only view of the session, published after every change
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub source: Option<MediaSource>,
    pub is_running: bool,
    pub progress: f64,
    pub status: StatusMessage,
    pub checking_preview: bool,
    pub preview_unavailable: Option<String>,
}

struct SessionState {
    source: Option<MediaSource>,
    phase: SessionPhase,
    cut_in_flight: bool,
    cut_serial: u64,
    progress: f64,
    status: StatusMessage,
    checking_preview: bool,
    preview_unavailable: Option<String>,
    load_task: Option<AbortHandle>,
    prediction_task: Option<AbortHandle>,
    cut_cancel: Option<CancellationToken>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            source: None,
            phase: SessionPhase::Idle,
            cut_in_flight: false,
            cut_serial: 0,
            progress: 0.0,
            status: StatusMessage::info(IDLE_STATUS),
            checking_preview: false,
            preview_unavailable: None,
            load_task: None,
            prediction_task: None,
            cut_cancel: None,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase.clone(),
            source: self.source.clone(),
            is_running: self.cut_in_flight,
            progress: self.progress,
            status: self.status.clone(),
            checking_preview: self.checking_preview,
            preview_unavailable: self.preview_unavailable.clone(),
        }
    }

    fn is_current(&self, input: &Path) -> bool {
        self.source
            .as_ref()
            .is_some_and(|source| source.is_input(input))
    }

    fn current_source_mut(&mut self, input: &Path) -> Option<&mut MediaSource> {
        self.source
            .as_mut()
            .filter(|source| source.is_input(input))
    }

    fn reject(&mut self, reason: InvalidRequest) -> DomainError {
        self.status = match reason {
            InvalidRequest::EndClamped { .. } => StatusMessage::info(reason.to_string()),
            _ => StatusMessage::error(reason.to_string()),
        };
        reason.into()
    }
}

struct Shared {
    tools: Arc<dyn MediaToolsPort>,
    preview: Arc<dyn PreviewCheckPort>,
    overwrite: Arc<dyn OverwritePrompt>,
    timing: SessionTiming,
    state: Mutex<SessionState>,
    updates: watch::Sender<SessionSnapshot>,
}

impl Shared {
    /// Apply a change under the lock and publish the resulting snapshot
    fn mutate<R>(&self, change: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let result = change(&mut state);
        self.updates.send_replace(state.snapshot());
        result
    }

    fn read<R>(&self, view: impl FnOnce(&SessionState) -> R) -> R {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        view(&state)
    }
}

/// Aborts the progress ticker when dropped, on every exit path from a cut
struct ProgressGuard(AbortHandle);

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Session controller for one trim workflow.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct TrimSession {
    shared: Arc<Shared>,
}

impl TrimSession {
    pub fn new(
        tools: Arc<dyn MediaToolsPort>,
        preview: Arc<dyn PreviewCheckPort>,
        overwrite: Arc<dyn OverwritePrompt>,
        timing: SessionTiming,
    ) -> Self {
        let state = SessionState::new();
        let (updates, _) = watch::channel(state.snapshot());
        Self {
            shared: Arc::new(Shared {
                tools,
                preview,
                overwrite,
                timing,
                state: Mutex::new(state),
                updates,
            }),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.read(SessionState::snapshot)
    }

    /// Receiver that sees a new snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.updates.subscribe()
    }

    /// Replace the current input and start loading it.
    ///
    /// Work still running for the previous input is aborted and any result
    /// it produces anyway is ignored. The returned handle completes once the
    /// duration probe and the preview check have both been applied.
    pub fn select_input(&self, input: impl Into<PathBuf>) -> JoinHandle<()> {
        let input = input.into();
        info!(input = %input.display(), "Input selected");

        let shared = &self.shared;
        shared.mutate(|state| {
            abort_slot(&mut state.load_task);
            abort_slot(&mut state.prediction_task);
            state.source = Some(MediaSource::new(input.clone()));
            state.phase = SessionPhase::Loading(input.clone());
            state.status = StatusMessage::info("Input selected. Reading duration...");
            state.checking_preview = true;
            state.preview_unavailable = None;

            let task = tokio::spawn(load_input(shared.clone(), input));
            state.load_task = Some(task.abort_handle());
            task
        })
    }

    pub fn set_output(&self, output: impl Into<PathBuf>) -> DomainResult<()> {
        let output = output.into();
        self.shared.mutate(|state| {
            let Some(source) = state.source.as_mut() else {
                return Err(state.reject(InvalidRequest::MissingInput));
            };
            source.output_path = Some(output);
            state.status = StatusMessage::info("Output selected.");
            Ok(())
        })
    }

    /// Edit the start field and restart the prediction debounce
    pub fn set_start_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.edit_range(|source| source.start_text = text);
    }

    /// Edit the end field and restart the prediction debounce
    pub fn set_end_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.edit_range(|source| source.end_text = text);
    }

    fn edit_range(&self, edit: impl FnOnce(&mut MediaSource)) {
        let shared = &self.shared;
        shared.mutate(|state| {
            let Some(source) = state.source.as_mut() else {
                return;
            };
            edit(source);
            schedule_prediction(shared, state);
        });
    }

    /// Take a range picked on a preview timeline.
    ///
    /// Both bounds are clamped into the known duration and written back to
    /// the text fields.
    pub fn apply_trim_selection(&self, start: f64, end: f64) -> DomainResult<()> {
        let shared = &self.shared;
        shared.mutate(|state| {
            let Some(duration) = state.source.as_ref().map(|source| source.duration) else {
                return Err(state.reject(InvalidRequest::MissingInput));
            };

            let upper = duration.unwrap_or(f64::MAX);
            let start = start.max(0.0).min(upper);
            let end = end.max(0.0).min(upper);
            if end <= start {
                return Err(state.reject(InvalidRequest::InvalidSelection));
            }

            if let Some(source) = state.source.as_mut() {
                source.start_text = format_time_for_input(start);
                source.end_text = format_time_for_input(end);
            }
            state.status = StatusMessage::info("Trim range updated from preview.");
            schedule_prediction(shared, state);
            Ok(())
        })
    }

    /// Validate the current selection and start the cut.
    ///
    /// Nothing is spawned when validation fails. An end past the known
    /// duration is pulled back to it and reported; the next request with
    /// the corrected value proceeds. When the output exists the overwrite
    /// prompt decides. The returned handle completes once the cut result
    /// has been applied.
    pub async fn request_cut(&self) -> DomainResult<JoinHandle<()>> {
        let shared = &self.shared;
        let plan = shared.mutate(|state| match validate_cut(state) {
            Ok(plan) => Ok(plan),
            Err(reason) => {
                if matches!(reason, InvalidRequest::EndClamped { .. }) {
                    schedule_prediction(shared, state);
                }
                Err(state.reject(reason))
            }
        })?;

        let output_exists = tokio::fs::try_exists(&plan.output).await.unwrap_or(false);
        if output_exists && !shared.overwrite.confirm_overwrite(&plan.output).await {
            info!(output = %plan.output.display(), "Overwrite declined");
            return Err(shared.mutate(|state| state.reject(InvalidRequest::OverwriteDeclined)));
        }

        let (cut_id, cancel) = shared.mutate(|state| {
            if state.cut_in_flight {
                return Err(state.reject(InvalidRequest::CutInProgress));
            }
            if !state.is_current(&plan.input) {
                return Err(state.reject(InvalidRequest::InputChanged));
            }

            state.cut_in_flight = true;
            state.cut_serial += 1;
            state.phase = SessionPhase::Running(plan.input.clone());
            state.progress = 0.0;
            state.status = StatusMessage::info("Running ffmpeg...");
            let cancel = CancellationToken::new();
            state.cut_cancel = Some(cancel.clone());
            Ok((state.cut_serial, cancel))
        })?;

        let guard = ProgressGuard(spawn_progress_ticker(shared, cut_id, plan.duration()));
        let job = CutJob::from_plan(&plan, output_exists);
        Ok(tokio::spawn(run_cut(
            shared.clone(),
            plan,
            job,
            cut_id,
            cancel,
            guard,
        )))
    }

    /// Cancel the running cut. Returns `false` when no cut is running.
    pub fn cancel_cut(&self) -> bool {
        let token = self.shared.read(|state| {
            state
                .cut_cancel
                .clone()
                .filter(|_| state.cut_in_flight)
        });
        match token {
            Some(token) => {
                info!("Cancelling cut");
                token.cancel();
                true
            }
            None => false,
        }
    }
}

fn abort_slot(slot: &mut Option<AbortHandle>) {
    if let Some(handle) = slot.take() {
        handle.abort();
    }
}

fn validate_cut(state: &mut SessionState) -> Result<CutPlan, InvalidRequest> {
    if state.cut_in_flight {
        return Err(InvalidRequest::CutInProgress);
    }
    if matches!(state.phase, SessionPhase::Loading(_)) {
        return Err(InvalidRequest::StillLoading);
    }

    let Some(source) = state.source.as_mut() else {
        return Err(InvalidRequest::MissingInput);
    };

    let planned = plan_cut(
        Some(&source.input_path),
        source.output_path.as_deref(),
        &source.start_text,
        &source.end_text,
        source.duration,
    );
    if let Err(InvalidRequest::EndClamped { end }) = &planned {
        source.end_text = format_time_for_input(*end);
    }
    planned
}

async fn load_input(shared: Arc<Shared>, input: PathBuf) {
    let duration = async {
        let result = shared.tools.media_duration(&input).await;
        apply_duration(&shared, &input, result);
    };
    let preview = async {
        let reason = shared.preview.unavailable_reason(&input).await;
        apply_preview(&shared, &input, reason);
    };
    tokio::join!(duration, preview);
}

fn apply_duration(shared: &Arc<Shared>, input: &Path, result: DomainResult<f64>) {
    shared.mutate(|state| {
        let Some(source) = state.current_source_mut(input) else {
            debug!(input = %input.display(), "Dropping duration for a replaced input");
            return;
        };

        match result {
            Ok(duration) => {
                source.duration = Some(duration);
                source.end_text = format_time_for_input(duration);
                state.status = StatusMessage::info("Input selected. Output defaulted to same folder.");
                info!(input = %input.display(), duration, "Input loaded");
                schedule_prediction(shared, state);
            }
            Err(e) => {
                warn!(input = %input.display(), error = %e, "Duration probe failed");
                state.status = StatusMessage::error(format!(
                    "Input selected, but duration could not be read: {}",
                    e
                ));
            }
        }

        if state.phase == SessionPhase::Loading(input.to_path_buf()) {
            state.phase = SessionPhase::Ready(input.to_path_buf());
        }
    });
}

fn apply_preview(shared: &Shared, input: &Path, reason: Option<String>) {
    shared.mutate(|state| {
        if !state.is_current(input) {
            debug!(input = %input.display(), "Dropping preview check for a replaced input");
            return;
        }
        state.checking_preview = false;
        state.preview_unavailable = reason;
    });
}

/// Replace the pending prediction with a fresh debounced one
fn schedule_prediction(shared: &Arc<Shared>, state: &mut SessionState) {
    abort_slot(&mut state.prediction_task);
    let Some(source) = state.source.as_mut() else {
        return;
    };
    source.prediction = None;

    let task = tokio::spawn(run_prediction(
        shared.clone(),
        source.input_path.clone(),
        shared.timing.debounce,
    ));
    state.prediction_task = Some(task.abort_handle());
}

/// Requested range of the current source, if it is a valid non-empty range
fn requested_range(source: &MediaSource) -> Option<(f64, f64)> {
    let start = parse_time(&source.start_text)?;
    let end = parse_time(&source.end_text)?;
    (end > start).then_some((start, end))
}

async fn run_prediction(shared: Arc<Shared>, input: PathBuf, delay: Duration) {
    tokio::time::sleep(delay).await;

    let range = shared.read(|state| {
        state
            .source
            .as_ref()
            .filter(|source| source.is_input(&input))
            .and_then(requested_range)
    });
    let Some((start, end)) = range else {
        return;
    };

    let result = shared.tools.predict_cut(&input, start, end).await;
    apply_prediction(&shared, &input, result);
}

fn apply_prediction(shared: &Shared, input: &Path, result: DomainResult<CutPrediction>) {
    let prediction = match result {
        Ok(prediction) => prediction,
        Err(e) => {
            warn!(input = %input.display(), error = %e, "Cut prediction failed");
            return;
        }
    };

    shared.mutate(|state| {
        let Some(source) = state.current_source_mut(input) else {
            debug!(input = %input.display(), "Dropping prediction for a replaced input");
            return;
        };
        if requested_range(source) != Some((prediction.requested_start, prediction.requested_end)) {
            debug!(input = %input.display(), "Dropping prediction for an edited range");
            return;
        }
        debug!(prediction = %prediction, "Prediction updated");
        source.prediction = Some(prediction);
    });
}

fn spawn_progress_ticker(shared: &Arc<Shared>, cut_id: u64, estimated_seconds: f64) -> AbortHandle {
    let weak: Weak<Shared> = Arc::downgrade(shared);
    let tick = shared.timing.progress_tick;
    let started = Instant::now();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let Some(shared) = weak.upgrade() else {
                break;
            };
            let progress = synthetic_progress(started.elapsed(), estimated_seconds);
            let live = shared.mutate(|state| {
                let live = state.cut_in_flight && state.cut_serial == cut_id;
                if live {
                    state.progress = progress;
                }
                live
            });
            if !live {
                break;
            }
        }
    });
    task.abort_handle()
}

async fn run_cut(
    shared: Arc<Shared>,
    plan: CutPlan,
    job: CutJob,
    cut_id: u64,
    cancel: CancellationToken,
    guard: ProgressGuard,
) {
    tokio::select! {
        result = shared.tools.predict_cut(&plan.input, plan.start, plan.end) => {
            apply_prediction(&shared, &plan.input, result);
        }
        _ = cancel.cancelled() => {}
    }

    let result = if cancel.is_cancelled() {
        Err(DomainError::Cancelled)
    } else {
        shared.tools.cut(&job, &cancel).await
    };
    drop(guard);

    finish_cut(&shared, &plan, cut_id, result);
}

fn finish_cut(shared: &Shared, plan: &CutPlan, cut_id: u64, result: DomainResult<()>) {
    shared.mutate(|state| {
        if state.cut_serial != cut_id {
            return;
        }
        state.cut_in_flight = false;
        state.cut_cancel = None;

        if !state.is_current(&plan.input) {
            state.progress = 0.0;
            debug!(
                cut_input = %plan.input.display(),
                current_input = ?state.source.as_ref().map(|s| s.input_path.display().to_string()),
                outcome = ?result,
                "Cut finished for a replaced input"
            );
            return;
        }

        if state.phase == SessionPhase::Running(plan.input.clone()) {
            state.phase = SessionPhase::Ready(plan.input.clone());
        }

        match result {
            Ok(()) => {
                state.progress = 1.0;
                state.status = StatusMessage::success(format!("Success: {}", display_name(&plan.output)));
            }
            Err(DomainError::Cancelled) => {
                state.progress = 0.0;
                state.status = StatusMessage::info("Cut cancelled.");
            }
            Err(e) => {
                warn!(error = %e, "Cut failed");
                state.progress = 0.0;
                state.status = StatusMessage::error(format!("Error: {}", e));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_progress_caps_below_one() {
        assert_eq!(synthetic_progress(Duration::ZERO, 10.0), 0.0);
        assert!((synthetic_progress(Duration::from_secs(5), 10.0) - 0.5).abs() < 1e-9);
        assert_eq!(synthetic_progress(Duration::from_secs(60), 10.0), PROGRESS_CAP);
    }

    #[test]
    fn test_synthetic_progress_short_clip_uses_one_second_floor() {
        let progress = synthetic_progress(Duration::from_millis(500), 0.1);
        assert!((progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_default_timing() {
        let timing = SessionTiming::default();
        assert_eq!(timing.debounce, Duration::from_millis(220));
        assert_eq!(timing.progress_tick, Duration::from_millis(120));
    }
}
