use barrierforest::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
const BAR_TEMPLATE: &str = "{msg:<22} [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

/// Renders library progress events as a single reusable terminal bar.
///
/// Phases show as a spinner labelled with the phase name; the quadratic tasks inside a phase
/// switch the bar to a row counter.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A handler that tracks state but never draws, for `--quiet` runs.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        pb.finish_and_clear();
        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = self.pb.clone();
        Box::new(move |progress: Progress| {
            let Ok(guard) = pb.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };
            apply(&guard, progress);
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(pb: &ProgressBar, progress: Progress) {
    match progress {
        Progress::PhaseStart { name } => {
            pb.reset();
            pb.set_length(0);
            pb.set_style(spinner_style());
            pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            pb.set_message(name);
        }
        Progress::PhaseFinish => {
            pb.disable_steady_tick();
            pb.finish_with_message("✓ Done");
        }
        Progress::TaskStart { total_steps } => {
            pb.disable_steady_tick();
            pb.reset();
            pb.set_length(total_steps);
            pb.set_position(0);
            pb.set_style(bar_style());
        }
        Progress::TaskIncrement => pb.inc(1),
        Progress::TaskAdvance { steps } => pb.inc(steps),
        Progress::TaskFinish => {
            let length = pb.length().unwrap_or(0);
            if pb.position() < length {
                pb.set_position(length);
            }
            pb.finish();
        }
        Progress::Message(msg) => {
            if pb.is_finished() {
                pb.set_message(msg);
            } else {
                pb.println(format!("  {}", msg));
            }
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
        })
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_starts_finished_and_empty() {
        let handler = CliProgressHandler::hidden();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn task_events_drive_the_row_counter() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Neighbor calculation",
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Neighbor calculation");
            assert!(!pb.is_finished());
        }

        callback(Progress::TaskStart { total_steps: 50 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskAdvance { steps: 9 });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(50));
            assert_eq!(pb.position(), 10);
        }

        callback(Progress::TaskFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.position(), 50);
        }

        callback(Progress::PhaseFinish);
        callback(Progress::Message("threshold 5.000000".to_string()));
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.message(), "threshold 5.000000");
    }

    #[test]
    fn callback_can_be_driven_from_worker_threads() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        thread::scope(|scope| {
            scope.spawn(|| {
                callback(Progress::PhaseStart { name: "Flooding" });
                callback(Progress::TaskStart { total_steps: 2 });
                callback(Progress::TaskIncrement);
            });
        });
        callback(Progress::TaskIncrement);

        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.position(), 2);
    }
}
