/// Events emitted while a forest is being built.
///
/// The O(n^2) phases report `TaskStart` with the number of rows to process. The connector
/// sweep then advances row by row with `TaskIncrement`; neighbor computation advances in row
/// batches with `TaskAdvance`. Progress reporting never changes results.
#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskAdvance { steps: u64 },
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `body` bracketed by `PhaseStart`/`PhaseFinish` events.
    pub fn phase<T>(&self, name: &'static str, body: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { name });
        let result = body();
        self.report(Progress::PhaseFinish);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::TaskIncrement);
        assert_eq!(reporter.phase("noop", || 42), 42);
    }

    #[test]
    fn phase_brackets_body_with_start_and_finish() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(format!("{:?}", event));
        }));

        reporter.phase("Flooding", || reporter.report(Progress::TaskIncrement));

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "PhaseStart { name: \"Flooding\" }".to_string(),
                "TaskIncrement".to_string(),
                "PhaseFinish".to_string(),
            ]
        );
    }
}
