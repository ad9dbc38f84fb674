use std::fmt;

/// Events emitted while a workflow runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    /// Total energy after a completed optimization step.
    Energy { step: usize, total: f64 },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards progress events to an optional sink.
///
/// Reporters are shared by reference across benchmark runs, so the sink must
/// be thread-safe.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    sink: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    /// A reporter that drops every event.
    pub fn new() -> Self {
        Self { sink: None }
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            sink: Some(callback),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.sink.is_none()
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(sink) = &self.sink {
            sink(event);
        }
    }
}

impl fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("silent", &self.is_silent())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        assert!(reporter.is_silent());
        reporter.report(Progress::TaskIncrement);
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            seen.lock().unwrap().push(event);
        }));
        assert!(!reporter.is_silent());
        reporter.report(Progress::TaskStart { total_steps: 2 });
        reporter.report(Progress::Energy {
            step: 0,
            total: -1.5,
        });
        reporter.report(Progress::TaskFinish);
        drop(reporter);

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![
                Progress::TaskStart { total_steps: 2 },
                Progress::Energy {
                    step: 0,
                    total: -1.5
                },
                Progress::TaskFinish,
            ]
        );
    }
}
