//! Progress reporting seam between the workflow and its front end

/// Receives user-facing progress messages from the workflow
///
/// The cliclack front end implements this in [`crate::tui`]; library users can supply
/// their own or use [`SilentReporter`].
pub trait Reporter: Send + Sync {
    /// A workflow step is starting
    fn step(&self, message: &str);

    /// Neutral information
    fn info(&self, message: &str);

    /// Something degraded but the run continues
    fn warn(&self, message: &str);

    /// A step finished successfully
    fn success(&self, message: &str);
}

/// Reporter that drops every message
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn step(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn step(&self, message: &str) {
        (**self).step(message)
    }

    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn warn(&self, message: &str) {
        (**self).warn(message)
    }

    fn success(&self, message: &str) {
        (**self).success(message)
    }
}

/// Reporter that keeps every message, for assertions in tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    messages: std::sync::Mutex<Vec<(&'static str, String)>>,
}

#[cfg(test)]
impl RecordingReporter {
    fn push(&self, level: &'static str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }

    /// Messages logged at `level` ("step", "info", "warn" or "success")
    pub(crate) fn at(&self, level: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.push("step", message)
    }

    fn info(&self, message: &str) {
        self.push("info", message)
    }

    fn warn(&self, message: &str) {
        self.push("warn", message)
    }

    fn success(&self, message: &str) {
        self.push("success", message)
    }
}
