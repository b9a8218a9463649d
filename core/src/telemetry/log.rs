use log::{debug, info, warn};

/// Scoped logger for one pipeline stage; every record is prefixed with the
/// stage name so interleaved stage output stays attributable.
pub struct LogManager {
    scope: &'static str,
}

impl LogManager {
    pub fn new(scope: &'static str) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.scope, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.scope, message);
    }

    pub fn detail(&self, message: &str) {
        debug!("[{}] {}", self.scope, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("geigercore")
    }
}
