//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! The framework itself only emits through the `tracing` macros; this
//! module is for binaries that want a ready-made subscriber. Library
//! consumers with their own subscriber should skip it entirely.
//!
//! # Example
//!
//! ```rust,ignore
//! use ember_runtime::logging::LoggingBuilder;
//! use tracing::Level;
//!
//! LoggingBuilder::new()
//!     .with_level(Level::DEBUG)
//!     .directive("ember_core=trace")
//!     .init();
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

/// Initializes logging with defaults: INFO level, `RUST_LOG` respected.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    LoggingBuilder::new().init();
}

/// A builder for configuring the tracing subscriber.
#[derive(Debug, Default)]
pub struct LoggingBuilder {
    directives: Vec<String>,
    level: Option<tracing::Level>,
    with_target: bool,
}

impl LoggingBuilder {
    /// Creates a builder with the default display options.
    pub fn new() -> Self {
        Self {
            with_target: true,
            ..Self::default()
        }
    }

    /// Sets the base log level.
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Adds a filter directive, e.g. `"ember_core=debug"`.
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    /// Include the target (module path) in log output.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    fn build_filter(&self) -> EnvFilter {
        let base_level = self.level.unwrap_or(tracing::Level::INFO);
        let base_filter = base_level.to_string().to_lowercase();

        // RUST_LOG wins over the configured base level.
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&base_filter));

        for directive in &self.directives {
            if let Ok(d) = directive.parse() {
                filter = filter.add_directive(d);
            }
        }

        filter
    }

    /// Initializes the logging system, ignoring an already-set subscriber.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Tries to initialize the logging system, returning an error on
    /// failure.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        let layer = fmt::layer().compact().with_target(self.with_target);
        tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()
    }
}
