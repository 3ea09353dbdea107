//! Explicitly passed logging capability.
//!
//! Components never log through a process-wide default. Each one receives a
//! [`Logger`] at construction and emits its events inside that logger's
//! dispatcher and span.

use std::path::PathBuf;
use tracing::{Dispatch, Span, dispatcher};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Clone)]
pub struct Logger {
    dispatch: Dispatch,
    span: Span,
}

impl Logger {
    /// Log into `dispatch` under a root `modroute` span.
    pub fn new(dispatch: Dispatch) -> Self {
        let span = dispatcher::with_default(&dispatch, || tracing::info_span!("modroute"));
        Self { dispatch, span }
    }

    /// A logger that discards everything.
    pub fn silent() -> Self {
        Self::new(Dispatch::none())
    }

    /// Capture whatever dispatcher is the default on the calling thread.
    pub fn current() -> Self {
        Self::new(dispatcher::get_default(|dispatch| dispatch.clone()))
    }

    /// Derive a logger for a named component, nested under this one.
    pub fn child(&self, component: &str) -> Self {
        let span = self.in_scope(|| tracing::debug_span!("component", name = %component));
        Self {
            dispatch: self.dispatch.clone(),
            span,
        }
    }

    /// Run `f` with this logger's dispatcher and span active.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        dispatcher::with_default(&self.dispatch, || self.span.in_scope(f))
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::silent()
    }
}

/// Build the subscriber used by the command line tool.
///
/// Logs roll daily under `~/.modroute/logs` with the component name as the
/// file prefix. The returned dispatcher is not installed globally; wrap it in
/// a [`Logger`] and hand that to the registry.
pub fn init_logging(component: &str, to_stderr: bool) -> (Dispatch, WorkerGuard) {
    let log_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".modroute/logs");
    let _ = std::fs::create_dir_all(&log_dir);

    // Files look like cli.log.2024-01-21
    let file_appender = tracing_appender::rolling::daily(&log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let dispatch = if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        Dispatch::new(registry.with(stderr_layer))
    } else {
        Dispatch::new(registry)
    };

    (dispatch, guard)
}
