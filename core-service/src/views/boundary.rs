//! Fallback screen for faults raised while building a view.

use std::any::Any;
use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

pub const FALLBACK_TITLE: &str = "Something went wrong";
pub const FALLBACK_MESSAGE: &str = "The application encountered an unexpected error.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    Reload,
}

impl RecoveryAction {
    pub fn label(&self) -> &'static str {
        match self {
            RecoveryAction::Reload => "Reload Application",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub title: &'static str,
    pub message: &'static str,
    /// Text of the fault that tripped the boundary.
    pub fault: String,
    pub action: RecoveryAction,
}

impl Fallback {
    fn new(fault: String) -> Self {
        Self {
            title: FALLBACK_TITLE,
            message: FALLBACK_MESSAGE,
            fault,
            action: RecoveryAction::Reload,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<T> {
    View(T),
    Fallback(Fallback),
}

impl<T> Rendered<T> {
    pub fn view(&self) -> Option<&T> {
        match self {
            Rendered::View(view) => Some(view),
            Rendered::Fallback(_) => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Rendered::Fallback(_))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorBoundary;

impl ErrorBoundary {
    /// Run `build`, turning a panic into the fallback screen.
    pub fn render<T>(&self, build: impl FnOnce() -> T) -> Rendered<T> {
        match catch_unwind(AssertUnwindSafe(build)) {
            Ok(view) => Rendered::View(view),
            Err(payload) => {
                let fault = panic_message(payload.as_ref());
                error!(fault = %fault, "View panicked");
                Rendered::Fallback(Fallback::new(fault))
            }
        }
    }

    /// Same as [`render`](Self::render) for builders that report errors instead of panicking.
    pub fn render_result<T, E: Display>(&self, build: impl FnOnce() -> Result<T, E>) -> Rendered<T> {
        match self.render(build) {
            Rendered::View(Ok(view)) => Rendered::View(view),
            Rendered::View(Err(e)) => {
                error!(error = %e, "View failed");
                Rendered::Fallback(Fallback::new(e.to_string()))
            }
            Rendered::Fallback(fallback) => Rendered::Fallback(fallback),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown error".to_string()
    }
}
