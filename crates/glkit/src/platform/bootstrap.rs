//! Lazy two-stage backend bootstrap
//!
//! Stage one initializes the windowing library; stage two loads GL entry
//! points through the current context. Each stage runs its real attempt at
//! most once per cycle and remembers the outcome, success or failure, until
//! [`Bootstrap::reset`]. Asking for functions while no context is current is
//! a precondition failure and is not remembered.

use thiserror::Error;

use super::backend::WindowingBackend;

/// Bootstrap failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapError {
    /// The windowing library failed to initialize
    #[error("windowing library initialization failed")]
    WindowingInitFailed,

    /// Functions were requested with no current context
    #[error("no current graphics context")]
    NoCurrentContext,

    /// Entry points could not be resolved through the current context
    #[error("graphics function loading failed")]
    FunctionLoadFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Stage {
    #[default]
    Pending,
    Ready,
    Failed,
}

/// Bootstrap state for one windowing cycle
#[derive(Debug, Default)]
pub struct Bootstrap {
    windowing: Stage,
    functions: Stage,
}

impl Bootstrap {
    /// Fresh state; nothing attempted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the windowing library unless already attempted
    pub fn ensure_windowing(
        &mut self,
        backend: &mut dyn WindowingBackend,
    ) -> Result<(), BootstrapError> {
        match self.windowing {
            Stage::Ready => Ok(()),
            Stage::Failed => Err(BootstrapError::WindowingInitFailed),
            Stage::Pending => match backend.init() {
                Ok(()) => {
                    self.windowing = Stage::Ready;
                    Ok(())
                }
                Err(message) => {
                    log::error!("Windowing initialization failed: {}", message);
                    self.windowing = Stage::Failed;
                    Err(BootstrapError::WindowingInitFailed)
                }
            },
        }
    }

    /// Load functions through the current context unless already attempted
    ///
    /// Returns `Ok(true)` when this call performed the load.
    pub fn ensure_functions(
        &mut self,
        backend: &mut dyn WindowingBackend,
    ) -> Result<bool, BootstrapError> {
        match self.functions {
            Stage::Ready => Ok(false),
            Stage::Failed => Err(BootstrapError::FunctionLoadFailed),
            Stage::Pending => {
                if self.windowing != Stage::Ready || backend.current_window().is_none() {
                    return Err(BootstrapError::NoCurrentContext);
                }
                if backend.load_functions() {
                    self.functions = Stage::Ready;
                    Ok(true)
                } else {
                    log::error!("Failed to load graphics functions");
                    self.functions = Stage::Failed;
                    Err(BootstrapError::FunctionLoadFailed)
                }
            }
        }
    }

    /// Forget both outcomes so the next request retries
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Windowing library initialized
    #[must_use]
    pub fn is_windowing_ready(&self) -> bool {
        self.windowing == Stage::Ready
    }

    /// Functions loaded
    #[must_use]
    pub fn is_functions_loaded(&self) -> bool {
        self.functions == Stage::Ready
    }
}
