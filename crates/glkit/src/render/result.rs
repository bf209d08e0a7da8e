//! Resource error contract and the abort escalation path
//!
//! Every resource factory returns `Result<Resource, ResourceSpecificError>`.
//! Callers that prefer to die loudly use [`UnwrapOrAbort::unwrap_or_abort`],
//! which logs `failed to <operation> <resource>: <message>` at error level and
//! aborts the process.

use std::fmt::Display;

use crate::foundation::logging;

/// Implemented by every resource error enumeration
pub trait ResourceError: Display {
    /// Resource name used in abort messages, e.g. `"shader program"`
    const RESOURCE: &'static str;
}

/// Message logged before aborting
#[must_use]
pub fn abort_message<E: ResourceError>(operation: &str, error: &E) -> String {
    format!("failed to {operation} {}: {error}", E::RESOURCE)
}

/// Escalate a failed resource construction into process termination
pub trait UnwrapOrAbort<T> {
    /// Return the value, or log and abort
    fn unwrap_or_abort(self, operation: &str) -> T;
}

impl<T, E: ResourceError> UnwrapOrAbort<T> for Result<T, E> {
    fn unwrap_or_abort(self, operation: &str) -> T {
        match self {
            Ok(value) => value,
            Err(error) => logging::fatal(&abort_message(operation, &error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::process::Command;

    use super::*;
    use crate::config::WindowOptions;
    use crate::platform::Platform;
    use crate::render::{ShaderError, ShaderProgram, Window, WindowError};

    const CHILD_ENV: &str = "GLKIT_ABORT_CHILD";

    const FRAGMENT: &str = "#version 330 core
out vec4 frag_color;
void main() { frag_color = vec4(1.0); }
";

    #[test]
    fn test_abort_message_format() {
        assert_eq!(
            abort_message("create", &ShaderError::FragmentCompileFailed),
            "failed to create shader program: fragment shader compile failed"
        );
        assert_eq!(
            abort_message("open", &WindowError::NativeCreateFailed),
            "failed to open window: native window creation failed"
        );
    }

    #[test]
    fn test_ok_passes_through() {
        let value: Result<u32, ShaderError> = Ok(7);
        assert_eq!(value.unwrap_or_abort("create"), 7);
    }

    #[test]
    fn abort_child() {
        if std::env::var_os(CHILD_ENV).is_none() {
            return;
        }
        logging::init();
        let (platform, _probe, _device) = Platform::headless();
        let _window = Window::try_new(&platform, 64, 64, "abort", WindowOptions::default())
            .unwrap_or_abort("create");
        let _program = ShaderProgram::try_from_source(&platform, "garbage", FRAGMENT)
            .unwrap_or_abort("create");
    }

    #[test]
    fn test_invalid_glsl_aborts_after_logging_compiler_output() {
        let exe = std::env::current_exe().unwrap();
        let output = Command::new(exe)
            .args(["--exact", "render::result::tests::abort_child", "--nocapture"])
            .env(CHILD_ENV, "1")
            .env("RUST_LOG", "error")
            .output()
            .unwrap();

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("no function with name 'main'"));
        assert!(stderr.contains("failed to create shader program: vertex shader compile failed"));
    }
}
