//! Fault boundary around externally invoked tool handlers.
//!
//! [`guarded`] is the only place that turns errors and panics into tool
//! results. Business logic below it propagates `Result`s and never catches
//! panics itself.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use tracing::{error, warn};

/// Text result of one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReply {
    pub text: String,
    pub is_error: bool,
}

impl ToolReply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

thread_local! {
    static LAST_PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chain a panic hook that records the panicking thread's stack trace.
fn install_panic_capture() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            LAST_PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

/// Run a tool handler, converting failures into error replies.
///
/// `Err` becomes `Error: <cause chain>`; a panic becomes
/// `Panic: <payload>` followed by the captured stack trace.
pub fn guarded<F>(tool: &str, handler: F) -> ToolReply
where
    F: FnOnce() -> anyhow::Result<String>,
{
    install_panic_capture();
    match panic::catch_unwind(AssertUnwindSafe(handler)) {
        Ok(Ok(text)) => ToolReply::ok(text),
        Ok(Err(err)) => {
            warn!(tool, error = %format!("{err:#}"), "tool call failed");
            ToolReply::error(format!("Error: {err:#}"))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            let trace = LAST_PANIC_TRACE
                .with(|slot| slot.borrow_mut().take())
                .unwrap_or_else(|| "<unavailable>".to_string());
            error!(tool, panic = %message, "tool handler panicked");
            ToolReply::error(format!("Panic: {message}\nStack trace:\n{trace}"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
