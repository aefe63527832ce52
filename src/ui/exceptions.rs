//! Uncaught page errors, split into known-benign noise and real failures.

/// Substrings of browser errors that never fail a test.
pub const BENIGN: &[&str] = &[
    "ResizeObserver loop limit exceeded",
    "Non-Error promise rejection captured",
    "Loading chunk",
    "Loading CSS chunk",
];

/// Installs `window.__e2eErrors` and records `error` and `unhandledrejection` events into it.
/// Safe to run more than once per page.
pub const INSTALL_ERROR_HOOK: &str = r#"
if (!window.__e2eErrors) {
    window.__e2eErrors = [];
    window.addEventListener('error', function (event) {
        window.__e2eErrors.push(String(event.message || event.error || 'error'));
    });
    window.addEventListener('unhandledrejection', function (event) {
        var reason = event.reason;
        var message = (reason && reason.message) || reason || 'unhandled rejection';
        window.__e2eErrors.push(String(message));
    });
}
"#;

/// Returns and clears the recorded messages.
pub const DRAIN_ERROR_HOOK: &str = r#"
var errors = window.__e2eErrors || [];
window.__e2eErrors = [];
return errors;
"#;

pub fn is_benign(message: &str) -> bool {
    BENIGN.iter().any(|pattern| message.contains(pattern))
}

/// Messages that should fail the running test.
pub fn unexpected<I>(messages: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    messages
        .into_iter()
        .filter(|message| {
            let benign = is_benign(message);
            if benign {
                tracing::debug!(%message, "Ignoring benign page error");
            }
            !benign
        })
        .collect()
}
