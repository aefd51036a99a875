/// Sink for transient, non-blocking user notices (toasts).
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_error(&self, message: &str) {
        tracing::warn!(notice = message, "user notice");
    }
}
