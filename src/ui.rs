use async_trait::async_trait;
use tracing::info;

/// Presentation seam. The client core never renders anything itself; the
/// front end driving it supplies these three primitives.
#[async_trait]
pub trait Ui: Send + Sync {
    /// Blocking notification.
    async fn alert(&self, message: &str);

    /// Yes/no question; `true` means confirmed.
    async fn confirm(&self, message: &str) -> bool;

    /// Free-text input seeded with `initial`; `None` means cancelled.
    async fn prompt(&self, label: &str, initial: &str) -> Option<String>;
}

/// Headless front end for the smoke binary: notifications go to the log,
/// every question is declined.
pub struct TracingUi;

#[async_trait]
impl Ui for TracingUi {
    async fn alert(&self, message: &str) {
        info!("[alert] {}", message);
    }

    async fn confirm(&self, message: &str) -> bool {
        info!("[confirm declined] {}", message);
        false
    }

    async fn prompt(&self, label: &str, _initial: &str) -> Option<String> {
        info!("[prompt cancelled] {}", label);
        None
    }
}
