//! EventHandler port - the callback shape subscribers register for fan-out.

use async_trait::async_trait;

use crate::domain::PushEvent;
use crate::error::SyncError;

/// Handler invoked for every push event dispatched after its
/// subscription was registered.
///
/// Implementations should be:
/// - **Quick** - dispatch is sequential; long work belongs in a spawned task
/// - **Isolated** - an error here is logged and never blocks delivery to
///   other subscribers
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process one push event.
    async fn handle(&self, event: PushEvent) -> Result<(), SyncError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that the trait is object-safe
    #[allow(dead_code)]
    fn assert_handler_object_safe(_: &dyn EventHandler) {}
}
