//! Trait for runtime clients that handle operation dispatch

use super::Runtime;
use crate::error::Result;
use crate::runtime::DiagnosticsSink;
use std::sync::Arc;

/// Trait for runtime clients that handle operation dispatch
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// The stream operations use when the caller has no stream of its own
    fn default_stream(&self) -> &R::Stream;

    /// Create a new independent stream on this client's device
    fn create_stream(&self) -> Result<R::Stream>;

    /// Synchronize the default stream: wait for all pending operations to complete
    fn synchronize(&self) -> Result<()>;

    /// Get the allocator for this client
    fn allocator(&self) -> &R::Allocator;

    /// Sink receiving debug-synchronous timing records
    fn diagnostics(&self) -> &Arc<dyn DiagnosticsSink>;
}
