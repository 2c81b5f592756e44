//! Trait for ordered asynchronous work queues

use crate::error::Result;

/// An ordered queue of asynchronous operations
///
/// Operations enqueued on one stream execute in strict issue order.
/// Operations on different streams have no ordering guarantee unless the
/// caller synchronizes between them.
///
/// There is no cancellation: enqueued work runs to completion or records a
/// fault that surfaces at the next [`Stream::synchronize`].
pub trait Stream: Clone + Send + Sync + 'static {
    /// Identifier of this stream, unique within its client
    fn id(&self) -> usize;

    /// Block until every operation enqueued so far has finished
    ///
    /// Returns `Error::AsyncExecution` if any operation faulted since the
    /// previous synchronization. The fault is reported once and then cleared,
    /// and it is attributed to this call regardless of which operation
    /// actually caused it.
    fn synchronize(&self) -> Result<()>;

    /// Returns true if all enqueued work has completed (non-blocking)
    fn query(&self) -> bool;
}
