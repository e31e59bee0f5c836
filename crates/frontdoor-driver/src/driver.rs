use async_trait::async_trait;

use crate::error::DriverError;

/// Create/read/update/delete/exists contract shared by every managed resource.
///
/// Implementations receive their remote client at construction time; nothing
/// here reaches for process-wide state. Cancellation is by dropping the
/// returned future.
#[async_trait]
pub trait ResourceLifecycle: Send + Sync + 'static {
    type Id: Send + Sync;
    type Model: Send + Sync;

    fn name(&self) -> &'static str;

    /// Configuration-time checks; no I/O. Every mutating call runs this first.
    fn validate(&self, model: &Self::Model) -> Result<(), DriverError>;

    // ── Mutating ──────────────────────────────────────────────────────────────

    /// Validate `model` and create it. Fails with [`DriverError::AlreadyExists`]
    /// when `id` is already present.
    async fn create(&self, id: &Self::Id, model: &Self::Model) -> Result<Self::Model, DriverError>;

    /// Validate `model` and replace the existing resource with it.
    async fn update(&self, id: &Self::Id, model: &Self::Model) -> Result<Self::Model, DriverError>;

    /// Delete the resource. Deleting something already gone is not an error.
    async fn delete(&self, id: &Self::Id) -> Result<(), DriverError>;

    // ── Read-only ─────────────────────────────────────────────────────────────

    /// Read the resource back, `None` when it does not exist.
    async fn read(&self, id: &Self::Id) -> Result<Option<Self::Model>, DriverError>;

    async fn exists(&self, id: &Self::Id) -> Result<bool, DriverError>;
}
