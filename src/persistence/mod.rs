//! # Persistence Port
//!
//! The storage operations request processors mutate. Backends own their
//! consistency, durability and concurrency; calls are synchronous and may
//! block, so processors run on blocking-capable workers.
//!
//! [`InMemoryPushDatabase`] is a complete in-process backend for embedders and
//! tests.

mod memory;

pub use memory::InMemoryPushDatabase;

use crate::error::PersistenceError;
use crate::model::{DeliveryPoint, PushServiceProvider};

pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;

/// Push-notification storage backend
pub trait PushDatabase: Send + Sync {
    fn add_push_service_provider_to_service(
        &self,
        service: &str,
        provider: &PushServiceProvider,
    ) -> PersistenceResult<()>;

    fn remove_push_service_provider_from_service(
        &self,
        service: &str,
        provider: &PushServiceProvider,
    ) -> PersistenceResult<()>;

    /// Associate a delivery point with a subscriber and return the provider
    /// that will deliver to it. `Ok(None)` means the backend found nothing usable.
    fn add_delivery_point_to_service(
        &self,
        service: &str,
        subscriber: &str,
        delivery_point: &DeliveryPoint,
    ) -> PersistenceResult<Option<PushServiceProvider>>;

    fn remove_delivery_point_from_service(
        &self,
        service: &str,
        subscriber: &str,
        delivery_point: &DeliveryPoint,
    ) -> PersistenceResult<()>;
}
