//! # Resource Cache
//!
//! - [`resource`]: keys, invalidation scopes, provenance
//! - [`policy`]: staleness/poll/retry defaults per resource kind and the enablement [`Gate`]
//! - [`store`]: the [`ResourceCache`] query engine
//! - [`poller`]: cancellable poll timers owned by cache entries

pub mod policy;
pub mod poller;
pub mod resource;
pub mod store;

pub use policy::{Gate, QueryOptions, QueryPolicy, RetryPolicy};
pub use resource::{Resource, ResourceKey, ResourceKind, ResourceScope, Source};
pub use store::{CacheStats, FetchWatermark, InvalidationOutcome, QueryResult, QueryStatus, RefetchHandle, ResourceCache};
