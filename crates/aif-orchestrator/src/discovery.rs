//! Pluggable service-discovery oracle.
//!
//! The spec leaves the discovery backend unspecified ("external discovery
//! oracle; pluggable; may be a no-op"). [`DiscoverySource`] is the seam: a
//! real deployment might back this with Consul/etcd/DNS; this workspace
//! ships [`NoopDiscovery`], which reports nothing, so the registry is only
//! ever changed by explicit `register`/`unregister` calls.

use aif_core::contracts::WorkerDescriptor;
use async_trait::async_trait;

#[async_trait]
pub trait DiscoverySource: Send + Sync {
    /// Full snapshot of workers the external oracle currently knows about.
    /// A no-op discovery source returns an empty vec every tick.
    async fn discover(&self) -> Vec<WorkerDescriptor>;
}

pub struct NoopDiscovery;

#[async_trait]
impl DiscoverySource for NoopDiscovery {
    async fn discover(&self) -> Vec<WorkerDescriptor> {
        Vec::new()
    }
}
