//! Object-store capability injected into the pipeline.

pub mod gcs;
pub mod memory;

use anyhow::Result;

/// Minimal capability the pipeline needs from its surrounding runtime. The
/// production implementation is [`gcs::GcsStore`]; tests and local runs use
/// [`memory::MemoryStore`].
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Read the full contents of one object.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Create or overwrite one object.
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;
}
