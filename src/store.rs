//! Storage contract and built-in stores for the active credential.
//!
//! A [`TokenStore`] owns at most one [`Credential`]. Share one store across the process by
//! cloning an `Arc<dyn TokenStore>` instead of reaching for a global.

pub mod hooks;
pub mod memory;

pub use hooks::{HookStore, PersistenceHooks};
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Credential};

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Holder for the single active credential.
///
/// Implementations must make [`set`](TokenStore::set) and [`clear`](TokenStore::clear) atomic
/// with respect to [`get`](TokenStore::get): a reader sees the previous credential or the new
/// one, never a mix.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the active credential, if any.
	fn get(&self) -> StoreFuture<'_, Option<Credential>>;

	/// Replaces any active credential with `credential`.
	fn set(&self, credential: Credential) -> StoreFuture<'_, ()>;

	/// Drops the active credential.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Credential bytes could not be encoded or decoded.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Persistence hook or backend failure.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
