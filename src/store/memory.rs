//! Process-local [`TokenStore`]; the credential is lost on restart.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{StoreFuture, TokenStore},
};

/// Thread-safe single-slot store for tests, demos, and short-lived processes.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Option<Credential>>>);
impl MemoryStore {
	/// Creates a store that already holds `credential`.
	pub fn with_credential(credential: Credential) -> Self {
		Self(Arc::new(RwLock::new(Some(credential))))
	}

	pub(crate) fn get_now(&self) -> Option<Credential> {
		self.0.read().clone()
	}

	pub(crate) fn replace_now(&self, credential: Option<Credential>) {
		*self.0.write() = credential;
	}
}
impl TokenStore for MemoryStore {
	fn get(&self) -> StoreFuture<'_, Option<Credential>> {
		Box::pin(async move { Ok(self.get_now()) })
	}

	fn set(&self, credential: Credential) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.replace_now(Some(credential));

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.replace_now(None);

			Ok(())
		})
	}
}
