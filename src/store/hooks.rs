//! Write-through [`TokenStore`] that hands serialized credentials to caller-provided hooks.
//!
//! The store never encrypts anything itself. [`PersistenceHooks::save`] receives the plain
//! JSON encoding of the credential and is expected to seal it (keystore, keychain, KMS) before
//! it touches disk; [`PersistenceHooks::load`] returns the unsealed bytes.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{MemoryStore, StoreError, StoreFuture, TokenStore},
};

/// Persistence boundary filled by the embedding application.
pub trait PersistenceHooks
where
	Self: 'static + Send + Sync,
{
	/// Seals and persists `bytes`, replacing any previous value.
	fn save(&self, bytes: Vec<u8>) -> StoreFuture<'_, ()>;

	/// Loads and unseals the persisted bytes, if any.
	fn load(&self) -> StoreFuture<'_, Option<Vec<u8>>>;

	/// Removes the persisted value.
	fn erase(&self) -> StoreFuture<'_, ()>;
}

/// In-memory slot mirrored into [`PersistenceHooks`] on every mutation.
pub struct HookStore<H>
where
	H: ?Sized + PersistenceHooks,
{
	hooks: Arc<H>,
	slot: MemoryStore,
	write_guard: AsyncMutex<()>,
}
impl<H> HookStore<H>
where
	H: ?Sized + PersistenceHooks,
{
	/// Opens the store, priming the slot from [`PersistenceHooks::load`].
	pub async fn open(hooks: impl Into<Arc<H>>) -> Result<Self, StoreError> {
		let hooks = hooks.into();
		let slot = match hooks.load().await? {
			Some(bytes) => MemoryStore::with_credential(decode(&bytes)?),
			None => MemoryStore::default(),
		};

		Ok(Self { hooks, slot, write_guard: AsyncMutex::new(()) })
	}
}
impl<H> TokenStore for HookStore<H>
where
	H: ?Sized + PersistenceHooks,
{
	fn get(&self) -> StoreFuture<'_, Option<Credential>> {
		Box::pin(async move { Ok(self.slot.get_now()) })
	}

	fn set(&self, credential: Credential) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let bytes = serde_json::to_vec(&credential).map_err(|e| StoreError::Serialization {
				message: format!("Failed to encode credential: {e}"),
			})?;
			let _serialized = self.write_guard.lock().await;

			// Persist first so a failed save leaves the previous credential visible.
			self.hooks.save(bytes).await?;
			self.slot.replace_now(Some(credential));

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let _serialized = self.write_guard.lock().await;

			self.hooks.erase().await?;
			self.slot.replace_now(None);

			Ok(())
		})
	}
}
impl<H> Debug for HookStore<H>
where
	H: ?Sized + PersistenceHooks,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HookStore").field("slot", &self.slot).finish()
	}
}

fn decode(bytes: &[u8]) -> Result<Credential, StoreError> {
	serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization {
		message: format!("Failed to decode persisted credential: {e}"),
	})
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[derive(Default)]
	struct VecHooks {
		saved: Mutex<Option<Vec<u8>>>,
		fail_saves: bool,
	}
	impl PersistenceHooks for VecHooks {
		fn save(&self, bytes: Vec<u8>) -> StoreFuture<'_, ()> {
			Box::pin(async move {
				if self.fail_saves {
					return Err(StoreError::Backend { message: "keystore locked".into() });
				}

				*self.saved.lock() = Some(bytes);

				Ok(())
			})
		}

		fn load(&self) -> StoreFuture<'_, Option<Vec<u8>>> {
			Box::pin(async move { Ok(self.saved.lock().clone()) })
		}

		fn erase(&self) -> StoreFuture<'_, ()> {
			Box::pin(async move {
				*self.saved.lock() = None;

				Ok(())
			})
		}
	}

	fn credential(token: &str) -> Credential {
		Credential::new(token, macros::datetime!(2025-06-01 12:00 UTC))
	}

	#[tokio::test]
	async fn set_writes_through_and_reopen_primes_slot() {
		let hooks = Arc::new(VecHooks::default());
		let store = <HookStore<VecHooks>>::open(hooks.clone()).await.expect("Open should work.");

		store.set(credential("T1")).await.expect("Set should persist.");

		assert!(hooks.saved.lock().is_some());

		let reopened =
			<HookStore<VecHooks>>::open(hooks.clone()).await.expect("Reopen should work.");
		let loaded = reopened.get().await.expect("Get should work.").expect("Slot is primed.");

		assert_eq!(loaded, credential("T1"));

		reopened.clear().await.expect("Clear should erase.");

		assert!(hooks.saved.lock().is_none());
		assert!(reopened.get().await.expect("Get should work.").is_none());
	}

	#[tokio::test]
	async fn failed_save_keeps_previous_credential() {
		let hooks = Arc::new(VecHooks { fail_saves: true, ..Default::default() });
		let store = <HookStore<VecHooks>>::open(hooks).await.expect("Open should work.");
		let err = store.set(credential("T2")).await.expect_err("Save failure must surface.");

		assert!(matches!(err, StoreError::Backend { .. }));
		assert!(store.get().await.expect("Get should work.").is_none());
	}

	#[tokio::test]
	async fn corrupt_bytes_fail_open() {
		let hooks = Arc::new(VecHooks {
			saved: Mutex::new(Some(b"not json".to_vec())),
			fail_saves: false,
		});
		let err = <HookStore<VecHooks>>::open(hooks).await.expect_err("Corrupt bytes must fail.");

		assert!(matches!(err, StoreError::Serialization { .. }));
	}
}
