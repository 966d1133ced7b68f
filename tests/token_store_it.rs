// std
use std::sync::Arc;
// crates.io
use parking_lot::Mutex;
use time::{Duration, macros};
// self
use oauth2_codeflow::{
	auth::Credential,
	store::{HookStore, MemoryStore, PersistenceHooks, StoreError, StoreFuture, TokenStore},
};

#[derive(Default)]
struct SealedHooks {
	sealed: Mutex<Option<Vec<u8>>>,
}
impl PersistenceHooks for SealedHooks {
	fn save(&self, bytes: Vec<u8>) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			*self.sealed.lock() = Some(bytes.into_iter().rev().collect());

			Ok(())
		})
	}

	fn load(&self) -> StoreFuture<'_, Option<Vec<u8>>> {
		Box::pin(async move {
			Ok(self.sealed.lock().as_ref().map(|bytes| bytes.iter().rev().copied().collect()))
		})
	}

	fn erase(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			*self.sealed.lock() = None;

			Ok(())
		})
	}
}

fn credential(token: &str) -> Credential {
	Credential::new(token, macros::datetime!(2025-11-10 12:00 UTC))
		.expiring_in(Duration::hours(1))
		.expect("One hour should be representable.")
}

async fn assert_round_trip(store: Arc<dyn TokenStore>) -> Result<(), StoreError> {
	assert!(store.get().await?.is_none());

	store.set(credential("T1")).await?;

	assert_eq!(store.get().await?, Some(credential("T1")));

	store.set(credential("T2")).await?;

	assert_eq!(store.get().await?, Some(credential("T2")));

	store.clear().await?;

	assert_eq!(store.get().await?, None);

	Ok(())
}

#[tokio::test]
async fn memory_store_round_trips_and_clears() {
	assert_round_trip(Arc::new(MemoryStore::default()))
		.await
		.expect("Memory store operations should succeed.");
}

#[tokio::test]
async fn hook_store_round_trips_and_clears() {
	let store = <HookStore<SealedHooks>>::open(SealedHooks::default())
		.await
		.expect("Hook store should open on empty hooks.");

	assert_round_trip(Arc::new(store)).await.expect("Hook store operations should succeed.");
}

#[tokio::test]
async fn hook_store_survives_reopen_through_sealed_bytes() {
	let hooks = Arc::new(SealedHooks::default());
	let store =
		<HookStore<SealedHooks>>::open(hooks.clone()).await.expect("Hook store should open.");

	store.set(credential("T1")).await.expect("Set should persist.");

	let sealed = hooks.sealed.lock().clone().expect("Hooks should hold sealed bytes.");

	assert!(serde_json::from_slice::<serde_json::Value>(&sealed).is_err());

	let reopened =
		<HookStore<SealedHooks>>::open(hooks).await.expect("Hook store should reopen.");

	assert_eq!(
		reopened.get().await.expect("Get should succeed."),
		Some(credential("T1")),
		"Reopened store should be primed from the hooks."
	);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_readers_never_see_torn_credentials() {
	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let known = [credential("T1"), credential("T2")];
	let mut tasks = Vec::new();

	for i in 0..8 {
		let store = store.clone();
		let known = known.clone();

		tasks.push(tokio::spawn(async move {
			for round in 0..200 {
				if (i + round) % 3 == 0 {
					store
						.set(known[(i + round) % 2].clone())
						.await
						.expect("Concurrent set should succeed.");
				} else if let Some(seen) = store.get().await.expect("Concurrent get should work.") {
					assert!(known.contains(&seen), "Reader observed an unknown credential.");
				}
			}
		}));
	}

	for task in tasks {
		task.await.expect("Store task should not panic.");
	}

	store.clear().await.expect("Clear should succeed.");

	assert!(store.get().await.expect("Get should succeed.").is_none());
}
