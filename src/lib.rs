//! OAuth 2.0 authorization-code flow with state-checked callback classification, single-use
//! code exchanges, and swappable token stores.
//!
//! The crate is organized leaves first:
//!
//! - [`auth`] holds identifiers, scopes, secrets, and the immutable [`auth::Credential`].
//! - [`store`] exposes the [`store::TokenStore`] contract plus in-memory and hook-backed stores.
//! - [`provider`] describes the single provider a flow talks to.
//! - [`http`] defines the [`http::ProviderClient`] boundary and its reqwest implementation.
//! - [`flows`] wires everything into [`flows::AuthorizationCodeFlow`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod provider;
pub mod store;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
