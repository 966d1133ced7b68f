//! Provider descriptor: the endpoints, client-auth preference, and quirks of the single
//! provider a flow talks to.
//!
//! Descriptors are plain serde data so they can be loaded from application config, and are
//! validated once by [`ProviderDescriptorBuilder::build`].

pub mod descriptor;

pub use descriptor::*;
