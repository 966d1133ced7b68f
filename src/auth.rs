//! Auth-domain identifiers, scope sets, secrets, and the issued credential.

pub mod id;
pub mod scope;
pub mod token;

pub use id::*;
pub use scope::*;
pub use token::{credential::*, secret::*};
