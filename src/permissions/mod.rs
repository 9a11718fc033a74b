//! Extensible bitmask permission engine: fixed built-in capabilities plus
//! runtime-registered ones persisted through a [`CapabilityStore`].

pub mod engine;
pub mod errors;
pub mod store;
pub mod types;

pub use engine::CapabilityRegistry;
pub use errors::CapabilityError;
pub use store::{CapabilityStore, StoredCapability};
pub use types::{has_capability, Capability, CapabilitySet, BUILTINS, BUILTIN_COUNT, MAX_CAPABILITIES};
