//! Data-driven pantheon content and loaders.
//!
//! This crate houses the shipped content and loaders for its RON/TOML files:
//! - Deity descriptors and relationship tables (RON)
//! - The capability catalog (RON)
//! - Progression balance (TOML)
//!
//! The shipped files are embedded at build time, so a host can start without
//! a data directory; [`ContentFactory::new`] reads an override directory instead.
//!
//! All loaders use pantheon-core types directly with serde for deserialization.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    CapabilityLoader, ConfigLoader, Content, ContentFactory, DeityLoader, LoadResult,
};
