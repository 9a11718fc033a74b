//! Tessera - headless CMS core
//!
//! Record types register with the schema metadata registry, which exposes
//! them as collections; the capability engine decides who may touch them.
//! All modules are public for the binary and for testing.

pub mod context;
pub mod entities;
pub mod errors;
pub mod permissions;
pub mod schema;
pub mod settings;
pub mod storage;
pub mod web;

pub use context::CmsContext;
