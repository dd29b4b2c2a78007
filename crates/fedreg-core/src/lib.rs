//! # fedreg-core — URN Grammar and Catalogs for the FedReg Stack
//!
//! This crate is the foundation of the FedReg Stack. It defines the URN
//! identifier grammar shared by every jurisdiction instance and the
//! runtime-mutable catalog of category / record-type combinations a
//! jurisdiction is willing to mint. Every other crate in the workspace
//! depends on `fedreg-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Parsing is pure over a snapshot.** [`Urn::parse`] and
//!    [`Urn::generate`] take an explicit [`CatalogSnapshot`] and
//!    [`UrnPolicy`] — no process-wide mutable state, no hidden
//!    configuration reads mid-parse.
//!
//! 2. **Snapshots are immutable, registries swap pointers.** The
//!    [`CatalogRegistry`] replaces its active snapshot atomically on
//!    reload; a concurrent reader always observes one consistent catalog,
//!    never a half-updated one.
//!
//! 3. **Errors are tagged kinds.** [`UrnError`] distinguishes grammar
//!    failures from policy failures from catalog rejections so callers can
//!    branch without string matching.
//!
//! 4. **Round-trip by construction.** `generate` re-parses the string it
//!    assembled before returning it, so every minted URN is guaranteed to
//!    parse back to byte-identical components.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `fedreg-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests and static regex
//!   construction.

pub mod catalog;
pub mod error;
pub mod urn;

// Re-export primary types for ergonomic imports.
pub use catalog::{
    CatalogConfig, CatalogOverride, CatalogRegistry, CatalogSnapshot, EffectiveCatalog,
};
pub use error::{CatalogError, UrnError};
pub use urn::{MintRequest, Urn, UrnComponents, UrnPolicy, ValidationReport};
