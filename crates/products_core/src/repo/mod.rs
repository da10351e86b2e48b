//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence port consumed by the resource store.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate payloads before persistence.
//! - Mutations are conditional on `available = 1` and report `NotFound`
//!   when the condition no longer holds.

pub mod product_repo;
pub mod resource_repo;
