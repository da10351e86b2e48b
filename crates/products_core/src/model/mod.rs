//! Domain model for soft-deletable resources.
//!
//! # Responsibility
//! - Define the generic resource contract shared by storage and service.
//! - Define the concrete product record and its payload shapes.
//! - Define pagination request/response envelopes.
//!
//! # Invariants
//! - Every resource is identified by a backend-assigned, never reused id.
//! - Deletion is represented by `Visibility::Retired`, not by row removal.

pub mod page;
pub mod product;
pub mod resource;
