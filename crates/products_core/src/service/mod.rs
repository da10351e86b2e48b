//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep RPC/CLI layers decoupled from storage details.

pub mod resource_store;
