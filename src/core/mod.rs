//! core
//!
//! Core domain types and configuration for rdeploy.
//!
//! # Modules
//!
//! - [`types`] - Strong types: RemoteLocation, Target, ContentEntry, Listing
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Remote data is validated when decoded, never deeper in the walk
//! - Schemas are strict and self-describing

pub mod config;
pub mod types;
