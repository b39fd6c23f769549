//! rdeploy - mirror a remote source tree locally and deploy it
//!
//! rdeploy walks a repository through the GitHub contents API, writes the
//! files it selects into a local directory with the same relative layout,
//! and can hand a staged project to the Salesforce CLI for deployment.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, wires components)
//! - [`core`] - Domain types and configuration
//! - [`remote`] - Content sources: the GitHub contents API, throttling, mocks
//! - [`metadata`] - Metadata type registry and file selection
//! - [`walk`] - Concurrent recursive traversal of a remote tree
//! - [`stage`] - Local writes and temporary project staging
//! - [`deploy`] - Boundary to the deploy tool
//! - [`ui`] - User-facing output
//!
//! # Guarantees
//!
//! 1. A walk completes only after every reachable entry has been processed
//! 2. Every written file lands at its repository path under the chosen root
//! 3. Any fetch failure fails the walk unless failures are explicitly collected

pub mod cli;
pub mod core;
pub mod deploy;
pub mod metadata;
pub mod remote;
pub mod stage;
pub mod ui;
pub mod walk;
