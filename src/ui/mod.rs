//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! Command handlers print through this module so that `--quiet` and
//! `--debug` are honored consistently. Library code logs through the `log`
//! facade instead.

pub mod output;
