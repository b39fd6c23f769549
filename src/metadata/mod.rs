//! metadata
//!
//! Metadata-type aware file selection.
//!
//! # Modules
//!
//! - [`registry`] - Static table of metadata types and their directories
//! - [`selector`] - `Type:Name` selector parsing
//! - [`policy`] - Path heuristics deciding which files a selector wants
//!
//! # Example
//!
//! ```
//! use remote_deploy::metadata::{parse_all, SelectionPolicy};
//!
//! let policy = SelectionPolicy::new(parse_all(&["ApexClass:Foo"]).unwrap());
//! assert!(policy.matches("force-app/main/default/classes/Foo.cls"));
//! assert!(!policy.matches("force-app/main/default/triggers/Foo.trigger"));
//! ```

pub mod policy;
pub mod registry;
pub mod selector;

pub use policy::SelectionPolicy;
pub use registry::MetadataTypeDescriptor;
pub use selector::{parse_all, RequestedComponent, SelectorError};
