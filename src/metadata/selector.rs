//! metadata::selector
//!
//! Parsing of `Type:Name` component selectors.

use std::str::FromStr;

use thiserror::Error;

use super::registry::{self, MetadataTypeDescriptor};

/// Errors from selector parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("invalid metadata selector '{0}': expected <Type>:<Name>")]
    MissingSeparator(String),

    #[error("invalid metadata selector '{selector}': unknown metadata type '{type_name}'")]
    UnknownType { selector: String, type_name: String },

    #[error("invalid metadata selector '{0}': component name cannot be empty")]
    EmptyName(String),
}

/// One requested metadata component, e.g. `ApexClass:AccountService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedComponent {
    pub descriptor: MetadataTypeDescriptor,
    pub component_name: String,
}

impl RequestedComponent {
    pub fn new(descriptor: MetadataTypeDescriptor, component_name: impl Into<String>) -> Self {
        Self {
            descriptor,
            component_name: component_name.into(),
        }
    }

    /// Split the name of a nested type into its owner and member.
    ///
    /// `CustomField:Account.Tier__c` gives `(Some("Account"), "Tier__c")`.
    /// Top-level types, and nested names without a `.`, have no owner.
    pub fn member_name(&self) -> (Option<&str>, &str) {
        let name = self.component_name.as_str();
        match (&self.descriptor.parent, name.split_once('.')) {
            (Some(_), Some((owner, member))) if !owner.is_empty() && !member.is_empty() => {
                (Some(owner), member)
            }
            _ => (None, name),
        }
    }

    /// Parse a `Type:Name` token against the type registry.
    ///
    /// The split happens at the first `:`; surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// - `MissingSeparator` if there is no `:`
    /// - `UnknownType` if the type is not registered
    /// - `EmptyName` if nothing follows the `:`
    pub fn parse(token: &str) -> Result<Self, SelectorError> {
        let (type_name, name) = token
            .split_once(':')
            .ok_or_else(|| SelectorError::MissingSeparator(token.to_string()))?;
        let type_name = type_name.trim();
        let name = name.trim();

        let descriptor =
            registry::lookup(type_name).ok_or_else(|| SelectorError::UnknownType {
                selector: token.to_string(),
                type_name: type_name.to_string(),
            })?;

        if name.is_empty() {
            return Err(SelectorError::EmptyName(token.to_string()));
        }

        Ok(Self::new(descriptor, name))
    }
}

impl FromStr for RequestedComponent {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders back into the canonical `Type:Name` form.
impl std::fmt::Display for RequestedComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.descriptor.type_name, self.component_name)
    }
}

/// Parse every token, failing on the first invalid one.
pub fn parse_all<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<RequestedComponent>, SelectorError> {
    tokens.iter().map(|t| RequestedComponent::parse(t.as_ref())).collect()
}
