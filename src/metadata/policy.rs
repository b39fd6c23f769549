//! metadata::policy
//!
//! Decides which files belong to a set of requested components.
//!
//! # Matching
//!
//! A candidate path such as `force-app/main/default/classes/Foo.cls` is split
//! into segments. A requested component matches when all of the following
//! hold:
//!
//! 1. its name equals the file name up to the first `.`, or equals one of the
//!    segments (bundle types keep a component in its own directory, e.g.
//!    `lwc/myCard/myCard.js`);
//! 2. its type's directory name is one of the segments;
//! 3. for nested types, the parent type's directory name is one of the
//!    segments.
//!
//! Nested types are usually named `Parent.Child` (`Account.Tier__c` for a
//! field on `Account`). For those, rule 1 applies to `Child` and `Parent`
//! must also be one of the segments. The bare `Child` form is accepted too.
//!
//! File names without a `.` never match. Containment is positional, not a
//! prefix test, so an unrelated directory that happens to be called
//! `classes` also satisfies rule 2.

use super::selector::RequestedComponent;

/// File name up to the first `.`; `None` for names without one.
pub fn stem(file_name: &str) -> Option<&str> {
    file_name.split_once('.').map(|(stem, _)| stem)
}

/// Filter over repository-relative file paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    components: Vec<RequestedComponent>,
}

impl SelectionPolicy {
    pub fn new(components: Vec<RequestedComponent>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[RequestedComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Check if any requested component matches `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.matching(path).is_some()
    }

    /// The first requested component that matches `path`.
    pub fn matching(&self, path: &str) -> Option<&RequestedComponent> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let file_stem = stem(segments.last()?)?;

        self.components
            .iter()
            .find(|c| component_matches(c, file_stem, &segments))
    }
}

fn component_matches(component: &RequestedComponent, file_stem: &str, segments: &[&str]) -> bool {
    let has_segment = |wanted: &str| segments.iter().any(|s| *s == wanted);
    let (owner, name) = component.member_name();

    let name_matches = name == file_stem || has_segment(name);
    let owner_matches = owner.map_or(true, |o| has_segment(o));
    let directory_matches = has_segment(&component.descriptor.directory_name);
    let parent_matches = component
        .descriptor
        .parent
        .as_ref()
        .map_or(true, |parent| has_segment(&parent.directory_name));

    name_matches && owner_matches && directory_matches && parent_matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::registry::MetadataTypeDescriptor;

    fn classes(name: &str) -> RequestedComponent {
        RequestedComponent::new(MetadataTypeDescriptor::new("ApexClass", "classes"), name)
    }

    fn field_with_parent(parent_dir: &str, name: &str) -> RequestedComponent {
        RequestedComponent::new(
            MetadataTypeDescriptor::new("CustomField", "fields")
                .with_parent(MetadataTypeDescriptor::new("Parent", parent_dir)),
            name,
        )
    }

    #[test]
    fn stem_is_text_before_first_dot() {
        assert_eq!(stem("Foo.cls"), Some("Foo"));
        assert_eq!(stem("Foo.field-meta.xml"), Some("Foo"));
        assert_eq!(stem(".hidden"), Some(""));
        assert_eq!(stem("README"), None);
    }

    #[test]
    fn class_in_classes_dir_matches() {
        let policy = SelectionPolicy::new(vec![classes("Foo")]);
        assert!(policy.matches("force-app/classes/Foo.cls"));
        assert!(policy.matches("force-app/classes/Foo.cls-meta.xml"));
    }

    #[test]
    fn class_outside_classes_dir_does_not_match() {
        let policy = SelectionPolicy::new(vec![classes("Foo")]);
        assert!(!policy.matches("force-app/triggers/Foo.trigger"));
    }

    #[test]
    fn different_name_does_not_match() {
        let policy = SelectionPolicy::new(vec![classes("Foo")]);
        assert!(!policy.matches("force-app/classes/FooBar.cls"));
    }

    #[test]
    fn nested_type_requires_parent_directory() {
        let path = "force-app/objects/Account/fields/Foo.field-meta.xml";
        assert!(SelectionPolicy::new(vec![field_with_parent("objects", "Foo")]).matches(path));
        assert!(!SelectionPolicy::new(vec![field_with_parent("layouts", "Foo")]).matches(path));
    }

    #[test]
    fn qualified_nested_name_matches_owner_and_child() {
        let path = "force-app/main/default/objects/Account/fields/Tier__c.field-meta.xml";
        let select = |name: &str| SelectionPolicy::new(vec![field_with_parent("objects", name)]);

        assert!(select("Account.Tier__c").matches(path));
        assert!(!select("Contact.Tier__c").matches(path));
        assert!(!select("Account.Rank__c").matches(path));
    }

    #[test]
    fn dotted_name_on_top_level_type_is_taken_literally() {
        let policy = SelectionPolicy::new(vec![classes("Foo.Bar")]);
        assert!(!policy.matches("force-app/classes/Bar.cls"));
        assert!(policy.matches("force-app/classes/Foo.Bar/x.cls"));
    }

    #[test]
    fn bundle_component_matches_by_directory_segment() {
        let lwc = RequestedComponent::new(
            MetadataTypeDescriptor::new("LightningComponentBundle", "lwc"),
            "myCard",
        );
        let policy = SelectionPolicy::new(vec![lwc]);
        assert!(policy.matches("force-app/lwc/myCard/myCard.js"));
        assert!(policy.matches("force-app/lwc/myCard/templates/card.html"));
        assert!(!policy.matches("force-app/lwc/otherCard/otherCard.js"));
    }

    #[test]
    fn extensionless_file_never_matches() {
        let policy = SelectionPolicy::new(vec![classes("Foo")]);
        assert!(!policy.matches("force-app/classes/Foo"));
        assert!(!policy.matches("force-app/classes/Foo/LICENSE"));
    }

    #[test]
    fn unrelated_directory_sharing_the_name_is_a_false_positive() {
        // Containment is positional: any segment named `classes` qualifies.
        let policy = SelectionPolicy::new(vec![classes("Foo")]);
        assert!(policy.matches("docs/classes/Foo.md"));
        assert!(policy.matches("classes/unrelated/Foo.txt"));
    }

    #[test]
    fn directory_name_is_not_a_prefix_match() {
        let policy = SelectionPolicy::new(vec![classes("Foo")]);
        assert!(!policy.matches("force-app/classesOld/Foo.cls"));
        assert!(!policy.matches("force-app/myclasses/Foo.cls"));
    }

    #[test]
    fn first_matching_component_wins() {
        let policy = SelectionPolicy::new(vec![classes("Bar"), classes("Foo"), classes("Foo")]);
        let hit = policy.matching("src/classes/Foo.cls").unwrap();
        assert_eq!(hit.component_name, "Foo");
        assert!(std::ptr::eq(hit, &policy.components()[1]));
    }

    #[test]
    fn empty_policy_matches_nothing() {
        let policy = SelectionPolicy::default();
        assert!(policy.is_empty());
        assert!(!policy.matches("force-app/classes/Foo.cls"));
    }
}
