//! metadata::registry
//!
//! Static table of metadata types and the directories their source files
//! conventionally live in.
//!
//! Nested types (fields, record types, validation rules, ...) name their
//! parent type; the parent's directory appears above theirs in a source
//! tree, e.g. `objects/Account/fields/Foo__c.field-meta.xml`.

/// Where a metadata type's files conventionally live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTypeDescriptor {
    /// Metadata API name, e.g. `ApexClass`.
    pub type_name: String,
    /// Directory name in a source tree, e.g. `classes`.
    pub directory_name: String,
    /// Parent type for nested types.
    pub parent: Option<Box<MetadataTypeDescriptor>>,
}

impl MetadataTypeDescriptor {
    pub fn new(type_name: impl Into<String>, directory_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            directory_name: directory_name.into(),
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: MetadataTypeDescriptor) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }
}

/// One registry row.
#[derive(Debug, Clone, Copy)]
struct TypeDef {
    name: &'static str,
    directory: &'static str,
    parent: Option<&'static str>,
}

const fn top(name: &'static str, directory: &'static str) -> TypeDef {
    TypeDef {
        name,
        directory,
        parent: None,
    }
}

const fn child(name: &'static str, directory: &'static str, parent: &'static str) -> TypeDef {
    TypeDef {
        name,
        directory,
        parent: Some(parent),
    }
}

static TYPES: &[TypeDef] = &[
    top("ApexClass", "classes"),
    top("ApexComponent", "components"),
    top("ApexPage", "pages"),
    top("ApexTestSuite", "testSuites"),
    top("ApexTrigger", "triggers"),
    top("AssignmentRules", "assignmentRules"),
    top("AuraDefinitionBundle", "aura"),
    top("AutoResponseRules", "autoResponseRules"),
    top("Certificate", "certs"),
    top("ConnectedApp", "connectedApps"),
    top("ContentAsset", "contentassets"),
    top("CspTrustedSite", "cspTrustedSites"),
    top("CustomApplication", "applications"),
    top("CustomLabels", "labels"),
    top("CustomMetadata", "customMetadata"),
    top("CustomObject", "objects"),
    top("CustomObjectTranslation", "objectTranslations"),
    top("CustomPermission", "customPermissions"),
    top("CustomSite", "sites"),
    top("CustomTab", "tabs"),
    top("Dashboard", "dashboards"),
    top("Document", "documents"),
    top("DuplicateRule", "duplicateRules"),
    top("EmailTemplate", "email"),
    top("EscalationRules", "escalationRules"),
    top("ExternalDataSource", "dataSources"),
    top("FlexiPage", "flexipages"),
    top("Flow", "flows"),
    top("GlobalValueSet", "globalValueSets"),
    top("Group", "groups"),
    top("Layout", "layouts"),
    top("LightningComponentBundle", "lwc"),
    top("LightningMessageChannel", "messageChannels"),
    top("MatchingRules", "matchingRules"),
    top("NamedCredential", "namedCredentials"),
    top("PermissionSet", "permissionsets"),
    top("PermissionSetGroup", "permissionsetgroups"),
    top("PlatformEventChannel", "platformEventChannels"),
    top("Profile", "profiles"),
    top("QuickAction", "quickActions"),
    top("Queue", "queues"),
    top("RemoteSiteSetting", "remoteSiteSettings"),
    top("Report", "reports"),
    top("Role", "roles"),
    top("SharingRules", "sharingRules"),
    top("StandardValueSet", "standardValueSets"),
    top("StaticResource", "staticresources"),
    top("TopicsForObjects", "topicsForObjects"),
    top("Translations", "translations"),
    top("Workflow", "workflows"),
    child("BusinessProcess", "businessProcesses", "CustomObject"),
    child("CompactLayout", "compactLayouts", "CustomObject"),
    child("CustomField", "fields", "CustomObject"),
    child("FieldSet", "fieldSets", "CustomObject"),
    child("Index", "indexes", "CustomObject"),
    child("ListView", "listViews", "CustomObject"),
    child("RecordType", "recordTypes", "CustomObject"),
    child("SharingReason", "sharingReasons", "CustomObject"),
    child("ValidationRule", "validationRules", "CustomObject"),
    child("WebLink", "webLinks", "CustomObject"),
];

fn find(name: &str) -> Option<&'static TypeDef> {
    TYPES
        .iter()
        .find(|t| t.name == name)
        .or_else(|| TYPES.iter().find(|t| t.name.eq_ignore_ascii_case(name)))
}

fn describe(def: &TypeDef) -> MetadataTypeDescriptor {
    let descriptor = MetadataTypeDescriptor::new(def.name, def.directory);
    // Parents are always top-level rows, so one level of lookup suffices.
    match def.parent.and_then(find) {
        Some(parent) => descriptor.with_parent(MetadataTypeDescriptor::new(
            parent.name,
            parent.directory,
        )),
        None => descriptor,
    }
}

/// Look up a metadata type by name.
///
/// Exact matches win; otherwise the first ASCII case-insensitive match is
/// returned. Unknown names yield `None`.
pub fn lookup(name: &str) -> Option<MetadataTypeDescriptor> {
    find(name).map(describe)
}

/// Every registered type, in registry order.
pub fn all() -> impl Iterator<Item = MetadataTypeDescriptor> {
    TYPES.iter().map(describe)
}
