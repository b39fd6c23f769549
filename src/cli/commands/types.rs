//! types command - List known metadata types

use crate::cli::Context;
use crate::metadata::{registry, MetadataTypeDescriptor};
use crate::ui::output;
use anyhow::{bail, Result};

/// Print every registered metadata type matching `filter`.
///
/// The filter is a case-insensitive substring of the type or directory name.
pub fn types(ctx: &Context, filter: Option<&str>) -> Result<()> {
    let rows = matching(filter);
    if rows.is_empty() {
        bail!("No metadata types match '{}'", filter.unwrap_or_default());
    }

    let width = rows.iter().map(|d| d.type_name.len()).max().unwrap_or(0);
    for descriptor in &rows {
        output::print(format_row(descriptor, width), ctx.verbosity());
    }
    Ok(())
}

fn matching(filter: Option<&str>) -> Vec<MetadataTypeDescriptor> {
    let needle = filter.map(str::to_ascii_lowercase);
    registry::all()
        .filter(|d| match &needle {
            Some(n) => {
                d.type_name.to_ascii_lowercase().contains(n.as_str())
                    || d.directory_name.to_ascii_lowercase().contains(n.as_str())
            }
            None => true,
        })
        .collect()
}

/// `ApexClass      classes`, with the parent directory for nested types.
fn format_row(descriptor: &MetadataTypeDescriptor, width: usize) -> String {
    let directory = match &descriptor.parent {
        Some(parent) => format!("{}/*/{}", parent.directory_name, descriptor.directory_name),
        None => descriptor.directory_name.clone(),
    };
    format!("{:<width$}  {}", descriptor.type_name, directory, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_lists_everything() {
        assert_eq!(matching(None).len(), registry::all().count());
    }

    #[test]
    fn filter_matches_type_or_directory() {
        let names: Vec<String> = matching(Some("TRIGGER"))
            .into_iter()
            .map(|d| d.type_name)
            .collect();
        assert!(names.contains(&"ApexTrigger".to_string()));

        let by_dir: Vec<String> = matching(Some("classes"))
            .into_iter()
            .map(|d| d.type_name)
            .collect();
        assert!(by_dir.contains(&"ApexClass".to_string()));
    }

    #[test]
    fn nested_rows_show_parent_directory() {
        let field = registry::lookup("CustomField").unwrap();
        assert_eq!(format_row(&field, 11), "CustomField  objects/*/fields");

        let apex = registry::lookup("ApexClass").unwrap();
        assert_eq!(format_row(&apex, 11), "ApexClass    classes");
    }

    #[test]
    fn unknown_filter_is_an_error() {
        assert!(types(&Context::default(), Some("no-such-type")).is_err());
    }
}
