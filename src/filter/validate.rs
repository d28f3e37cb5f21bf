// module validate

use crate::api::schema::*;
use crate::error::handler::*;

/// the mutually exclusive selection modes of one package filter,
/// computed once so invalid combinations never reach the resolver
#[derive(Debug, Clone, PartialEq)]
pub enum FilterMode {
    SelectedBundles(Vec<String>),
    Channels(Vec<IncludeChannel>),
    DefaultChannel {
        min_version: Option<String>,
        max_version: Option<String>,
    },
}

// filter_mode_for_package - rejects mixed selection modes and returns the
// single mode to resolve with, 'full' is the effective catalog or package flag
pub fn filter_mode_for_package(pkg: &IncludePackage, full: bool) -> Result<FilterMode, MirrorError> {
    let has_selected = pkg.selected_bundles.as_ref().map_or(false, |s| !s.is_empty());
    let has_channels = pkg.channels.as_ref().map_or(false, |c| !c.is_empty());
    let has_range = pkg.min_version.is_some() || pkg.max_version.is_some();

    if has_selected && (has_channels || has_range) {
        return Err(MirrorError::new(
            "cannot use filtering by bundle selection and filtering by channels or min/max versions at the same time",
        ));
    }
    if has_selected && full {
        return Err(MirrorError::new(
            "cannot use filtering by bundle selection and full at the same time",
        ));
    }
    if has_channels && has_range {
        return Err(MirrorError::new(
            "cannot use channels/full and min/max versions at the same time",
        ));
    }
    if full && has_range {
        return Err(MirrorError::new(
            "cannot use channels/full and min/max versions at the same time",
        ));
    }

    if has_selected {
        let names = pkg
            .selected_bundles
            .clone()
            .unwrap_or_default()
            .iter()
            .map(|b| b.name.clone())
            .collect();
        return Ok(FilterMode::SelectedBundles(names));
    }
    if has_channels {
        return Ok(FilterMode::Channels(pkg.channels.clone().unwrap_or_default()));
    }
    Ok(FilterMode::DefaultChannel {
        min_version: pkg.min_version.clone(),
        max_version: pkg.max_version.clone(),
    })
}

// validate_filter_configuration - the stricter whole configuration path,
// applied before any catalog is loaded
pub fn validate_filter_configuration(operator: &Operator) -> Result<(), MirrorError> {
    for (i, pkg) in operator
        .packages
        .clone()
        .unwrap_or_default()
        .iter()
        .enumerate()
    {
        let has_range = pkg.min_version.is_some() || pkg.max_version.is_some();
        if operator.full && has_range {
            return Err(MirrorError::new("Full: true cannot be mixed with versionRange"));
        }
        for (j, channel) in pkg.channels.clone().unwrap_or_default().iter().enumerate() {
            let channel_has_range = channel.min_version.is_some() || channel.max_version.is_some();
            if has_range && channel_has_range {
                return Err(MirrorError::new(&format!(
                    "package \"{}\" at index [{}] is invalid: package specifies a VersionRange, while channel \"{}\" at index [{}] equally specifies one: package.VersionRange and channel.VersionRange are exclusive",
                    pkg.name, i, channel.name, j
                )));
            }
        }
    }
    Ok(())
}
