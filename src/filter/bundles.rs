// module bundles

use semver::Version;
use std::collections::HashMap;

use crate::api::schema::*;
use crate::error::handler::*;

// filter_bundles - resolves one channel's entries against an optional
// version range, returns the bundle names to include
//
// with no range and full unset the channel resolves to its head only,
// where the head is the running maximum version seen across all entries,
// reconciled against held back pre-releases afterwards
pub fn filter_bundles(
    channel_entries: &HashMap<String, ChannelEntry>,
    package: &str,
    channel: &str,
    min: &Option<String>,
    max: &Option<String>,
    full: bool,
) -> Result<Vec<String>, MirrorError> {
    let min_version = match min {
        Some(v) => Some(parse_tolerant(v)?),
        None => None,
    };
    let max_version = match max {
        Some(v) => Some(parse_tolerant(v)?),
        None => None,
    };

    let mut filtered: Vec<String> = Vec::new();
    let mut current_head = Version::new(0, 0, 0);
    let mut current_head_name = String::new();
    let mut pre_releases: HashMap<String, ChannelEntry> = HashMap::new();

    for entry in channel_entries.values() {
        let version = get_channel_entry_semver(&entry.name)?;

        // a pre-release may transiently be head, its own reconciliation
        // below can supersede it
        if version > current_head {
            current_head = version.clone();
            current_head_name = entry.name.clone();
        }

        if !version.pre.is_empty() {
            let key = format!(
                "{}.{}.{}-{}",
                version.major, version.minor, version.patch, version.pre
            );
            pre_releases.insert(key, entry.clone());
            // held back from the primary pass, a pre-release only joins the
            // inclusion set through an already included sibling
            continue;
        }

        if (min_version.as_ref().map_or(true, |m| version >= *m))
            && (max_version.as_ref().map_or(true, |m| version <= *m))
        {
            // no range and not full: only the channel head is wanted,
            // resolved after the pre-release reconciliation
            if min.is_none() && max.is_none() && !full {
                continue;
            }
            filtered.push(entry.name.clone());
        }
    }

    for (version, entry) in pre_releases.iter() {
        // pre-releases that skip or replace the current head of a channel
        // should be considered as head, even if semver orders them lower
        if is_pre_release_head(entry, &current_head_name) {
            current_head_name = entry.name.clone();
        }

        if is_pre_release_of_filtered_version(version, &entry.name, &filtered) {
            filtered.push(entry.name.clone());
        }
    }

    if min.is_none() && max.is_none() && !full && current_head != Version::new(0, 0, 0) {
        return Ok(vec![current_head_name]);
    }

    if filtered.is_empty() && !full {
        return Err(MirrorError::new(&format!(
            "no bundles found for package {} in channel {} with range [{},{}]",
            package,
            channel,
            min.clone().unwrap_or_default(),
            max.clone().unwrap_or_default()
        )));
    }

    Ok(filtered)
}

// get_channel_entry_semver - the version is embedded in the bundle name
// after the first '.' separator
pub fn get_channel_entry_semver(entry_name: &str) -> Result<Version, MirrorError> {
    let parts: Vec<&str> = entry_name.split('.').collect();
    if parts.len() < 4 {
        return Err(MirrorError::new(&format!(
            "incorrect version format {}",
            entry_name
        )));
    }
    parse_tolerant(&parts[1..].join("."))
}

// parse_tolerant - semver parsing tolerant of a leading 'v' and of a
// partial major.minor release core
pub fn parse_tolerant(version: &str) -> Result<Version, MirrorError> {
    let trimmed = version.trim().trim_start_matches(['v', 'V']);
    let core_end = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, rest) = trimmed.split_at(core_end);
    let padded = match core.matches('.').count() {
        0 => format!("{}.0.0{}", core, rest),
        1 => format!("{}.0{}", core, rest),
        _ => trimmed.to_string(),
    };
    Version::parse(&padded).map_err(|err| MirrorError::new(&format!("{} {}", version, err)))
}

fn is_pre_release_head(entry: &ChannelEntry, current_head_name: &str) -> bool {
    entry
        .skips
        .as_ref()
        .map_or(false, |skips| skips.iter().any(|s| s == current_head_name))
        || entry.replaces.as_deref() == Some(current_head_name)
}

fn is_pre_release_of_filtered_version(
    version: &str,
    entry_name: &str,
    filtered: &[String],
) -> bool {
    if filtered.iter().any(|name| name == entry_name) {
        return false;
    }
    let release_core = version.split('-').next().unwrap_or(version);
    filtered.iter().any(|name| name.contains(release_core))
}
