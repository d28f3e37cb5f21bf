// module filter_digest

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::api::schema::*;
use crate::error::handler::*;

// digest_of_filter - content addressed key for a (filter, catalog content)
// pair, the target fields are excluded so retagging does not invalidate
// the cached filtered result
pub fn digest_of_filter(operator: &Operator, catalog_digest: &str) -> Result<String, MirrorError> {
    let mut normalized = operator.clone();
    normalized.target_catalog = None;
    normalized.target_tag = None;
    let data = serde_json::to_string(&normalized)?;

    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hasher.update(catalog_digest.as_bytes());
    Ok(hex::encode(hasher.finalize())[0..32].to_string())
}

// find_filter_digest - locates the cache slot for a previously filtered
// catalog, falling back to the legacy key scheme (computed without the
// catalog digest) for artifacts produced by older versions, legacy entries
// are never migrated or deleted
pub fn find_filter_digest(
    operator: &Operator,
    catalog_digest: &str,
    filtered_catalogs_dir: &str,
) -> Result<String, MirrorError> {
    let normalized = digest_of_filter(operator, catalog_digest)?;
    if Path::new(filtered_catalogs_dir)
        .join(&normalized)
        .join("digest")
        .exists()
    {
        return Ok(normalized);
    }

    if !catalog_digest.is_empty() {
        let legacy = digest_of_filter(operator, "")?;
        if legacy != normalized
            && Path::new(filtered_catalogs_dir)
                .join(&legacy)
                .join("digest")
                .exists()
        {
            return Ok(legacy);
        }
    }

    Ok(normalized)
}
