// module index

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use walkdir::WalkDir;

use crate::api::schema::*;
use crate::error::handler::*;
use crate::log::logging::*;

/// cross referenced indices over one declarative catalog load,
/// built once per load and read only thereafter
#[derive(Debug, Clone, Default)]
pub struct OperatorCatalog {
    // package name -> package record
    pub packages: HashMap<String, CatalogPackage>,
    // package name -> channels of that package
    pub channels: HashMap<String, Vec<CatalogChannel>>,
    // package name -> channel name -> bundle name -> channel entry
    pub channel_entries: HashMap<String, HashMap<String, HashMap<String, ChannelEntry>>>,
    // package name -> bundle name -> bundle record
    pub bundles_by_pkg_and_name: HashMap<String, HashMap<String, CatalogBundle>>,
}

impl OperatorCatalog {
    pub fn new() -> OperatorCatalog {
        OperatorCatalog::default()
    }
}

// read_operator_catalog - reads a single catalog.json file and unmarshals
// its stream of concatenated json objects to DeclarativeConfig records
pub fn read_operator_catalog(path: String) -> Result<Vec<DeclarativeConfig>, MirrorError> {
    let data = fs::read_to_string(&path)
        .map_err(|err| MirrorError::new(&format!("couldn't open {}: {}", path, err)))?;

    let mut records = Vec::new();
    for record in serde_json::Deserializer::from_str(&data).into_iter::<DeclarativeConfig>() {
        let dc =
            record.map_err(|err| MirrorError::new(&format!("parsing {}: {}", path, err)))?;
        records.push(dc);
    }
    Ok(records)
}

// get_catalog - walks the configs directory of an untarred catalog image,
// reads every json document and builds the catalog indices
pub fn get_catalog(log: &Logging, config_dir: String) -> Result<OperatorCatalog, MirrorError> {
    let mut records = Vec::new();
    for entry in WalkDir::new(&config_dir).sort_by_file_name() {
        let entry = entry.map_err(|err| MirrorError::new(&format!("{}", err)))?;
        if entry.path().is_file()
            && entry.path().extension().map_or(false, |ext| ext == "json")
        {
            let file = entry.path().display().to_string();
            log.trace(&format!("catalog file {}", file));
            records.extend(read_operator_catalog(file)?);
        }
    }
    Ok(build_catalog(records))
}

// build_catalog - indexes the raw records, ignoring unknown schemas
pub fn build_catalog(records: Vec<DeclarativeConfig>) -> OperatorCatalog {
    let mut catalog = OperatorCatalog::new();

    for dc in records {
        match dc.schema.as_str() {
            "olm.package" => {
                catalog.packages.insert(
                    dc.name.clone(),
                    CatalogPackage {
                        name: dc.name,
                        default_channel: dc.default_channel.unwrap_or_default(),
                    },
                );
            }
            "olm.channel" => {
                let package = dc.package.unwrap_or_default();
                let entries = dc.entries.unwrap_or_default();
                for entry in entries.iter() {
                    catalog
                        .channel_entries
                        .entry(package.clone())
                        .or_default()
                        .entry(dc.name.clone())
                        .or_default()
                        .insert(entry.name.clone(), entry.clone());
                }
                catalog
                    .channels
                    .entry(package.clone())
                    .or_default()
                    .push(CatalogChannel {
                        name: dc.name,
                        package,
                        entries,
                    });
            }
            "olm.bundle" => {
                let package = dc.package.unwrap_or_default();
                catalog
                    .bundles_by_pkg_and_name
                    .entry(package.clone())
                    .or_default()
                    .entry(dc.name.clone())
                    .or_insert(CatalogBundle {
                        name: dc.name,
                        package,
                        image: dc.image.unwrap_or_default(),
                        related_images: dc.related_images.unwrap_or_default(),
                    });
            }
            _ => {}
        }
    }
    catalog
}

// get_catalog_digest - content digest over all json documents of a catalog
// load, stable across identical loads
pub fn get_catalog_digest(config_dir: String) -> Result<String, MirrorError> {
    let mut hasher = Sha256::new();
    for entry in WalkDir::new(&config_dir).sort_by_file_name() {
        let entry = entry.map_err(|err| MirrorError::new(&format!("{}", err)))?;
        if entry.path().is_file()
            && entry.path().extension().map_or(false, |ext| ext == "json")
        {
            let data = fs::read(entry.path())?;
            hasher.update(&data);
        }
    }
    Ok(hex::encode(hasher.finalize()))
}
