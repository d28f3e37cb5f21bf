// module schema

use clap::Parser;
use serde_derive::Deserialize;
use serde_derive::Serialize;

/// rust-catalog-filter cli struct
#[derive(Parser, Debug)]
#[command(name = "rust-catalog-filter")]
#[command(version = "0.0.1")]
#[command(about = "Filters file based operator catalogs for mirroring", long_about = None)]
pub struct Cli {
    /// imagesetconfig file to use
    #[arg(short, long, value_name = "config", default_value = "imagesetconfig.yaml")]
    pub config: String,

    /// directory holding the untarred file based catalogs (one sub directory per catalog)
    #[arg(short = 'd', long, value_name = "configs-dir", default_value = "working-dir/configs")]
    pub configs_dir: String,

    /// base working directory
    #[arg(short, long, value_name = "working-dir", default_value = "working-dir")]
    pub working_dir: String,

    /// set the log level [info, debug, trace]
    #[arg(short, long, value_name = "loglevel", default_value = "info")]
    pub loglevel: String,
}

/// config schema
#[derive(Serialize, Deserialize, Debug)]
pub struct ImageSetConfig {
    #[serde(rename = "kind")]
    pub kind: String,

    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(rename = "mirror")]
    pub mirror: Mirror,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Mirror {
    #[serde(rename = "operators")]
    pub operators: Option<Vec<Operator>>,
}

/// filter specification for one catalog reference
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Operator {
    #[serde(rename = "catalog")]
    pub catalog: String,

    #[serde(rename = "full", default)]
    pub full: bool,

    #[serde(rename = "targetCatalog", skip_serializing_if = "Option::is_none")]
    pub target_catalog: Option<String>,

    #[serde(rename = "targetTag", skip_serializing_if = "Option::is_none")]
    pub target_tag: Option<String>,

    #[serde(rename = "packages")]
    pub packages: Option<Vec<IncludePackage>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct IncludePackage {
    #[serde(rename = "name")]
    pub name: String,

    #[serde(rename = "full", skip_serializing_if = "Option::is_none")]
    pub full: Option<bool>,

    #[serde(rename = "minVersion", skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,

    #[serde(rename = "maxVersion", skip_serializing_if = "Option::is_none")]
    pub max_version: Option<String>,

    #[serde(rename = "channels", skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<IncludeChannel>>,

    #[serde(rename = "selectedBundles", skip_serializing_if = "Option::is_none")]
    pub selected_bundles: Option<Vec<SelectedBundle>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IncludeChannel {
    #[serde(rename = "name")]
    pub name: String,

    #[serde(rename = "minVersion", skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,

    #[serde(rename = "maxVersion", skip_serializing_if = "Option::is_none")]
    pub max_version: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SelectedBundle {
    #[serde(rename = "name")]
    pub name: String,
}

// declarative catalog records (catalog.json)

/// one raw record of a file based catalog, schema tagged
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeclarativeConfig {
    #[serde(rename = "schema")]
    pub schema: String,

    #[serde(rename = "name", default)]
    pub name: String,

    #[serde(rename = "package")]
    pub package: Option<String>,

    #[serde(rename = "defaultChannel")]
    pub default_channel: Option<String>,

    #[serde(rename = "entries")]
    pub entries: Option<Vec<ChannelEntry>>,

    #[serde(rename = "image")]
    pub image: Option<String>,

    #[serde(rename = "relatedImages")]
    pub related_images: Option<Vec<RelatedImage>>,

    #[serde(rename = "properties")]
    pub properties: Option<serde_json::Value>,
}

/// channel membership record, the replaces/skips edges encode the upgrade graph
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChannelEntry {
    #[serde(rename = "name")]
    pub name: String,

    #[serde(rename = "replaces")]
    pub replaces: Option<String>,

    #[serde(rename = "skips")]
    pub skips: Option<Vec<String>>,

    #[serde(rename = "skipRange")]
    pub skip_range: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RelatedImage {
    #[serde(rename = "name")]
    pub name: String,

    #[serde(rename = "image")]
    pub image: String,
}

// typed catalog records as held in the indices

#[derive(Debug, Clone, Default)]
pub struct CatalogPackage {
    pub name: String,
    pub default_channel: String,
}

#[derive(Debug, Clone)]
pub struct CatalogChannel {
    pub name: String,
    pub package: String,
    pub entries: Vec<ChannelEntry>,
}

#[derive(Debug, Clone)]
pub struct CatalogBundle {
    pub name: String,
    pub package: String,
    pub image: String,
    pub related_images: Vec<RelatedImage>,
}

// resolution result records

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ImageType {
    #[serde(rename = "operatorBundle")]
    OperatorBundle,

    #[serde(rename = "operatorRelatedImage")]
    OperatorRelatedImage,
}

/// related image record with its type tag, one list per included bundle
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CollectedImage {
    #[serde(rename = "name")]
    pub name: String,

    #[serde(rename = "image")]
    pub image: String,

    #[serde(rename = "type")]
    pub image_type: ImageType,
}
