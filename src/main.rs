// use modules
use clap::Parser;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::process;

// define local modules
mod api;
mod cache;
mod catalog;
mod config;
mod error;
mod filter;
mod log;
mod operator;

// use local modules
use api::schema::*;
use cache::filter_digest::*;
use catalog::index::*;
use config::load::*;
use error::handler::*;
use filter::validate::*;
use log::logging::*;
use operator::collector::*;

// catalog_component - the directory component of a catalog reference,
// i.e. the last path segment with tag and digest stripped
fn catalog_component(catalog: &str) -> String {
    let without_digest = catalog.split('@').next().unwrap_or(catalog);
    let last = without_digest
        .rsplit('/')
        .next()
        .unwrap_or(without_digest);
    last.split(':').next().unwrap_or(last).to_string()
}

fn run(log: &Logging, args: &Cli) -> Result<(), MirrorError> {
    // parse the image set config
    let data = load_config(args.config.clone())?;
    let isc = parse_yaml_config(data)?;
    log.debug(&format!("{:#?}", isc.mirror.operators));

    let filtered_catalogs_dir = format!("{}/filtered-catalogs", args.working_dir);

    // iterate through each catalog
    for op in isc.mirror.operators.unwrap_or_default().iter() {
        validate_filter_configuration(op)?;

        let component = catalog_component(&op.catalog);
        let config_dir = format!("{}/{}", args.configs_dir, component);
        log.info(&format!("catalog {}", op.catalog));

        let catalog = get_catalog(log, config_dir.clone())?;
        let catalog_digest = get_catalog_digest(config_dir)?;
        log.debug(&format!("catalog digest {}", catalog_digest));

        let related_images = filter_related_images_from_catalog(log, &catalog, op)?;

        let contents = serde_json::to_string_pretty(&related_images)?;
        let mut hasher = Sha256::new();
        hasher.update(contents.as_bytes());
        let result_digest = hex::encode(hasher.finalize());

        // locate (or create) the cache slot for this (catalog, filter) pair
        let filter_digest = find_filter_digest(op, &catalog_digest, &filtered_catalogs_dir)?;
        let slot = Path::new(&filtered_catalogs_dir).join(&filter_digest);
        if !slot.join("digest").exists() {
            fs::create_dir_all(&slot)?;
            fs::write(slot.join("digest"), &result_digest)?;
            fs::write(slot.join("filtered-catalog.json"), &contents)?;
            log.hi(&format!("cached filtered catalog {}", filter_digest));
        } else {
            log.hi(&format!("filtered catalog cache hit {}", filter_digest));
        }

        let total_images: usize = related_images.values().map(|images| images.len()).sum();
        log.mid(&format!(
            "catalog {} : {} bundles, {} related images",
            op.catalog,
            related_images.len(),
            total_images
        ));
        log.lo(&format!("filter digest {}", filter_digest));
    }
    Ok(())
}

// main entry point
fn main() {
    let args = Cli::parse();

    let lvl = match args.loglevel.as_str() {
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };
    let log = &Logging { log_level: lvl };

    log.info(&format!("rust-catalog-filter {} ", args.config));

    if let Err(err) = run(log, &args) {
        log.error(&format!("{}", err));
        process::exit(1);
    }
}
