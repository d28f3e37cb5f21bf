// module collector

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::api::schema::*;
use crate::catalog::index::*;
use crate::error::handler::*;
use crate::filter::bundles::*;
use crate::filter::validate::*;
use crate::log::logging::*;

/// resolution result, bundle name to its related image records
pub type RelatedImagesMap = BTreeMap<String, Vec<CollectedImage>>;

// filter_related_images_from_catalog - resolves one catalog filter against
// the catalog indices, with no package filter every package resolves with
// default (heads only) semantics
pub fn filter_related_images_from_catalog(
    log: &Logging,
    catalog: &OperatorCatalog,
    operator: &Operator,
) -> Result<RelatedImagesMap, MirrorError> {
    let mut related_images = RelatedImagesMap::new();

    let packages = operator.packages.clone().unwrap_or_default();
    if packages.is_empty() {
        for operator_name in catalog.packages.keys() {
            let ri = get_related_images(
                log,
                operator_name,
                catalog,
                &IncludePackage::default(),
                operator.full,
            )?;
            related_images.extend(ri);
        }
    } else {
        for pkg in packages.iter() {
            if !catalog.bundles_by_pkg_and_name.contains_key(&pkg.name) {
                log.warn(&format!(
                    "package {} not found in catalog {}",
                    pkg.name, operator.catalog
                ));
                continue;
            }
            let full = operator.full || pkg.full.unwrap_or(false);
            let ri = get_related_images(log, &pkg.name, catalog, pkg, full)?;
            related_images.extend(ri);
        }
    }

    for bundle in related_images.keys() {
        log.debug(&format!("bundle after filtering {}", bundle));
    }

    Ok(related_images)
}

// get_related_images - resolves a single package, the filter mode has been
// validated up front so exactly one selection strategy applies
fn get_related_images(
    log: &Logging,
    operator_name: &str,
    catalog: &OperatorCatalog,
    pkg: &IncludePackage,
    full: bool,
) -> Result<RelatedImagesMap, MirrorError> {
    let mode = filter_mode_for_package(pkg, full)?;

    let mut related_images = RelatedImagesMap::new();
    let mut filtered_bundles: Vec<String> = Vec::new();
    let empty_entries: HashMap<String, ChannelEntry> = HashMap::new();
    let empty_bundles: HashMap<String, CatalogBundle> = HashMap::new();

    let default_channel = catalog
        .packages
        .get(operator_name)
        .map(|p| p.default_channel.clone())
        .unwrap_or_default();

    let bundles = catalog
        .bundles_by_pkg_and_name
        .get(operator_name)
        .unwrap_or(&empty_bundles);

    let channels_selected = matches!(mode, FilterMode::Channels(_));

    match mode {
        FilterMode::SelectedBundles(names) => {
            for name in names.iter() {
                match bundles.get(name) {
                    Some(bundle) => {
                        related_images
                            .insert(bundle.name.clone(), handle_related_images(log, bundle));
                    }
                    None => {
                        log.warn(&format!(
                            "bundle {} of operator {} not found in catalog: SKIPPING",
                            name, operator_name
                        ));
                    }
                }
            }
        }
        FilterMode::Channels(channels) => {
            for channel in channels.iter() {
                log.debug(&format!("found channel {}", channel.name));
                let entries = catalog
                    .channel_entries
                    .get(operator_name)
                    .and_then(|chans| chans.get(&channel.name))
                    .unwrap_or(&empty_entries);
                let bundles = filter_bundles(
                    entries,
                    operator_name,
                    &channel.name,
                    &channel.min_version,
                    &channel.max_version,
                    full,
                )?;
                log.debug(&format!("adding bundles {:?}", bundles));
                filtered_bundles.extend(bundles);
            }
        }
        FilterMode::DefaultChannel {
            min_version,
            max_version,
        } => {
            let entries = catalog
                .channel_entries
                .get(operator_name)
                .and_then(|chans| chans.get(&default_channel))
                .unwrap_or(&empty_entries);
            let bundles = filter_bundles(
                entries,
                operator_name,
                &default_channel,
                &min_version,
                &max_version,
                full,
            )?;
            log.debug(&format!("adding bundles {:?}", bundles));
            filtered_bundles.extend(bundles);
        }
    }

    for bundle in bundles.values() {
        let include = if full {
            if !filtered_bundles.is_empty() && channels_selected {
                filtered_bundles.contains(&bundle.name)
            } else {
                true
            }
        } else {
            filtered_bundles.contains(&bundle.name)
        };
        if include {
            related_images.insert(bundle.name.clone(), handle_related_images(log, bundle));
        }
    }

    Ok(related_images)
}

// handle_related_images - tags each of the bundle's declared related images,
// the record whose image equals the bundle's own image is the bundle image
fn handle_related_images(log: &Logging, bundle: &CatalogBundle) -> Vec<CollectedImage> {
    let mut related_images = Vec::new();
    for ri in bundle.related_images.iter() {
        if ri.image.contains("oci://") {
            log.warn(&format!(
                "{} 'oci' is not supported in operator catalogs : SKIPPING",
                ri.image
            ));
            continue;
        }
        let image_type = if ri.image == bundle.image {
            ImageType::OperatorBundle
        } else {
            ImageType::OperatorRelatedImage
        };
        related_images.push(CollectedImage {
            name: ri.name.clone(),
            image: ri.image.clone(),
            image_type,
        });
    }
    related_images
}

#[cfg(test)]
mod tests {
    // this brings everything from parent's scope into this scope
    use super::*;

    fn load_test_catalog() -> OperatorCatalog {
        let log = &Logging {
            log_level: Level::INFO,
        };
        get_catalog(log, String::from("test-artifacts/configs")).unwrap()
    }

    fn operator(packages: Option<Vec<IncludePackage>>, full: bool) -> Operator {
        Operator {
            catalog: String::from("registry.redhat.io/redhat/redhat-operator-index:v4.14"),
            full,
            packages,
            ..Default::default()
        }
    }

    fn bundle_names(result: &RelatedImagesMap) -> Vec<String> {
        result.keys().cloned().collect()
    }

    #[test]
    fn filter_no_packages_heads_only_pass() {
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let res =
            filter_related_images_from_catalog(log, &catalog, &operator(None, false)).unwrap();
        assert_eq!(
            bundle_names(&res),
            vec![
                String::from("3scale-operator.v0.11.0-mas"),
                String::from("devworkspace-operator.v0.19.1-0.1682321189.p"),
                String::from("jaeger-operator.v1.51.0-1"),
            ]
        );
    }

    #[test]
    fn filter_full_catalog_pass() {
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let res = filter_related_images_from_catalog(log, &catalog, &operator(None, true)).unwrap();
        let total: usize = catalog
            .bundles_by_pkg_and_name
            .values()
            .map(|bundles| bundles.len())
            .sum();
        assert_eq!(res.len(), total);
        assert_eq!(res.len(), 38);
    }

    #[test]
    fn filter_packages_heads_only_pass() {
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let packages = vec![
            IncludePackage {
                name: String::from("3scale-operator"),
                ..Default::default()
            },
            IncludePackage {
                name: String::from("devworkspace-operator"),
                ..Default::default()
            },
            IncludePackage {
                name: String::from("jaeger-product"),
                ..Default::default()
            },
        ];
        let res =
            filter_related_images_from_catalog(log, &catalog, &operator(Some(packages), false))
                .unwrap();
        assert_eq!(
            bundle_names(&res),
            vec![
                String::from("3scale-operator.v0.11.0-mas"),
                String::from("devworkspace-operator.v0.19.1-0.1682321189.p"),
                String::from("jaeger-operator.v1.51.0-1"),
            ]
        );
    }

    #[test]
    fn filter_channel_range_pass() {
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let packages = vec![IncludePackage {
            name: String::from("3scale-operator"),
            channels: Some(vec![IncludeChannel {
                name: String::from("threescale-2.11"),
                min_version: Some(String::from("0.8.1")),
                max_version: Some(String::from("0.8.3")),
            }]),
            ..Default::default()
        }];
        let res =
            filter_related_images_from_catalog(log, &catalog, &operator(Some(packages), false))
                .unwrap();
        assert_eq!(
            bundle_names(&res),
            vec![
                String::from("3scale-operator.v0.8.1"),
                String::from("3scale-operator.v0.8.2"),
                String::from("3scale-operator.v0.8.3"),
                String::from("3scale-operator.v0.8.3-0.1645735250.p"),
                String::from("3scale-operator.v0.8.3-0.1646619125.p"),
                String::from("3scale-operator.v0.8.3-0.1646742992.p"),
                String::from("3scale-operator.v0.8.3-0.1649688682.p"),
            ]
        );
    }

    #[test]
    fn filter_multiple_channels_heads_pass() {
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let packages = vec![IncludePackage {
            name: String::from("3scale-operator"),
            channels: Some(vec![
                IncludeChannel {
                    name: String::from("threescale-2.11"),
                    min_version: None,
                    max_version: None,
                },
                IncludeChannel {
                    name: String::from("threescale-mas"),
                    min_version: None,
                    max_version: None,
                },
            ]),
            ..Default::default()
        }];
        let res =
            filter_related_images_from_catalog(log, &catalog, &operator(Some(packages), false))
                .unwrap();
        assert_eq!(
            bundle_names(&res),
            vec![
                String::from("3scale-operator.v0.11.0-mas"),
                String::from("3scale-operator.v0.8.4-0.1655690146.p"),
            ]
        );
    }

    #[test]
    fn filter_full_with_channel_pass() {
        // full with a channel list restricts to the channel's bundles
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let packages = vec![IncludePackage {
            name: String::from("3scale-operator"),
            channels: Some(vec![IncludeChannel {
                name: String::from("threescale-2.11"),
                min_version: None,
                max_version: None,
            }]),
            ..Default::default()
        }];
        let res =
            filter_related_images_from_catalog(log, &catalog, &operator(Some(packages), true))
                .unwrap();
        assert_eq!(res.len(), 11);
        assert!(!res.contains_key("3scale-operator.v0.11.0-mas"));
    }

    #[test]
    fn filter_package_full_flag_pass() {
        // package level full includes every bundle of that package only
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let packages = vec![IncludePackage {
            name: String::from("jaeger-product"),
            full: Some(true),
            ..Default::default()
        }];
        let res =
            filter_related_images_from_catalog(log, &catalog, &operator(Some(packages), false))
                .unwrap();
        assert_eq!(res.len(), 6);
    }

    #[test]
    fn filter_selected_bundles_pass() {
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let packages = vec![IncludePackage {
            name: String::from("3scale-operator"),
            selected_bundles: Some(vec![
                SelectedBundle {
                    name: String::from("3scale-operator.v0.8.2"),
                },
                SelectedBundle {
                    name: String::from("3scale-operator.v9.9.9"),
                },
            ]),
            ..Default::default()
        }];
        let res =
            filter_related_images_from_catalog(log, &catalog, &operator(Some(packages), false))
                .unwrap();
        // the missing bundle is skipped with a warning, not an error
        assert_eq!(
            bundle_names(&res),
            vec![String::from("3scale-operator.v0.8.2")]
        );
    }

    #[test]
    fn filter_package_not_found_pass() {
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let packages = vec![
            IncludePackage {
                name: String::from("chocolate-factory-operator"),
                ..Default::default()
            },
            IncludePackage {
                name: String::from("jaeger-product"),
                ..Default::default()
            },
        ];
        let res =
            filter_related_images_from_catalog(log, &catalog, &operator(Some(packages), false))
                .unwrap();
        assert_eq!(
            bundle_names(&res),
            vec![String::from("jaeger-operator.v1.51.0-1")]
        );
    }

    #[test]
    fn filter_mixed_modes_fail() {
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let packages = vec![IncludePackage {
            name: String::from("3scale-operator"),
            min_version: Some(String::from("0.8.0")),
            max_version: Some(String::from("0.8.1")),
            channels: Some(vec![IncludeChannel {
                name: String::from("threescale-2.11"),
                min_version: None,
                max_version: None,
            }]),
            ..Default::default()
        }];
        let res =
            filter_related_images_from_catalog(log, &catalog, &operator(Some(packages), false));
        assert_eq!(
            res.unwrap_err(),
            MirrorError::new("cannot use channels/full and min/max versions at the same time")
        );
    }

    #[test]
    fn filter_image_type_tagging_pass() {
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let packages = vec![IncludePackage {
            name: String::from("jaeger-product"),
            ..Default::default()
        }];
        let res =
            filter_related_images_from_catalog(log, &catalog, &operator(Some(packages), false))
                .unwrap();
        let images = res.get("jaeger-operator.v1.51.0-1").unwrap();
        let bundle = catalog
            .bundles_by_pkg_and_name
            .get("jaeger-product")
            .unwrap()
            .get("jaeger-operator.v1.51.0-1")
            .unwrap();
        for image in images.iter() {
            if image.image == bundle.image {
                assert_eq!(image.image_type, ImageType::OperatorBundle);
            } else {
                assert_eq!(image.image_type, ImageType::OperatorRelatedImage);
            }
        }
        assert!(images
            .iter()
            .any(|img| img.image_type == ImageType::OperatorBundle));
        assert!(images
            .iter()
            .any(|img| img.image_type == ImageType::OperatorRelatedImage));
    }

    #[test]
    fn handle_related_images_skips_oci_references_pass() {
        let log = &Logging {
            log_level: Level::INFO,
        };
        let bundle = CatalogBundle {
            name: String::from("some-operator.v1.0.0"),
            package: String::from("some-operator"),
            image: String::from("registry.redhat.io/some/some-operator-bundle@sha256:1a2b"),
            related_images: vec![
                RelatedImage {
                    name: String::from(""),
                    image: String::from("registry.redhat.io/some/some-operator-bundle@sha256:1a2b"),
                },
                RelatedImage {
                    name: String::from("some-operator-cache"),
                    image: String::from("oci://local/path/some-operator-cache"),
                },
                RelatedImage {
                    name: String::from("some-rhel8-operator"),
                    image: String::from("registry.redhat.io/some/some-rhel8-operator@sha256:3c4d"),
                },
            ],
        };
        let images = handle_related_images(log, &bundle);
        assert_eq!(images.len(), 2);
        assert!(!images.iter().any(|img| img.image.contains("oci://")));
        assert!(images
            .iter()
            .any(|img| img.image_type == ImageType::OperatorBundle));
        assert!(images
            .iter()
            .any(|img| img.image_type == ImageType::OperatorRelatedImage));
    }

    #[test]
    fn filter_idempotence_pass() {
        let log = &Logging {
            log_level: Level::INFO,
        };
        let catalog = load_test_catalog();
        let op = operator(None, false);
        let first = filter_related_images_from_catalog(log, &catalog, &op).unwrap();
        let second = filter_related_images_from_catalog(log, &catalog, &op).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
