pub mod bundles;
pub mod validate;
