pub mod filter_digest;
