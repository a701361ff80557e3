// Library root
// -----------
// The binary (`main.rs`) parses arguments and hands them to `cli::run`.
//
// Module responsibilities:
// - `config`: reads `~/.s3share` (bucket name, optional keys, endpoint).
// - `storage`: blocking wrapper over the `rust-s3` bucket handle, bucket
//   addressing and public URLs.
// - `store`: the `ObjectStore` seam and transfer progress reporting.
// - `share`: input validation, collision check and the two uploads.
// - `page`: landing page HTML and its random key.
// - `ui`: the terminal progress bar.
// - `error`: failure taxonomy and exit codes.
pub mod cli;
pub mod config;
pub mod error;
pub mod page;
pub mod storage;
pub mod share;
pub mod store;
pub mod ui;

pub use error::{Result, ShareError};
