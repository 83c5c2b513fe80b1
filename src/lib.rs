// Library root
// -----------
// Uploads a local image tree to cloud storage, publishes every file and
// records the public links in a JSON mapping so an interrupted run can
// resume. The binary (`main.rs`) only parses options and wires these
// modules together.
//
// Module responsibilities:
// - `normalize`: storage-safe names for folders and files, remote paths.
// - `retry`: attempt budget + constant delay shared by all remote calls.
// - `api`: the storage HTTP API behind the `DiskApi` trait.
// - `folders` / `upload`: folder chain creation and the per-file
//   upload/publish/link exchange.
// - `store`: the persisted filename -> public link mapping.
// - `walker`: tree traversal and sequencing of everything above.
// - `ui`: continue/abort prompt and progress bar.
// - `config`: command-line options.
pub mod api;
pub mod config;
pub mod error;
pub mod folders;
pub mod normalize;
pub mod retry;
pub mod store;
pub mod ui;
pub mod upload;
pub mod walker;

pub use error::{Error, Result};
