//! Configuration parsing for the build
//!
//! The only configuration surface is an optional `assetpipe.yml` at the project
//! root; every field falls back to the layout of a bower-vendored bootstrap and an
//! Elm source under `src/`.

pub mod build;

pub use build::{BuildConfig, CompilerConfig, CONFIG_FILE_NAME};
