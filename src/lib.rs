// Library root
// -----------
// This crate exposes the engine behind the `letscrate` binary so that it
// can be driven (and tested) without a terminal or a network.
//
// Module responsibilities:
// - `api`: the `Transport` seam and the reqwest client behind it.
// - `model`: identifiers, crates, files and the catalog snapshot.
// - `catalog`: fetch-once cache of the catalog.
// - `resolver`: names and patterns to identifiers.
// - `actions`: the action registry (remote call + formatter per action).
// - `dispatch`: the per-run control flow.
// - `format`: response formatters.
// - `ui`: sinks, terminal layout and line rendering.
// - `cli` / `config`: flags and the typed run options.
pub mod actions;
pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod model;
pub mod resolver;
pub mod ui;

pub use actions::Action;
pub use api::{ApiClient, Params, RawResponse, Transport};
pub use config::{Credentials, Options};
pub use dispatch::{run, Summary};
pub use error::{Error, Result};
pub use resolver::ResolutionPolicy;
