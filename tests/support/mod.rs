#![allow(dead_code)]

// Shared fixtures: a scripted transport that records every call and a
// helper that runs the whole pipeline from command-line words.

use clap::Parser;
use letscrate::catalog::LIST_FILES_PATH;
use letscrate::cli::Cli;
use letscrate::config::Credentials;
use letscrate::ui::{Layout, Recorder};
use letscrate::{Error, Params, RawResponse, Result, Summary, Transport};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;

/// Transport answering from a table of canned bodies keyed by path.
/// Unknown paths get an empty success body.
#[derive(Default)]
pub struct StubTransport {
    bodies: HashMap<String, Value>,
    statuses: HashMap<String, u16>,
    calls: RefCell<Vec<(String, Params)>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(self, catalog: Value) -> Self {
        self.respond(LIST_FILES_PATH, catalog)
    }

    pub fn respond(mut self, path: &str, body: Value) -> Self {
        self.bodies.insert(path.to_string(), body);
        self
    }

    /// Make `path` fail at the HTTP level with `status`.
    pub fn fail(mut self, path: &str, status: u16) -> Self {
        self.statuses.insert(path.to_string(), status);
        self
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn params(&self, index: usize) -> Params {
        self.calls.borrow()[index].1.clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.calls.borrow().iter().filter(|(p, _)| p == path).count()
    }

    pub fn total(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for StubTransport {
    fn post(&self, path: &str, params: &Params, credentials: &Credentials) -> Result<RawResponse> {
        assert!(!credentials.username().is_empty());
        self.calls
            .borrow_mut()
            .push((path.to_string(), params.clone()));
        if let Some(status) = self.statuses.get(path) {
            return Err(Error::Status {
                status: *status,
                body: "upstream unavailable".into(),
            });
        }
        Ok(match self.bodies.get(path) {
            Some(body) => RawResponse::new(body.clone()),
            None => RawResponse::empty(),
        })
    }
}

/// Catalog used across tests:
/// Photos(00010){beach.jpg 00101, sunset.jpg 00102}, Photos Backup(00020){notes.txt 00201},
/// Archive2021(00042){}.
pub fn sample_catalog() -> Value {
    json!({
        "status": "success",
        "crates": [
            { "id": "00010", "name": "Photos", "short_code": "ph10",
              "files": [
                  { "id": "00101", "name": "beach.jpg", "short_code": "bj01" },
                  { "id": "00102", "name": "sunset.jpg", "short_code": "sj02" }
              ] },
            { "id": "00020", "name": "Photos Backup", "short_code": "pb20",
              "files": [ { "id": "00201", "name": "notes.txt", "short_code": "nt01" } ] },
            { "id": "00042", "name": "Archive2021", "short_code": "ar42", "files": null }
        ]
    })
}

/// Parse `words` as command-line flags and run them against `transport`.
/// `Ok(None)` means no action was selected.
pub fn run_cli(words: &[&str], transport: &StubTransport, sink: &mut Recorder) -> Result<Option<Summary>> {
    let cli = Cli::try_parse_from(std::iter::once("letscrate").chain(words.iter().copied()))
        .expect("flags should parse");
    let Some(options) = cli.into_options(None)? else {
        return Ok(None);
    };
    letscrate::run(&options, transport, &Layout::plain(), sink).map(Some)
}
