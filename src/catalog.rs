// Catalog cache: the account listing is fetched at most once per run.
// Only a successful snapshot is kept; a failed fetch is retried on the
// next call.

use crate::api::{Params, Transport};
use crate::config::Credentials;
use crate::error::Result;
use crate::model::Catalog;

pub const LIST_FILES_PATH: &str = "files/list.json";

pub struct CatalogCache<'a> {
    transport: &'a dyn Transport,
    credentials: &'a Credentials,
    snapshot: Option<Catalog>,
}

impl<'a> CatalogCache<'a> {
    pub fn new(transport: &'a dyn Transport, credentials: &'a Credentials) -> Self {
        CatalogCache {
            transport,
            credentials,
            snapshot: None,
        }
    }

    /// Returns the snapshot, fetching it on first use.
    pub fn get(&mut self) -> Result<&Catalog> {
        let catalog = match self.snapshot.take() {
            Some(catalog) => catalog,
            None => self.fetch()?,
        };
        Ok(self.snapshot.insert(catalog))
    }

    fn fetch(&self) -> Result<Catalog> {
        let raw = self
            .transport
            .post(LIST_FILES_PATH, &Params::new(), self.credentials)?
            .into_result()?;
        let catalog: Catalog = raw.decode()?;
        tracing::info!(crates = catalog.crates.len(), "fetched catalog");
        Ok(catalog)
    }

    /// True once a snapshot has been fetched.
    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The snapshot if it has already been fetched. Never triggers a fetch.
    pub fn peek(&self) -> Option<&Catalog> {
        self.snapshot.as_ref()
    }
}
