// Data model for the remote catalog.
//
// Shapes mirror the JSON returned by `files/list.json`: a list of crates,
// each optionally carrying its files. The service is not consistent about
// ids (sometimes strings, sometimes numbers) so they are read leniently.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Returns true when `s` is exactly five ASCII digits.
pub fn is_identifier(s: &str) -> bool {
    s.len() == 5 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Returns true when every entry of `args` is an identifier.
pub fn all_identifiers<S: AsRef<str>>(args: &[S]) -> bool {
    args.iter().all(|a| is_identifier(a.as_ref()))
}

/// A five digit resource id as the service expects it in URLs and fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(kind: ResourceKind, value: &str) -> Result<Self> {
        if is_identifier(value) {
            Ok(Identifier(value.to_string()))
        } else {
            Err(Error::InvalidIdentifierFormat {
                kind,
                value: value.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which top-level collection a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Crate,
    File,
}

impl ResourceKind {
    /// Flag that lists resources of this kind with their ids.
    pub fn listing_flag(&self) -> &'static str {
        match self {
            ResourceKind::Crate => "-A",
            ResourceKind::File => "-a",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Crate => f.write_str("crate"),
            ResourceKind::File => f.write_str("file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct File {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_code: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Crate {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_code: String,
    /// `null`, missing and `[]` all mean the crate is empty.
    #[serde(default, deserialize_with = "nullable_files")]
    pub files: Vec<File>,
}

/// Either kind of resource, as returned by a search.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Crate(Crate),
    File(File),
}

impl Resource {
    pub fn id(&self) -> &str {
        match self {
            Resource::Crate(c) => &c.id,
            Resource::File(f) => &f.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Resource::Crate(c) => &c.name,
            Resource::File(f) => &f.name,
        }
    }

    pub fn short_code(&self) -> &str {
        match self {
            Resource::Crate(c) => &c.short_code,
            Resource::File(f) => &f.short_code,
        }
    }
}

/// Full snapshot of the account: every crate with its files.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Catalog {
    #[serde(default)]
    pub crates: Vec<Crate>,
}

impl Catalog {
    /// All files across all crates, in catalog order.
    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.crates.iter().flat_map(|c| c.files.iter())
    }

    /// Display name of the resource with the given id, if present.
    pub fn name_of(&self, kind: ResourceKind, id: &str) -> Option<&str> {
        match kind {
            ResourceKind::Crate => self
                .crates
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.as_str()),
            ResourceKind::File => self.files().find(|f| f.id == id).map(|f| f.name.as_str()),
        }
    }
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => format!("{:05}", n),
    })
}

fn nullable_files<'de, D>(deserializer: D) -> std::result::Result<Vec<File>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<File>>::deserialize(deserializer)?.unwrap_or_default())
}
