// Name to identifier resolution.
//
// Arguments that already look like ids are passed straight through. When
// any argument is a name the whole batch is looked up against the catalog
// and the result is checked against the run's cardinality policy.

use crate::catalog::CatalogCache;
use crate::error::{Error, Result};
use crate::model::{all_identifiers, is_identifier, Catalog, Identifier, Resource, ResourceKind};
use regex::{Regex, RegexBuilder};

/// How names are matched and how many matches are acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionPolicy {
    /// Names are literal substrings; one match per argument.
    #[default]
    Exact,
    /// Names are regular expressions; every match is taken.
    Wildcard,
}

/// Case-insensitive matcher for one query term.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    pub fn new(query: &str, policy: ResolutionPolicy) -> Result<Self> {
        let pattern = match policy {
            ResolutionPolicy::Exact => regex::escape(query),
            ResolutionPolicy::Wildcard => query.to_string(),
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| Error::InvalidPattern {
                pattern: query.to_string(),
                source,
            })?;
        Ok(Matcher { regex })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Every resource of `kind` whose name matches `query`, in catalog order.
pub fn search(
    catalog: &Catalog,
    query: &str,
    kind: ResourceKind,
    policy: ResolutionPolicy,
) -> Result<Vec<Resource>> {
    let matcher = Matcher::new(query, policy)?;
    let found = match kind {
        ResourceKind::Crate => catalog
            .crates
            .iter()
            .filter(|c| matcher.is_match(&c.name))
            .cloned()
            .map(Resource::Crate)
            .collect(),
        ResourceKind::File => catalog
            .files()
            .filter(|f| matcher.is_match(&f.name))
            .cloned()
            .map(Resource::File)
            .collect(),
    };
    Ok(found)
}

/// One resolved id and the argument it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub id: Identifier,
    /// Name, pattern or id as the user typed it.
    pub source: String,
}

impl Resolved {
    fn new(id: Identifier, source: &str) -> Self {
        Resolved {
            id,
            source: source.to_string(),
        }
    }
}

/// Ids matched by each name, concatenated and paired with the name that
/// produced them. Identifiers in the list are skipped and contribute
/// nothing. Also returns the last name looked up.
fn collect<'n, S: AsRef<str>>(
    catalog: &Catalog,
    names: &'n [S],
    kind: ResourceKind,
    policy: ResolutionPolicy,
) -> Result<(Vec<Resolved>, Option<&'n str>)> {
    let mut found = Vec::new();
    let mut last = None;
    for name in names {
        let name: &'n str = name.as_ref();
        if is_identifier(name) {
            continue;
        }
        last = Some(name);
        for resource in search(catalog, name, kind, policy)? {
            // Ids from the service that are not five digits cannot be sent
            // back; report them like any other bad id.
            found.push(Resolved::new(Identifier::parse(kind, resource.id())?, name));
        }
        tracing::debug!(%kind, query = name, total = found.len(), "looked up name");
    }
    Ok((found, last))
}

/// Resolve `names` against an already fetched catalog.
pub fn resolve_in<S: AsRef<str>>(
    catalog: &Catalog,
    names: &[S],
    kind: ResourceKind,
    policy: ResolutionPolicy,
) -> Result<Vec<Resolved>> {
    if all_identifiers(names) {
        return names
            .iter()
            .map(|n| Identifier::parse(kind, n.as_ref()).map(|id| Resolved::new(id, n.as_ref())))
            .collect();
    }

    let (found, last) = collect(catalog, names, kind, policy)?;
    if policy == ResolutionPolicy::Wildcard {
        return Ok(found);
    }

    let query = last.unwrap_or_default().to_string();
    if found.len() == names.len() {
        Ok(found)
    } else if found.is_empty() {
        Err(Error::NotFound { kind, query })
    } else if found.len() > names.len() {
        Err(Error::Ambiguous { kind, query })
    } else {
        Err(Error::CountMismatch {
            kind,
            expected: names.len(),
            found: found.len(),
        })
    }
}

/// Resolve a single name to exactly one id, whatever the policy.
pub fn resolve_one_in(
    catalog: &Catalog,
    name: &str,
    kind: ResourceKind,
    policy: ResolutionPolicy,
) -> Result<Identifier> {
    if is_identifier(name) {
        return Identifier::parse(kind, name);
    }
    let (mut found, _) = collect(catalog, &[name], kind, policy)?;
    match found.len() {
        0 => Err(Error::NotFound {
            kind,
            query: name.to_string(),
        }),
        1 => Ok(found.remove(0).id),
        _ => Err(Error::Ambiguous {
            kind,
            query: name.to_string(),
        }),
    }
}

/// Like [`resolve_in`], fetching the catalog only when a lookup is needed.
pub fn resolve<S: AsRef<str>>(
    cache: &mut CatalogCache<'_>,
    names: &[S],
    kind: ResourceKind,
    policy: ResolutionPolicy,
) -> Result<Vec<Resolved>> {
    if all_identifiers(names) {
        return resolve_in(&Catalog::default(), names, kind, policy);
    }
    resolve_in(cache.get()?, names, kind, policy)
}

/// Like [`resolve_one_in`], fetching the catalog only when a lookup is needed.
pub fn resolve_one(
    cache: &mut CatalogCache<'_>,
    name: &str,
    kind: ResourceKind,
    policy: ResolutionPolicy,
) -> Result<Identifier> {
    if is_identifier(name) {
        return Identifier::parse(kind, name);
    }
    resolve_one_in(cache.get()?, name, kind, policy)
}
