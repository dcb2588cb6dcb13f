// Action registry.
//
// Each selectable command maps to one entry holding the remote call, the
// response formatter and a description of what its positional arguments
// mean. The dispatcher looks the entry up once and then only calls through
// the two function values.

use crate::api::{Params, RawResponse, Transport};
use crate::catalog::{CatalogCache, LIST_FILES_PATH};
use crate::config::Credentials;
use crate::dispatch::ActionContext;
use crate::error::{Error, Result};
use crate::format;
use crate::model::{Identifier, Resource, ResourceKind};
use crate::resolver::{self, ResolutionPolicy};
use crate::ui::Printer;

/// Every command the client can run. Discriminants index [`REGISTRY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TestCredentials = 0,
    UploadFile = 1,
    DeleteFile = 2,
    ListFiles = 3,
    ShowFile = 4,
    SearchFiles = 5,
    CreateCrate = 6,
    ListCrates = 7,
    SearchCrates = 8,
    RenameCrate = 9,
    DeleteCrate = 10,
}

impl Action {
    pub fn spec(self) -> &'static ActionSpec {
        &REGISTRY[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Actions that act on one crate named by a flag value rather than by
    /// the positional arguments.
    pub fn takes_crate_target(self) -> bool {
        matches!(self, Action::UploadFile | Action::RenameCrate)
    }

    /// Actions whose success response does not echo the resource's name.
    pub fn is_destructive(self) -> bool {
        matches!(self, Action::DeleteFile | Action::DeleteCrate)
    }
}

/// What the positional arguments denote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requires {
    None,
    CrateNames,
    FileIdentifiers,
}

impl Requires {
    /// Resource kind to resolve arguments against, if any.
    pub fn kind(self) -> Option<ResourceKind> {
        match self {
            Requires::None => None,
            Requires::CrateNames => Some(ResourceKind::Crate),
            Requires::FileIdentifiers => Some(ResourceKind::File),
        }
    }
}

/// How many positional arguments an action consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Invoked once; arguments are ignored.
    None,
    /// Invoked once per argument, or once without when there are none.
    Optional,
    /// Invoked once per argument; at least one is needed.
    Required,
}

/// Result of one invocation, before formatting.
#[derive(Debug, Clone)]
pub enum Response {
    /// Envelope straight from the service.
    Raw(RawResponse),
    /// Local search over the catalog.
    Matches {
        kind: ResourceKind,
        query: String,
        found: Vec<Resource>,
    },
}

/// State shared by the remote-call half of every action for one run.
pub struct Session<'a> {
    transport: &'a dyn Transport,
    credentials: &'a Credentials,
    pub catalog: CatalogCache<'a>,
    /// Crate chosen by `--upload` / `--renamecrate`, already resolved.
    pub crate_id: Option<Identifier>,
}

impl<'a> Session<'a> {
    pub fn new(transport: &'a dyn Transport, credentials: &'a Credentials) -> Self {
        Session {
            transport,
            credentials,
            catalog: CatalogCache::new(transport, credentials),
            crate_id: None,
        }
    }

    fn post(&self, path: &str, params: Params) -> Result<Response> {
        let raw = self.transport.post(path, &params, self.credentials)?;
        Ok(Response::Raw(raw))
    }

    // Search terms are always regular expressions; `--regexp` only changes
    // how bulk arguments are resolved.
    fn search(&mut self, query: &str, kind: ResourceKind) -> Result<Response> {
        let found = resolver::search(self.catalog.get()?, query, kind, ResolutionPolicy::Wildcard)?;
        tracing::debug!(%kind, query, matches = found.len(), "search");
        Ok(Response::Matches {
            kind,
            query: query.to_string(),
            found,
        })
    }

    fn target(&self, action: Action) -> Result<&Identifier> {
        self.crate_id
            .as_ref()
            .ok_or(Error::MissingCrateTarget(action.name()))
    }
}

pub type InvokeFn = fn(&mut Session<'_>, Option<&str>) -> Result<Response>;
pub type FormatFn = fn(&Response, &mut ActionContext, &mut Printer<'_>) -> Result<()>;

/// One row of the registry.
pub struct ActionSpec {
    pub action: Action,
    pub name: &'static str,
    pub requires: Requires,
    pub arity: Arity,
    pub invoke: InvokeFn,
    pub format: FormatFn,
}

pub static REGISTRY: [ActionSpec; 11] = [
    ActionSpec {
        action: Action::TestCredentials,
        name: "test",
        requires: Requires::None,
        arity: Arity::None,
        invoke: test_credentials,
        format: format::test_credentials,
    },
    ActionSpec {
        action: Action::UploadFile,
        name: "upload",
        requires: Requires::None,
        arity: Arity::Required,
        invoke: upload_file,
        format: format::upload_file,
    },
    ActionSpec {
        action: Action::DeleteFile,
        name: "delete",
        requires: Requires::FileIdentifiers,
        arity: Arity::Required,
        invoke: delete_file,
        format: format::deleted,
    },
    ActionSpec {
        action: Action::ListFiles,
        name: "list",
        requires: Requires::None,
        arity: Arity::None,
        invoke: list_files,
        format: format::list_files,
    },
    ActionSpec {
        action: Action::ShowFile,
        name: "id",
        requires: Requires::None,
        arity: Arity::Required,
        invoke: show_file,
        format: format::show_file,
    },
    ActionSpec {
        action: Action::SearchFiles,
        name: "search",
        requires: Requires::None,
        arity: Arity::Required,
        invoke: search_files,
        format: format::search,
    },
    ActionSpec {
        action: Action::CreateCrate,
        name: "newcrate",
        requires: Requires::None,
        arity: Arity::Required,
        invoke: create_crate,
        format: format::create_crate,
    },
    ActionSpec {
        action: Action::ListCrates,
        name: "listcrates",
        requires: Requires::None,
        arity: Arity::Optional,
        invoke: list_crates,
        format: format::list_crates,
    },
    ActionSpec {
        action: Action::SearchCrates,
        name: "searchcrates",
        requires: Requires::None,
        arity: Arity::Required,
        invoke: search_crates,
        format: format::search,
    },
    ActionSpec {
        action: Action::RenameCrate,
        name: "renamecrate",
        requires: Requires::None,
        arity: Arity::Required,
        invoke: rename_crate,
        format: format::rename_crate,
    },
    ActionSpec {
        action: Action::DeleteCrate,
        name: "deletecrate",
        requires: Requires::CrateNames,
        arity: Arity::Required,
        invoke: delete_crate,
        format: format::deleted,
    },
];

fn required(arg: Option<&str>, action: Action) -> Result<&str> {
    arg.ok_or(Error::MissingArguments(action.name()))
}

fn test_credentials(session: &mut Session<'_>, _: Option<&str>) -> Result<Response> {
    session.post("users/authenticate.json", Params::new())
}

fn upload_file(session: &mut Session<'_>, arg: Option<&str>) -> Result<Response> {
    let path = required(arg, Action::UploadFile)?;
    let crate_id = session.target(Action::UploadFile)?;
    let params = Params::new().field("crate_id", crate_id.as_str()).file(path);
    session.post("files/upload.json", params)
}

fn delete_file(session: &mut Session<'_>, arg: Option<&str>) -> Result<Response> {
    let id = Identifier::parse(ResourceKind::File, required(arg, Action::DeleteFile)?)?;
    session.post(&format!("files/destroy/{}.json", id), Params::new())
}

fn list_files(session: &mut Session<'_>, _: Option<&str>) -> Result<Response> {
    session.post(LIST_FILES_PATH, Params::new())
}

fn show_file(session: &mut Session<'_>, arg: Option<&str>) -> Result<Response> {
    let id = Identifier::parse(ResourceKind::File, required(arg, Action::ShowFile)?)?;
    session.post(&format!("files/show/{}.json", id), Params::new())
}

fn search_files(session: &mut Session<'_>, arg: Option<&str>) -> Result<Response> {
    session.search(required(arg, Action::SearchFiles)?, ResourceKind::File)
}

fn create_crate(session: &mut Session<'_>, arg: Option<&str>) -> Result<Response> {
    let name = required(arg, Action::CreateCrate)?;
    session.post("crates/add.json", Params::new().field("name", name))
}

// With a name this is a crate search.
fn list_crates(session: &mut Session<'_>, arg: Option<&str>) -> Result<Response> {
    match arg {
        Some(query) => session.search(query, ResourceKind::Crate),
        None => session.post("crates/list.json", Params::new()),
    }
}

fn search_crates(session: &mut Session<'_>, arg: Option<&str>) -> Result<Response> {
    session.search(required(arg, Action::SearchCrates)?, ResourceKind::Crate)
}

fn rename_crate(session: &mut Session<'_>, arg: Option<&str>) -> Result<Response> {
    let name = required(arg, Action::RenameCrate)?;
    let path = format!("crates/rename/{}.json", session.target(Action::RenameCrate)?);
    session.post(&path, Params::new().field("name", name))
}

fn delete_crate(session: &mut Session<'_>, arg: Option<&str>) -> Result<Response> {
    let id = Identifier::parse(ResourceKind::Crate, required(arg, Action::DeleteCrate)?)?;
    session.post(&format!("crates/destroy/{}.json", id), Params::new())
}
