// Run configuration: the typed record the engine receives once flags have
// been parsed and validated. Nothing in here touches the network.

use crate::actions::Action;
use crate::error::{Error, Result};
use crate::resolver::ResolutionPolicy;
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the optional credentials file in the home directory.
pub const CREDENTIALS_FILE: &str = ".letscrate";

/// Username and password sent as HTTP basic credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse `username:password`. Exactly one separator is accepted and
    /// neither half may be empty.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.trim().split(':').collect();
        match parts.as_slice() {
            [user, pass] if !user.is_empty() && !pass.is_empty() => Ok(Credentials::new(*user, *pass)),
            _ => Err(Error::InvalidCredentialsFormat(raw.to_string())),
        }
    }

    /// Read credentials from `path`. A missing file is not an error.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Credentials::parse(contents.trim()).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

// Keep passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// `~/.letscrate`, when a home directory can be found.
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CREDENTIALS_FILE))
}

/// Pick credentials: an explicit `user:password` value wins, then the file.
pub fn load_credentials(explicit: Option<&str>, file: Option<&Path>) -> Result<Credentials> {
    if let Some(raw) = explicit {
        return Credentials::parse(raw);
    }
    if let Some(path) = file {
        if let Some(credentials) = Credentials::from_file(path)? {
            tracing::debug!(path = %path.display(), "using credentials file");
            return Ok(credentials);
        }
    }
    Err(Error::MissingCredentials)
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct Options {
    pub action: Action,
    pub credentials: Credentials,
    /// Crate named by `--upload` / `--renamecrate`, as typed.
    pub crate_target: Option<String>,
    pub policy: ResolutionPolicy,
    pub arguments: Vec<String>,
}

impl Options {
    pub fn new(action: Action, credentials: Credentials) -> Self {
        Options {
            action,
            credentials,
            crate_target: None,
            policy: ResolutionPolicy::Exact,
            arguments: Vec::new(),
        }
    }

    pub fn with_crate_target(mut self, target: impl Into<String>) -> Self {
        self.crate_target = Some(target.into());
        self
    }

    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }
}
