// Error types shared by the whole crate.
//
// Messages double as the user-facing text: the dispatcher prints
// `err.to_string()` next to the argument that caused it.

use crate::model::ResourceKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("More than one action was selected. Please select only one action.")]
    TooManyActionsSelected(usize),

    #[error("You need an account to use the LetsCrate API.")]
    MissingCredentials,

    #[error("Credentials invalid, please input them in the format \"username:password\"")]
    InvalidCredentialsFormat(String),

    #[error("A {kind} ID is a 5 digit number. Use {hint} to list your {kind}s's IDs.", hint = .kind.listing_flag())]
    InvalidIdentifierFormat { kind: ResourceKind, value: String },

    #[error("No {kind}s were found that match that name.")]
    NotFound { kind: ResourceKind, query: String },

    #[error("More than 1 {kind} matched that name. Please make your query more specific.")]
    Ambiguous { kind: ResourceKind, query: String },

    /// Resolution produced fewer ids than arguments without producing none.
    /// Only a batch mixing identifiers and names can get here.
    #[error("Resolved {found} {kind} IDs for {expected} arguments. Pass either all IDs or all names.")]
    CountMismatch {
        kind: ResourceKind,
        expected: usize,
        found: usize,
    },

    #[error("Invalid pattern: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("The {0} action needs at least one argument.")]
    MissingArguments(&'static str),

    #[error("The {0} action needs a crate name or ID.")]
    MissingCrateTarget(&'static str),

    /// Failure envelope returned by the service.
    #[error("{message}")]
    RemoteFailure { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected response: {0}")]
    MalformedResponse(String),
}

impl Error {
    /// The argument a fatal error should be printed next to.
    pub fn subject(&self) -> Option<String> {
        match self {
            Error::TooManyActionsSelected(count) => Some(count.to_string()),
            Error::MissingCredentials => Some("NoLoginError".into()),
            Error::InvalidCredentialsFormat(raw) => Some(raw.clone()),
            Error::InvalidIdentifierFormat { value, .. } => Some(value.clone()),
            Error::NotFound { query, .. } | Error::Ambiguous { query, .. } => Some(query.clone()),
            Error::InvalidPattern { pattern, .. } => Some(pattern.clone()),
            _ => None,
        }
    }

    /// Follow-up line printed after a fatal error, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::TooManyActionsSelected(_) => Some("Use the -h flag for help, or read the README."),
            Error::MissingCredentials => {
                Some("Use the \"-l\" switch to specify your login credentials")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
