// Command-line flags.
//
// One flag per action plus a few modifiers. Parsing is plain
// clap; `into_options` turns the flags into a validated `Options` record
// before anything talks to the network.

use crate::actions::Action;
use crate::config::{self, Options};
use crate::error::{Error, Result};
use crate::resolver::ResolutionPolicy;
use clap::{ArgAction, Parser};
use std::path::Path;

pub const VERSION_BANNER: &str = concat!("LetsCrate v", env!("CARGO_PKG_VERSION"), " (API Version 1)");

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "letscrate",
    about = "Command-line client for LetsCrate file hosting",
    override_usage = "letscrate <-l username:password> [options] file1 file2 ...\n       letscrate <-l username:password> [options] name1 name2 ...",
    disable_version_flag = true
)]
pub struct Cli {
    /// Login with this username and password
    #[arg(
        short = 'l',
        long = "login",
        value_name = "USERNAME:PASSWORD",
        env = "LETSCRATE_LOGIN",
        hide_env_values = true,
        help_heading = "Mandatory options"
    )]
    pub login: Option<String>,

    /// Upload files to crate
    #[arg(short = 'u', long = "upload", value_name = "CRATE", help_heading = "File functions")]
    pub upload: Option<String>,

    /// Delete files with names
    #[arg(short = 'd', long = "delete", help_heading = "File functions")]
    pub delete: bool,

    /// List all files by crate
    #[arg(short = 'a', long = "list", help_heading = "File functions")]
    pub list: bool,

    /// Search for files with names
    #[arg(short = 's', long = "search", help_heading = "File functions")]
    pub search: bool,

    /// Show files with IDs
    #[arg(short = 'i', long = "id", help_heading = "File functions")]
    pub id: bool,

    /// Create new crates with names
    #[arg(short = 'N', long = "newcrate", help_heading = "Crate functions")]
    pub new_crate: bool,

    /// List all crates, or those matching the given names
    #[arg(short = 'A', long = "listcrates", help_heading = "Crate functions")]
    pub list_crates: bool,

    /// Search for crates with names
    #[arg(short = 'S', long = "searchcrates", help_heading = "Crate functions")]
    pub search_crates: bool,

    /// Rename crate to name
    #[arg(short = 'R', long = "renamecrate", value_name = "CRATE", help_heading = "Crate functions")]
    pub rename_crate: Option<String>,

    /// Delete crates with names
    #[arg(short = 'D', long = "deletecrate", help_heading = "Crate functions")]
    pub delete_crate: bool,

    /// Treat all names as regular expressions
    #[arg(short = 'r', long = "regexp", help_heading = "Misc. options")]
    pub regexp: bool,

    /// Only test the credentials
    #[arg(short = 't', long = "test", help_heading = "Misc. options")]
    pub test: bool,

    /// Print errors only
    #[arg(short = 'q', long = "quiet", help_heading = "Misc. options")]
    pub quiet: bool,

    /// More log output on stderr (repeatable)
    #[arg(long = "verbose", action = ArgAction::Count, help_heading = "Misc. options")]
    pub verbose: u8,

    /// Output version
    #[arg(short = 'v', long = "version", help_heading = "Misc. options")]
    pub version: bool,

    /// File paths, names or IDs, depending on the action
    #[arg(value_name = "ARGS")]
    pub arguments: Vec<String>,
}

impl Cli {
    /// Actions picked on the command line, in flag order.
    pub fn selected_actions(&self) -> Vec<Action> {
        let flags = [
            (self.upload.is_some(), Action::UploadFile),
            (self.delete, Action::DeleteFile),
            (self.list, Action::ListFiles),
            (self.search, Action::SearchFiles),
            (self.id, Action::ShowFile),
            (self.new_crate, Action::CreateCrate),
            (self.list_crates, Action::ListCrates),
            (self.search_crates, Action::SearchCrates),
            (self.rename_crate.is_some(), Action::RenameCrate),
            (self.delete_crate, Action::DeleteCrate),
            (self.test, Action::TestCredentials),
        ];
        flags
            .into_iter()
            .filter_map(|(on, action)| on.then_some(action))
            .collect()
    }

    pub fn policy(&self) -> ResolutionPolicy {
        if self.regexp {
            ResolutionPolicy::Wildcard
        } else {
            ResolutionPolicy::Exact
        }
    }

    /// Validate the flags. `Ok(None)` means no action was selected and the
    /// caller should print usage. `credentials_file` is consulted when no
    /// login was given.
    pub fn into_options(self, credentials_file: Option<&Path>) -> Result<Option<Options>> {
        let actions = self.selected_actions();
        let action = match actions.as_slice() {
            [] => return Ok(None),
            [action] => *action,
            many => return Err(Error::TooManyActionsSelected(many.len())),
        };

        let credentials = config::load_credentials(self.login.as_deref(), credentials_file)?;
        let policy = self.policy();

        let mut options = Options::new(action, credentials)
            .with_policy(policy)
            .with_arguments(self.arguments);
        if let Some(target) = self.upload.or(self.rename_crate) {
            options = options.with_crate_target(target);
        }
        Ok(Some(options))
    }
}
