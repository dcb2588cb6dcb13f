// Dispatcher: drives one run.
//
// 1. resolve the crate named by --upload / --renamecrate (fatal on error)
// 2. resolve positional names for the delete actions (fatal on error)
// 3. invoke the action once per argument, formatting each result as soon
//    as it arrives; per-item errors are printed and the batch continues

use crate::actions::{Action, ActionSpec, Arity, Session};
use crate::api::Transport;
use crate::config::Options;
use crate::error::{Error, Result};
use crate::model::{is_identifier, Identifier, ResourceKind};
use crate::resolver::{self, Resolved};
use crate::ui::{Layout, Printer, Sink};

/// Per-run state the formatters read.
#[derive(Debug, Clone, Default)]
pub struct ActionContext {
    /// Arguments as typed.
    original: Vec<String>,
    /// Arguments after resolution; empty when nothing was resolved.
    arguments: Vec<String>,
    /// Typed argument each resolved item came from, parallel to `arguments`.
    sources: Vec<String>,
    /// Names looked up before a destructive call, parallel to `arguments`.
    captured: Vec<Option<String>>,
    cursor: usize,
    target_name: Option<String>,
    username: String,
}

impl ActionContext {
    pub fn new(original: Vec<String>) -> Self {
        ActionContext {
            original,
            ..Default::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Record the resolved items, where each came from and the names
    /// captured for them.
    pub fn set_resolved(&mut self, resolved: &[Resolved], captured: Vec<Option<String>>) {
        self.arguments = resolved.iter().map(|r| r.id.to_string()).collect();
        self.sources = resolved.iter().map(|r| r.source.clone()).collect();
        self.captured = captured;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    fn captured_name(&self) -> Option<&str> {
        self.captured.get(self.cursor).and_then(|n| n.as_deref())
    }

    /// What the user typed for the item at the cursor. After resolution
    /// this is the name or pattern that produced the item.
    pub fn original_argument(&self) -> &str {
        let typed = if self.arguments.is_empty() {
            &self.original
        } else {
            &self.sources
        };
        typed.get(self.cursor).map(String::as_str).unwrap_or_default()
    }

    /// Name to show for the item at the cursor in a confirmation line.
    pub fn display_name(&self) -> &str {
        self.captured_name()
            .unwrap_or_else(|| self.original_argument())
    }

    pub fn target_name(&self) -> Option<&str> {
        self.target_name.as_deref()
    }

    pub fn set_target_name(&mut self, name: impl Into<String>) {
        self.target_name = Some(name.into());
    }
}

/// Counts for one finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub failed: usize,
}

pub struct Dispatcher<'a> {
    options: &'a Options,
    spec: &'static ActionSpec,
    session: Session<'a>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(options: &'a Options, transport: &'a dyn Transport) -> Self {
        Dispatcher {
            options,
            spec: options.action.spec(),
            session: Session::new(transport, &options.credentials),
        }
    }

    pub fn run(mut self, layout: &Layout, sink: &mut dyn Sink) -> Result<Summary> {
        let action = self.options.action;
        let arguments = self.check_arity()?;
        let mut ctx =
            ActionContext::new(arguments.clone()).with_username(self.options.credentials.username());
        tracing::debug!(action = action.name(), arguments = arguments.len(), "dispatch");

        self.resolve_crate_target(&mut ctx)?;
        let arguments = self.resolve_arguments(arguments, &mut ctx)?;

        let mut out = Printer::new(layout, sink);
        let mut summary = Summary::default();

        if arguments.is_empty() {
            if self.spec.requires.kind().is_some() {
                // Pattern matching left nothing to act on.
                self.report_no_matches(&mut out);
                summary.failed = out.errors();
                return Ok(summary);
            }
            self.execute(None, &mut ctx, &mut out, &mut summary);
        } else {
            for argument in &arguments {
                self.execute(Some(argument), &mut ctx, &mut out, &mut summary);
                ctx.advance();
            }
        }

        tracing::debug!(processed = summary.processed, failed = summary.failed, "done");
        Ok(summary)
    }

    fn check_arity(&self) -> Result<Vec<String>> {
        let arguments = self.options.arguments.clone();
        match self.spec.arity {
            Arity::None if !arguments.is_empty() => {
                tracing::warn!(
                    action = self.spec.name,
                    ignored = arguments.len(),
                    "action takes no arguments"
                );
                Ok(Vec::new())
            }
            Arity::Required if arguments.is_empty() => Err(Error::MissingArguments(self.spec.name)),
            _ => Ok(arguments),
        }
    }

    // Phase 1.
    fn resolve_crate_target(&mut self, ctx: &mut ActionContext) -> Result<()> {
        let options = self.options;
        let action = options.action;
        if !action.takes_crate_target() {
            return Ok(());
        }
        let target = options
            .crate_target
            .as_deref()
            .ok_or(Error::MissingCrateTarget(action.name()))?;

        let id = resolver::resolve_one(
            &mut self.session.catalog,
            target,
            ResourceKind::Crate,
            options.policy,
        )?;
        tracing::debug!(crate_target = target, %id, "resolved crate target");

        if action == Action::RenameCrate {
            let name = self.capture_name(ResourceKind::Crate, &id, target);
            ctx.set_target_name(name);
        }
        self.session.crate_id = Some(id);
        Ok(())
    }

    // Phase 2.
    fn resolve_arguments(&mut self, arguments: Vec<String>, ctx: &mut ActionContext) -> Result<Vec<String>> {
        let Some(kind) = self.spec.requires.kind() else {
            return Ok(arguments);
        };

        let resolved = resolver::resolve(
            &mut self.session.catalog,
            arguments.as_slice(),
            kind,
            self.options.policy,
        )?;

        let mut captured = vec![None; resolved.len()];
        if self.options.action.is_destructive() {
            for (slot, item) in captured.iter_mut().zip(&resolved) {
                *slot = Some(self.capture_name(kind, &item.id, &item.source));
            }
        }

        ctx.set_resolved(&resolved, captured);
        Ok(resolved.iter().map(|r| r.id.to_string()).collect())
    }

    /// Display name for `id` from the catalog, or `fallback` when the
    /// catalog has no such entry or cannot be fetched.
    fn capture_name(&mut self, kind: ResourceKind, id: &Identifier, fallback: &str) -> String {
        match self.session.catalog.get() {
            Ok(catalog) => match catalog.name_of(kind, id.as_str()) {
                Some(name) => name.to_string(),
                None => {
                    tracing::warn!(%kind, %id, "id not in catalog, showing it as typed");
                    fallback.to_string()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "could not fetch catalog for display names");
                fallback.to_string()
            }
        }
    }

    // Phase 3, one item.
    fn execute(
        &mut self,
        argument: Option<&str>,
        ctx: &mut ActionContext,
        out: &mut Printer<'_>,
        summary: &mut Summary,
    ) {
        let errors_before = out.errors();
        let result = (self.spec.invoke)(&mut self.session, argument)
            .and_then(|response| (self.spec.format)(&response, ctx, out));

        if let Err(err) = result {
            tracing::debug!(error = ?err, cursor = ctx.cursor(), "item failed");
            out.error(&err.to_string(), ctx.original_argument());
        }

        summary.processed += 1;
        if out.errors() > errors_before {
            summary.failed += 1;
        }
    }

    fn report_no_matches(&self, out: &mut Printer<'_>) {
        let kind = self.spec.requires.kind().unwrap_or(ResourceKind::File);
        let query = self
            .options
            .arguments
            .iter()
            .rev()
            .find(|a| !is_identifier(a))
            .cloned()
            .unwrap_or_default();
        tracing::info!(%kind, query = %query, "nothing matched");
        let missing = Error::NotFound {
            kind,
            query: query.clone(),
        };
        out.error(&missing.to_string(), &query);
    }
}

/// Validate and run `options` against `transport`, writing to `sink`.
pub fn run(options: &Options, transport: &dyn Transport, layout: &Layout, sink: &mut dyn Sink) -> Result<Summary> {
    Dispatcher::new(options, transport).run(layout, sink)
}
