// Response formatters, one per action.
//
// A formatter receives the raw result of one call and writes either display
// lines or a single error line. Failure envelopes are reported next to the
// argument the user typed, not the id it was resolved to.

use crate::actions::Response;
use crate::api::RawResponse;
use crate::dispatch::ActionContext;
use crate::error::{Error, Result};
use crate::model::{Catalog, Crate, File};
use crate::ui::Printer;
use std::path::Path;

pub const CREDENTIALS_VALID: &str = "The credentials are valid";
pub const CREDENTIALS_INVALID: &str = "The credentials are invalid";
pub const EMPTY_CRATE: &str = "* Crate is empty.";

fn raw(response: &Response) -> Result<&RawResponse> {
    match response {
        Response::Raw(raw) => Ok(raw),
        Response::Matches { .. } => Err(Error::MalformedResponse(
            "expected a service response, got search results".into(),
        )),
    }
}

/// The envelope when it is a success. A failure is printed and `None` is
/// returned.
fn success<'r>(
    response: &'r Response,
    ctx: &ActionContext,
    out: &mut Printer<'_>,
) -> Result<Option<&'r RawResponse>> {
    let raw = raw(response)?;
    if raw.is_failure() {
        out.error(&raw.message(), ctx.original_argument());
        return Ok(None);
    }
    Ok(Some(raw))
}

pub fn test_credentials(response: &Response, ctx: &mut ActionContext, out: &mut Printer<'_>) -> Result<()> {
    if raw(response)?.is_success() {
        out.line(CREDENTIALS_VALID);
    } else {
        out.error(CREDENTIALS_INVALID, &format!("User:{}", ctx.username()));
    }
    Ok(())
}

pub fn upload_file(response: &Response, ctx: &mut ActionContext, out: &mut Printer<'_>) -> Result<()> {
    let Some(raw) = success(response, ctx, out)? else {
        return Ok(());
    };
    let file: File = raw.payload("file")?;
    // The service does not echo the uploaded name.
    let typed = ctx.original_argument();
    let name = Path::new(typed)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(typed);
    out.info(name, &file.short_code, &file.id);
    Ok(())
}

/// Shared by file and crate deletion.
pub fn deleted(response: &Response, ctx: &mut ActionContext, out: &mut Printer<'_>) -> Result<()> {
    if success(response, ctx, out)?.is_some() {
        out.line(&format!("{} deleted", ctx.display_name()));
    }
    Ok(())
}

pub fn list_files(response: &Response, ctx: &mut ActionContext, out: &mut Printer<'_>) -> Result<()> {
    let Some(raw) = success(response, ctx, out)? else {
        return Ok(());
    };
    let catalog: Catalog = raw.decode()?;
    for krate in &catalog.crates {
        out.info(&krate.name, &krate.short_code, &krate.id);
        if krate.files.is_empty() {
            out.line(EMPTY_CRATE);
        }
        for file in &krate.files {
            out.file(&file.name, &file.short_code, &file.id);
        }
        out.line("");
    }
    Ok(())
}

pub fn show_file(response: &Response, ctx: &mut ActionContext, out: &mut Printer<'_>) -> Result<()> {
    let Some(raw) = success(response, ctx, out)? else {
        return Ok(());
    };
    let item: File = raw.payload("item")?;
    out.info(&item.name, &item.short_code, &item.id);
    Ok(())
}

/// Search results: a header and the hits, or one not-found error line.
pub fn search(response: &Response, ctx: &mut ActionContext, out: &mut Printer<'_>) -> Result<()> {
    let Response::Matches { kind, query, found } = response else {
        return Err(Error::MalformedResponse("expected search results".into()));
    };
    if found.is_empty() {
        let missing = Error::NotFound {
            kind: *kind,
            query: query.clone(),
        };
        out.error(&missing.to_string(), ctx.original_argument());
        return Ok(());
    }
    out.header(query);
    for hit in found {
        out.info(hit.name(), hit.short_code(), hit.id());
    }
    out.line("");
    Ok(())
}

pub fn create_crate(response: &Response, ctx: &mut ActionContext, out: &mut Printer<'_>) -> Result<()> {
    let Some(raw) = success(response, ctx, out)? else {
        return Ok(());
    };
    let created: Crate = raw.payload("crate")?;
    out.info(&created.name, &created.short_code, &created.id);
    Ok(())
}

pub fn list_crates(response: &Response, ctx: &mut ActionContext, out: &mut Printer<'_>) -> Result<()> {
    if let Response::Matches { .. } = response {
        return search(response, ctx, out);
    }
    let Some(raw) = success(response, ctx, out)? else {
        return Ok(());
    };
    let crates: Vec<Crate> = raw.payload("crates")?;
    for krate in &crates {
        out.info(&krate.name, &krate.short_code, &krate.id);
    }
    Ok(())
}

pub fn rename_crate(response: &Response, ctx: &mut ActionContext, out: &mut Printer<'_>) -> Result<()> {
    let Some(raw) = success(response, ctx, out)? else {
        return Ok(());
    };
    let renamed: Crate = raw.payload("crate")?;
    let old = ctx
        .target_name()
        .map(str::to_string)
        .unwrap_or_else(|| renamed.id.clone());
    out.line(&format!("renamed {} to {}", old, renamed.name));
    // A later rename in the same run starts from the new name.
    ctx.set_target_name(renamed.name);
    Ok(())
}
