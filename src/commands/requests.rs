//! `hemerton test ...`: opening requests against a list and uploading their
//! evidence.

use std::io::Write;

use serde_json::Value;
use tracing::{debug, warn};

use super::Context;
use super::coerce::coerce_answers;
use super::output::{cell_text, matrix_rows, write_rows, write_separator, write_transaction};
use crate::clients::Row;
use crate::error::{HemertonError, Result};
use crate::form::validators::{validate_integer, validate_string};
use crate::form::{self, Choice, PromptBackend, Question};

pub const NO_LISTS_MSG: &str = "At least a list is meant to be registered before send a request.";
pub const NO_LISTS_HINT: &str = "Run `hemerton lists new` to register one.";

/// Evidence hash used when the user accepts the default.
pub const DEFAULT_EVIDENCE: &str = "27362e4afa18a31c6bf";

/// Asks which registered list a new request is for.
pub fn request_form(lists: &[Row]) -> Vec<Question> {
    let choices: Vec<Choice> = lists
        .iter()
        .filter_map(|row| row.get("numlist"))
        .map(|id| Choice::option(cell_text(id)))
        .collect();
    vec![
        Question::option_list("numlist")
            .message("Select a list for the request: ")
            .choices(choices),
    ]
}

/// Asks for the request to close and its evidence hash.
pub fn upload_form() -> Result<Vec<Question>> {
    Ok(vec![
        Question::input("request")
            .message("Request ID: ")
            .default("1")
            .validate(validate_integer(Some(1), Some(65536), false)),
        Question::input("evidence")
            .message("Evidence (video hash) as a hexadecimal string: ")
            .default(DEFAULT_EVIDENCE)
            .validate(validate_string(None, Some(100), None, None, false)?),
    ])
}

fn find_row<'a>(rows: &'a [Row], field: &str, value: &Value) -> Option<&'a Row> {
    let wanted = cell_text(value);
    rows.iter()
        .find(|row| row.get(field).is_some_and(|v| cell_text(v) == wanted))
}

/// `test new`: opens a request against an existing list.
///
/// Without registered lists the guidance is printed, nothing is asked or
/// submitted, and [`HemertonError::RequiredContextEmpty`] is returned.
pub async fn new<B, W>(ctx: &Context<'_>, backend: B, out: &mut W) -> Result<()>
where
    B: PromptBackend,
    W: Write + ?Sized,
{
    let lists = ctx.rows(&ctx.config.chain.lists_table).await?;
    if lists.is_empty() {
        writeln!(out, "{}", NO_LISTS_MSG)?;
        writeln!(out, "{}", NO_LISTS_HINT)?;
        return Err(HemertonError::RequiredContextEmpty {
            message: format!("{}\n{}", NO_LISTS_MSG, NO_LISTS_HINT),
        });
    }

    let answers = form::prompt_with(backend, &request_form(&lists), &ctx.config.prompt)?;
    let args = coerce_answers(&answers, &[])?;
    let chosen = args.get("numlist").cloned().unwrap_or(Value::Null);
    debug!("open arguments: {:?}", args);

    let result = ctx.submit("open", args).await?;

    let proofs = ctx.rows(&ctx.config.chain.proofs_table).await?;
    write_separator(out)?;
    match proofs.last() {
        Some(last) => {
            let key = last.get("key").map(cell_text).unwrap_or_default();
            writeln!(out, "Your request ID is {}", key)?;
            writeln!(out, "Keep it safe in order to use it when you upload the evidence.")?;
            write_separator(out)?;

            let width = find_row(&lists, "numlist", &chosen)
                .and_then(|list| list.get("x_axis"))
                .and_then(Value::as_u64)
                .map(|w| w as usize);
            let actions = last
                .get("actions")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            writeln!(out, "MIT Matrix (Actions): ")?;
            for line in matrix_rows(actions, width) {
                writeln!(out, "{}", line)?;
            }
        }
        None => {
            warn!("request submitted but table {} is empty", ctx.config.chain.proofs_table);
            writeln!(out, "Request submitted, but no request record was found yet.")?;
        }
    }
    write_transaction(out, &result)?;
    Ok(())
}

/// `test upload`: attaches evidence to an open request.
pub async fn upload<B, W>(ctx: &Context<'_>, backend: B, out: &mut W) -> Result<()>
where
    B: PromptBackend,
    W: Write + ?Sized,
{
    let answers = form::prompt_with(backend, &upload_form()?, &ctx.config.prompt)?;
    let args = coerce_answers(&answers, &["evidence"])?;
    let request = args.get("request").cloned().unwrap_or(Value::Null);
    debug!("upload arguments: {:?}", args);

    let result = ctx.submit("upload", args).await?;

    let proofs = ctx.rows(&ctx.config.chain.proofs_table).await?;
    write_separator(out)?;
    writeln!(out, "Final state of the request on chain:")?;
    match find_row(&proofs, "key", &request) {
        Some(row) => write_rows(out, std::slice::from_ref(row), "")?,
        None => writeln!(out, "Request {} not found.", cell_text(&request))?,
    }
    write_transaction(out, &result)?;
    Ok(())
}

/// `test get`: prints every request.
pub async fn get<W: Write + ?Sized>(ctx: &Context<'_>, out: &mut W) -> Result<()> {
    let rows = ctx.rows(&ctx.config.chain.proofs_table).await?;
    writeln!(out, "Showing existing requests:")?;
    write_rows(out, &rows, "No requests found.")?;
    Ok(())
}
