//! `hemerton lists ...`: action list registration and listing.

use std::io::Write;

use tracing::debug;

use super::Context;
use super::coerce::{INT_LIST_PATTERN, coerce_answers};
use super::output::{cell_text, write_rows, write_separator, write_transaction};
use crate::error::Result;
use crate::form::validators::{validate_integer, validate_string};
use crate::form::{self, PromptBackend, Question};

const INT_LIST_MSG: &str = "Expected a list of integers such as [1,2]";

fn int_field(
    name: &str,
    message: &str,
    default: &str,
    min: i64,
    max: i64,
    optional: bool,
) -> Question {
    Question::input(name)
        .message(message)
        .default(default)
        .validate(validate_integer(Some(min), Some(max), optional))
}

fn int_list_field(name: &str, message: &str, default: &str, optional: bool) -> Result<Question> {
    Ok(Question::input(name)
        .message(message)
        .default(default)
        .validate(validate_string(
            None,
            Some(50),
            Some(INT_LIST_PATTERN),
            Some(INT_LIST_MSG),
            optional,
        )?))
}

/// The list registration form. `optional` relaxes every field.
pub fn list_form(optional: bool) -> Result<Vec<Question>> {
    Ok(vec![
        int_field("numlist", "List number (ID): ", "1", 1, 65536, optional),
        int_field("nAccMax", "nAccMax: ", "9", 1, 65536, optional),
        int_field("durMaxAcc", "durMaxAcc: ", "5", 1, 65536, optional),
        int_field("durPru", "durPru: ", "60", 1, 65536, optional),
        int_field("sRes", "sRes: ", "0", 0, 65536, optional),
        int_list_field("nTAT", "nTAT (int array []): ", "[30,60]", optional)?,
        int_field("nAT", "nAT: ", "50", 1, 65536, optional),
        int_list_field("vNAccR", "vNAccR (int array []): ", "[2,2]", optional)?,
        int_list_field("vNR", "vNR (int array []): ", "[2,2]", optional)?,
        int_list_field(
            "action_p_action_p_restriction",
            "Action types per action per restriction (int array []): ",
            "[1,2,2,2]",
            optional,
        )?,
        int_field("x_axis", "Matrix x axis: ", "2", 1, 30, optional),
        int_field("y_axis", "Matrix y axis: ", "2", 1, 30, optional),
    ])
}

/// `lists new`: registers a new action list.
pub async fn new<B, W>(ctx: &Context<'_>, backend: B, out: &mut W) -> Result<()>
where
    B: PromptBackend,
    W: Write + ?Sized,
{
    let answers = form::prompt_with(backend, &list_form(false)?, &ctx.config.prompt)?;
    let args = coerce_answers(&answers, &[])?;
    let numlist = args
        .get("numlist")
        .map(cell_text)
        .unwrap_or_default();
    debug!("newlist arguments: {:?}", args);

    let result = ctx.submit("newlist", args).await?;

    write_separator(out)?;
    writeln!(out, "New list {} registered successfully", numlist)?;
    write_transaction(out, &result)?;
    Ok(())
}

/// `lists get`: prints every registered list.
pub async fn get<W: Write + ?Sized>(ctx: &Context<'_>, out: &mut W) -> Result<()> {
    let rows = ctx.rows(&ctx.config.chain.lists_table).await?;
    writeln!(out, "Showing existing lists:")?;
    write_rows(out, &rows, "No lists registered.")?;
    Ok(())
}
