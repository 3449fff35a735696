//! Interactive prompt collection.
//!
//! Four questions on stdout, one answer line each on stdin. Answers are
//! captured as raw text with only the line terminator removed; there is
//! no validation, a nonsense radius flows straight into the templates.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use crate::core::plan::{Answers, split_indices};
use crate::core::rewrite::PrepCliError;

/// Answers recognized as a yes, checked after lower-casing.
const YES_TOKENS: [&str; 3] = ["yes", "y", "ye"];

/// Collect all answers from stdin, in question order.
pub fn collect() -> Result<Answers> {
    collect_from(&mut io::stdin().lock())
}

/// Reader-generic collection so the question flow is testable without a
/// terminal. The indices question is only asked when removal is accepted.
pub fn collect_from(input: &mut impl BufRead) -> Result<Answers> {
    let beam_radius = ask(input, "What is the beam radius?(mm) ")?;

    let excluded_indices = if is_yes(&ask(input, "Do you need to remove extra indices (y/N)? ")?) {
        split_indices(&ask(input, "What indices should be filtered out? ")?)
    } else {
        Vec::new()
    };

    let fit_enabled = is_yes(&ask(input, "Do you want to fit the histogram (y/N)? ")?);

    Ok(Answers {
        beam_radius,
        excluded_indices,
        fit_enabled,
    })
}

/// Print `prompt` without a newline and read one answer line. The line
/// terminator is stripped, `\r\n` as a pair; nothing else is trimmed.
fn ask(input: &mut impl BufRead, prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush().context("flushing prompt")?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("reading prompt answer")?;
    if read == 0 {
        return Err(PrepCliError::PromptClosed.into());
    }

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(line)
}

fn is_yes(answer: &str) -> bool {
    YES_TOKENS.contains(&answer.to_lowercase().as_str())
}
