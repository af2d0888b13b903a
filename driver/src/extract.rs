use sqlformat::{FormatOptions, Indent, QueryParams};
use thiserror::Error;

use crate::prompt::CUE_MARKER;

const FENCE: &str = "```";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Unexpected model output: missing `sql` cue before the query")]
    MissingCue,

    #[error("Unexpected model output: no query after the `sql` cue")]
    EmptyQuery,
}

/// Pull the generated query out of the raw model output and pretty print it.
///
/// `raw` is the decoded prompt followed by the continuation. The query is
/// whatever follows the first cue line, up to the next closing fence (or the
/// end of the text when the model never closed it).
pub fn extract_sql(raw: &str) -> Result<String, ExtractError> {
    let body = after_cue(raw).ok_or(ExtractError::MissingCue)?;

    let sql = match body.find(FENCE) {
        Some(end) => &body[..end],
        None => body,
    }
    .trim();

    if sql.is_empty() {
        return Err(ExtractError::EmptyQuery);
    }

    Ok(format_sql(sql))
}

/// Upper-case keywords and re-indent with two spaces.
pub fn format_sql(sql: &str) -> String {
    let options = FormatOptions {
        indent: Indent::Spaces(2),
        uppercase: Some(true),
        lines_between_queries: 1,
        ..Default::default()
    };

    sqlformat::format(sql, &QueryParams::None, &options)
}

fn after_cue(raw: &str) -> Option<&str> {
    raw.match_indices(CUE_MARKER).find_map(|(at, cue)| {
        let glued = raw[..at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');

        if glued {
            return None;
        }

        let rest = &raw[at + cue.len()..];

        rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
    })
}
