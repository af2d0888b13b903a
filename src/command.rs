use std::path::PathBuf;

/// One line of session input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// A natural-language question to turn into SQL.
    Generate(String),
    /// Start pasting a schema; lines are collected until `:end`.
    Schema,
    SchemaFile(PathBuf),
    Sample,
    Show,
    /// List the recent history, or expand one entry of it.
    History(Option<usize>),
    Clear,
    Help,
    Quit,
    Unknown(String),
}

/// Terminates a pasted schema.
pub const END_OF_SCHEMA: &str = ":end";

pub const HELP: &str = "\
Type a question to generate SQL against the current schema.

  :schema            paste a schema, finish with :end on its own line
  :schema-file PATH  read the schema from a file
  :sample            load the sample retail schema
  :show              print the current schema
  :history [N]       list recent queries, or expand query N
  :clear             clear the query history
  :help              show this message
  :quit              leave the session";

impl Command {
    /// `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();

        if line.is_empty() {
            return None;
        }

        let Some(rest) = line.strip_prefix(':') else {
            return Some(Self::Generate(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match (name, arg) {
            ("schema", "") => Self::Schema,
            ("schema-file", path) if !path.is_empty() => Self::SchemaFile(PathBuf::from(path)),
            ("sample", "") => Self::Sample,
            ("show", "") => Self::Show,
            ("history", "") => Self::History(None),
            ("history", n) => match n.parse() {
                Ok(n) => Self::History(Some(n)),
                Err(_) => Self::Unknown(line.to_string()),
            },
            ("clear", "") => Self::Clear,
            ("help", "") => Self::Help,
            ("quit" | "exit" | "q", "") => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        };

        Some(command)
    }
}
