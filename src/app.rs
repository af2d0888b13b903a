use std::io::{self, BufRead, Write};

use eyre::{Context, Result};
use nl2sql_driver::{Engine, GenerationParams, ModelSource, SqlGenerator, TextModel};

use crate::command::{Command, END_OF_SCHEMA, HELP};
use crate::sample::SAMPLE_SCHEMA;
use crate::session::{HistoryEntry, Session};

pub const MISSING_INPUT: &str = "Please provide both a database schema and a query.";
pub const MODEL_NOT_LOADED: &str = "Error: Model not loaded.";

const BANNER: &str = "\
NL2SQL with llama-3-sqlcoder-8b
Enter a database schema and a natural language question to generate a SQL query.
Type :help for the list of commands.";

/// Resolve the weights and load them into a generator. Slow; call once.
pub fn load_generator(
    source: &ModelSource,
    params: GenerationParams,
) -> Result<SqlGenerator<Engine>> {
    let path = source.resolve()?;

    tracing::info!("loading model {source}, this may take a few minutes");

    let engine = Engine::load(&path, params)?;

    tracing::info!(
        max_new_tokens = engine.params().max_new_tokens,
        n_ctx = engine.params().n_ctx,
        "model ready"
    );

    Ok(SqlGenerator::new(engine))
}

/// The interactive front end: one session, one (optional) model.
///
/// A missing generator means the model failed to load; generate actions
/// still go through and record [`MODEL_NOT_LOADED`].
pub struct App<M> {
    generator: Option<SqlGenerator<M>>,
    session: Session,
}

impl<M: TextModel> App<M> {
    pub fn new(generator: Option<SqlGenerator<M>>) -> Self {
        Self {
            generator,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_schema(&mut self, schema: impl Into<String>) {
        self.session.schema = schema.into();
    }

    pub fn load_sample_schema(&mut self) {
        self.set_schema(SAMPLE_SCHEMA);
    }

    /// The query for `question`, or a user-facing `Error: ...` line.
    pub fn generate_sql_query(&self, question: &str, schema: &str) -> String {
        let Some(generator) = &self.generator else {
            return MODEL_NOT_LOADED.to_string();
        };

        match generator.generate(question, schema) {
            Ok(sql) => sql,
            Err(e) => {
                tracing::warn!("generation failed: {e:#}");

                format!("Error: Could not generate SQL query. {e}")
            }
        }
    }

    /// Run one generate action against the current schema and record it.
    ///
    /// Returns `None`, recording nothing, when the schema or the question is blank.
    pub fn generate(&mut self, question: &str) -> Option<&HistoryEntry> {
        if self.session.schema.trim().is_empty() || question.trim().is_empty() {
            return None;
        }

        let sql = self.generate_sql_query(question, &self.session.schema);

        let entry = HistoryEntry::new(question, self.session.schema.clone(), sql);

        tracing::info!(id = %entry.id, "recorded query");

        self.session.history.push(entry);
        self.session.history.last()
    }

    /// Drive the session from `input` until `:quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> io::Result<()> {
        writeln!(out, "{BANNER}")?;

        let mut lines = input.lines();

        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };

            let Some(command) = Command::parse(&line?) else {
                continue;
            };

            match command {
                Command::Quit => break,
                Command::Schema => {
                    writeln!(out, "Paste the schema, finish with {END_OF_SCHEMA} on its own line.")?;

                    let mut schema = String::new();

                    for line in lines.by_ref() {
                        let line = line?;

                        if line.trim() == END_OF_SCHEMA {
                            break;
                        }

                        schema.push_str(&line);
                        schema.push('\n');
                    }

                    self.set_schema(schema);

                    writeln!(out, "Schema updated.")?;
                }
                command => self.execute(command, &mut out)?,
            }
        }

        Ok(())
    }

    fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<()> {
        match command {
            Command::Generate(question) => match self.generate(&question) {
                Some(entry) => {
                    writeln!(out, "Generated SQL Query:")?;
                    writeln!(out, "{}", entry.sql)?;
                }
                None => writeln!(out, "{MISSING_INPUT}")?,
            },
            Command::SchemaFile(path) => match std::fs::read_to_string(&path) {
                Ok(schema) => {
                    self.set_schema(schema);
                    writeln!(out, "Schema loaded from {}.", path.display())?;
                }
                Err(e) => writeln!(out, "Error: could not read {}: {e}", path.display())?,
            },
            Command::Sample => {
                self.load_sample_schema();
                writeln!(out, "Loaded sample schema.")?;
            }
            Command::Show => {
                if self.session.schema.trim().is_empty() {
                    writeln!(out, "No schema set.")?;
                } else {
                    writeln!(out, "{}", self.session.schema.trim_end())?;
                }
            }
            Command::History(None) => self.print_history(out)?,
            Command::History(Some(n)) => match self.session.history.recent_nth(n) {
                Some(entry) => {
                    writeln!(out, "Query {n}: {}", entry.question)?;
                    writeln!(out, "Schema:")?;
                    writeln!(out, "{}", entry.schema.trim_end())?;
                    writeln!(out, "Generated SQL:")?;
                    writeln!(out, "{}", entry.sql)?;
                }
                None => writeln!(out, "No query {n} in the history.")?,
            },
            Command::Clear => {
                self.session.history.clear();
                writeln!(out, "Query history cleared.")?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Unknown(line) => writeln!(out, "Unknown command `{line}`, try :help.")?,
            Command::Schema | Command::Quit => {}
        }

        Ok(())
    }

    fn print_history<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let recent = self.session.history.recent();

        if recent.is_empty() {
            return writeln!(out, "Query history is empty.");
        }

        writeln!(out, "Query History")?;

        for (i, entry) in recent.iter().enumerate() {
            writeln!(out, "Query {}: {}", i + 1, entry.question)?;
        }

        Ok(())
    }
}

/// Read a schema for one-shot mode.
pub fn read_schema(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read schema from {path:?}"))
}

#[cfg(test)]
mod tests {
    use eyre::eyre;

    use super::*;
    use crate::session::HISTORY_DISPLAY_LIMIT;

    type Canned = fn(&str) -> Result<String>;

    fn answers_select(prompt: &str) -> Result<String> {
        Ok(format!("{prompt}SELECT * FROM products\n```"))
    }

    fn rambles(_: &str) -> Result<String> {
        Ok("I am not sure what you mean.".to_string())
    }

    fn fails(_: &str) -> Result<String> {
        Err(eyre!("backend exploded"))
    }

    fn app(model: Canned) -> App<Canned> {
        let mut app = App::new(Some(SqlGenerator::new(model)));
        app.set_schema("CREATE TABLE products (id INT);");
        app
    }

    fn run(app: &mut App<Canned>, input: &str) -> String {
        let mut out = Vec::new();
        app.run(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn generate_records_formatted_sql() {
        let mut app = app(answers_select);

        let entry = app.generate("List all products").unwrap().clone();

        assert_eq!(entry.question, "List all products");
        assert_eq!(entry.schema, "CREATE TABLE products (id INT);");
        assert_eq!(entry.sql, nl2sql_driver::format_sql("SELECT * FROM products"));
        assert_eq!(app.session().history.len(), 1);
    }

    #[test]
    fn blank_inputs_record_nothing() {
        let mut app = app(answers_select);

        assert!(app.generate("   ").is_none());

        app.set_schema("  \n ");
        assert!(app.generate("List all products").is_none());

        assert!(app.session().history.is_empty());
    }

    #[test]
    fn missing_model_still_records() {
        let mut app: App<Canned> = App::new(None);
        app.load_sample_schema();

        let entry = app.generate("How many sales?").unwrap();

        assert_eq!(entry.sql, MODEL_NOT_LOADED);
        assert_eq!(app.session().history.len(), 1);
    }

    #[test]
    fn extraction_failure_becomes_error_string() {
        let app = app(rambles);

        let sql = app.generate_sql_query("List all products", "CREATE TABLE products (id INT);");

        assert!(sql.starts_with("Error: Could not generate SQL query. "));
        assert!(sql.contains("missing `sql` cue"));
    }

    #[test]
    fn model_failure_becomes_error_string() {
        let mut app = app(fails);

        let entry = app.generate("List all products").unwrap();

        assert_eq!(
            entry.sql,
            "Error: Could not generate SQL query. backend exploded"
        );
    }

    #[test]
    fn history_keeps_the_last_five_after_many_actions() {
        let mut app = app(answers_select);

        for i in 1..=7 {
            app.generate(&format!("question {i}")).unwrap();
        }

        let recent = app.session().history.recent();
        assert_eq!(recent.len(), HISTORY_DISPLAY_LIMIT);
        assert_eq!(recent[0].question, "question 3");
        assert_eq!(recent[4].question, "question 7");
    }

    #[test]
    fn session_generates_and_lists_history() {
        let mut app = app(answers_select);

        let out = run(&mut app, "List all products\n:history\n:quit\n");

        assert!(out.contains("Generated SQL Query:"));
        assert!(out.contains("Query History\nQuery 1: List all products\n"));
    }

    #[test]
    fn session_requires_schema() {
        let mut app: App<Canned> = App::new(Some(SqlGenerator::new(answers_select as Canned)));

        let out = run(&mut app, "List all products\n");

        assert!(out.contains(MISSING_INPUT));
        assert!(app.session().history.is_empty());
    }

    #[test]
    fn pasted_schema_keeps_blank_lines() {
        let mut app: App<Canned> = App::new(None);

        let out = run(
            &mut app,
            ":schema\nCREATE TABLE a (id INT);\n\nCREATE TABLE b (id INT);\n:end\n:show\n",
        );

        assert_eq!(
            app.session().schema,
            "CREATE TABLE a (id INT);\n\nCREATE TABLE b (id INT);\n"
        );
        assert!(out.contains("Schema updated."));
        assert!(out.contains("CREATE TABLE b (id INT);"));
    }

    #[test]
    fn sample_then_expand_history_entry() {
        let mut app: App<Canned> = App::new(Some(SqlGenerator::new(answers_select as Canned)));

        let out = run(&mut app, ":sample\nList all products\n:history 1\n:history 2\n");

        assert_eq!(app.session().schema, SAMPLE_SCHEMA);
        assert!(out.contains("Loaded sample schema."));
        assert!(out.contains("Query 1: List all products\nSchema:\nCREATE TABLE products ("));
        assert!(out.contains("Generated SQL:\n"));
        assert!(out.contains("No query 2 in the history."));
    }

    #[test]
    fn clear_empties_history() {
        let mut app = app(answers_select);

        let out = run(&mut app, "one\ntwo\n:clear\n:history\n");

        assert!(out.contains("Query history cleared."));
        assert!(out.contains("Query history is empty."));
        assert!(app.session().history.is_empty());
    }

    #[test]
    fn quit_stops_reading() {
        let mut app = app(answers_select);

        run(&mut app, ":quit\nList all products\n");

        assert!(app.session().history.is_empty());
    }

    #[test]
    fn unreadable_schema_file_is_reported() {
        let mut app: App<Canned> = App::new(None);

        let out = run(&mut app, ":schema-file /definitely/not/here.sql\n");

        assert!(out.contains("Error: could not read /definitely/not/here.sql"));
        assert!(app.session().schema.is_empty());
    }

    #[test]
    fn unknown_command_is_reported() {
        let mut app: App<Canned> = App::new(None);

        let out = run(&mut app, ":bogus\n");

        assert!(out.contains("Unknown command `:bogus`"));
    }
}
