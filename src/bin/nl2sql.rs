use std::io;

use clap::Parser;
use eyre::{bail, Result};
use nl2sql::app::{self, App, MISSING_INPUT};
use nl2sql::config::{AskArgs, Cli, Commands};
use nl2sql::logging;
use nl2sql::sample::SAMPLE_SCHEMA;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(cli.chrome_trace.as_deref())?;

    match cli.command {
        None | Some(Commands::Repl) => repl(&cli),
        Some(Commands::Ask(ref args)) => ask(&cli, args),
    }
}

fn repl(cli: &Cli) -> Result<()> {
    let generator = match app::load_generator(&cli.model.source(), cli.model.params(cli.verbose)) {
        Ok(generator) => Some(generator),
        Err(e) => {
            tracing::error!("{e:?}");
            println!("Failed to load model: {e:#}");
            None
        }
    };

    let mut app = App::new(generator);

    app.run(io::stdin().lock(), io::stdout().lock())?;

    Ok(())
}

fn ask(cli: &Cli, args: &AskArgs) -> Result<()> {
    let schema = match &args.schema_file {
        Some(path) => app::read_schema(path)?,
        None => SAMPLE_SCHEMA.to_string(),
    };

    let generator = app::load_generator(&cli.model.source(), cli.model.params(cli.verbose))?;

    let mut app = App::new(Some(generator));
    app.set_schema(schema);

    let Some(entry) = app.generate(&args.question) else {
        bail!(MISSING_INPUT);
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(entry)?);
    } else {
        println!("{}", entry.sql);
    }

    if entry.sql.starts_with("Error:") {
        bail!("no query generated");
    }

    Ok(())
}
