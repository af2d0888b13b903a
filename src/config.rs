use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nl2sql_driver::{GenerationParams, ModelSource};

#[derive(Parser, Debug)]
#[command(
    name = "nl2sql",
    version,
    about = "Turn natural-language questions into SQL with llama-3-sqlcoder-8b"
)]
pub struct Cli {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Forward llama.cpp's own logs
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Write a Chrome trace of the run to this file
    #[arg(long, global = true)]
    pub chrome_trace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive session (the default)
    Repl,
    /// Generate a single query and exit
    Ask(AskArgs),
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The natural-language question
    #[arg(long, short)]
    pub question: String,

    /// File holding the schema DDL
    #[arg(long, required_unless_present = "sample_schema", conflicts_with = "sample_schema")]
    pub schema_file: Option<PathBuf>,

    /// Use the bundled sample schema
    #[arg(long)]
    pub sample_schema: bool,

    /// Print the history entry as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Local GGUF file; skips the hub
    #[arg(long = "model", env = "NL2SQL_MODEL_PATH", global = true)]
    pub path: Option<PathBuf>,

    /// Hugging Face repository holding the GGUF weights
    #[arg(long, env = "NL2SQL_REPO_ID", global = true)]
    pub repo_id: Option<String>,

    /// GGUF file inside the repository
    #[arg(long, env = "NL2SQL_MODEL_FILENAME", global = true)]
    pub filename: Option<String>,

    #[arg(long, default_value_t = 200, global = true)]
    pub max_new_tokens: usize,

    #[arg(long, default_value_t = 4096, global = true)]
    pub ctx_size: u32,

    #[arg(long, default_value_t = 4, global = true)]
    pub threads: i32,

    /// Layers to offload to the GPU
    #[arg(long, env = "NL2SQL_GPU_LAYERS", default_value_t = 0, global = true)]
    pub gpu_layers: u32,
}

impl ModelArgs {
    pub fn source(&self) -> ModelSource {
        ModelSource::new(self.path.clone(), self.repo_id.clone(), self.filename.clone())
    }

    pub fn params(&self, verbose: bool) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.max_new_tokens,
            n_ctx: self.ctx_size,
            n_threads: self.threads,
            gpu_layers: self.gpu_layers,
            verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_session() {
        let cli = Cli::try_parse_from(["nl2sql"]).unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.model.max_new_tokens, 200);
        assert_eq!(cli.model.ctx_size, 4096);
        assert!(!cli.verbose);
    }

    #[test]
    fn ask_with_sample_schema() {
        let cli =
            Cli::try_parse_from(["nl2sql", "ask", "-q", "List all products", "--sample-schema"])
                .unwrap();

        let Some(Commands::Ask(args)) = cli.command else {
            panic!("expected ask");
        };

        assert_eq!(args.question, "List all products");
        assert!(args.sample_schema);
        assert!(args.schema_file.is_none());
    }

    #[test]
    fn ask_needs_a_schema() {
        assert!(Cli::try_parse_from(["nl2sql", "ask", "-q", "q"]).is_err());
        assert!(Cli::try_parse_from([
            "nl2sql",
            "ask",
            "-q",
            "q",
            "--sample-schema",
            "--schema-file",
            "s.sql"
        ])
        .is_err());
    }

    #[test]
    fn model_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nl2sql",
            "ask",
            "-q",
            "q",
            "--schema-file",
            "s.sql",
            "--model",
            "/models/coder.gguf",
            "--max-new-tokens",
            "64",
        ])
        .unwrap();

        assert_eq!(cli.model.source(), ModelSource::Local("/models/coder.gguf".into()));
        assert_eq!(cli.model.params(false).max_new_tokens, 64);
    }
}
