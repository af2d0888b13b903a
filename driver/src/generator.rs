use std::num::NonZeroU32;
use std::path::Path;
use std::time::Instant;

use eyre::{ensure, Context, Result};
use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use llama_cpp_2::LogOptions;

use crate::extract::extract_sql;
use crate::prompt::build_prompt;

/// Anything that continues a prompt.
///
/// The returned text is the prompt followed by the continuation, the way a
/// causal model decodes its whole output sequence.
pub trait TextModel {
    fn complete(&self, prompt: &str) -> Result<String>;
}

impl<F> TextModel for F
where
    F: Fn(&str) -> Result<String>,
{
    fn complete(&self, prompt: &str) -> Result<String> {
        self(prompt)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationParams {
    pub max_new_tokens: usize,
    pub n_ctx: u32,
    pub n_threads: i32,
    pub gpu_layers: u32,
    /// Forward llama.cpp's own logging to tracing.
    pub verbose: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 200,
            n_ctx: 4096,
            n_threads: 4,
            gpu_layers: 0,
            verbose: false,
        }
    }
}

impl GenerationParams {
    /// Tokens left for the prompt once the completion is accounted for.
    fn prompt_budget(&self) -> usize {
        (self.n_ctx as usize).saturating_sub(self.max_new_tokens)
    }
}

/// A llama.cpp backend together with the loaded weights.
///
/// Loading takes a while, so one engine is created per process and every
/// completion borrows it. Contexts are created per completion.
pub struct Engine {
    backend: LlamaBackend,
    model: LlamaModel,
    params: GenerationParams,
}

impl Engine {
    pub fn load(path: &Path, params: GenerationParams) -> Result<Self> {
        llama_cpp_2::send_logs_to_tracing(LogOptions::default().with_logs_enabled(params.verbose));

        let backend = LlamaBackend::init().wrap_err("failed to initialise llama.cpp")?;

        let model_params = LlamaModelParams::default().with_n_gpu_layers(params.gpu_layers);

        let start = Instant::now();

        let model = LlamaModel::load_from_file(&backend, path, &model_params)
            .wrap_err_with(|| format!("failed to load model from {}", path.display()))?;

        tracing::info!(elapsed = ?start.elapsed(), "loaded {}", path.display());

        Ok(Self {
            backend,
            model,
            params,
        })
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}

impl TextModel for Engine {
    #[tracing::instrument(skip_all, fields(prompt_len = prompt.len()))]
    fn complete(&self, prompt: &str) -> Result<String> {
        let params = &self.params;
        let budget = params.prompt_budget();

        ensure!(
            budget > 1,
            "context of {} tokens leaves no room for a prompt after {} new tokens",
            params.n_ctx,
            params.max_new_tokens
        );

        let ctx_params = LlamaContextParams::default()
            .with_n_ctx(NonZeroU32::new(params.n_ctx))
            .with_n_batch(params.n_ctx)
            .with_n_threads(params.n_threads)
            .with_n_threads_batch(params.n_threads);

        let mut context = self
            .model
            .new_context(&self.backend, ctx_params)
            .wrap_err("failed to create context")?;

        let mut tokens = self.model.str_to_token(prompt, AddBos::Always)?;

        // Keep the BOS token and the tail, which is where the cue lives.
        if tokens.len() > budget {
            let cut = tokens.len() - budget;

            tracing::warn!(
                prompt_tokens = tokens.len(),
                dropped = cut,
                "prompt exceeds the context window, truncating"
            );

            tokens.drain(1..=cut);
        }

        let mut batch = LlamaBatch::new(tokens.len().max(512), 1);

        let last_index = tokens.len() as i32 - 1;
        for (i, token) in (0_i32..).zip(tokens.into_iter()) {
            batch.add(token, i, &[0], i == last_index)?;
        }

        context
            .decode(&mut batch)
            .wrap_err("failed to eval prompt")?;

        let mut output = String::new();
        let mut n_cur = batch.n_tokens();
        let n_len = n_cur + params.max_new_tokens as i32;

        let mut decoder = encoding_rs::UTF_8.new_decoder();
        let mut sampler = LlamaSampler::greedy();

        let start = Instant::now();

        while n_cur < n_len {
            let token = sampler.sample(&context, batch.n_tokens() - 1);

            sampler.accept(token);

            if self.model.is_eog_token(token) {
                break;
            }

            let output_bytes = self.model.token_to_bytes(token, Special::Plaintext)?;

            let capacity = decoder
                .max_utf8_buffer_length(output_bytes.len())
                .unwrap_or(64);
            let mut decoded = String::with_capacity(capacity);

            let _ = decoder.decode_to_string(&output_bytes, &mut decoded, false);

            output.push_str(&decoded);

            batch.clear();
            batch.add(token, n_cur, &[0], true)?;

            n_cur += 1;

            context
                .decode(&mut batch)
                .wrap_err("failed to eval")?;
        }

        tracing::debug!(
            elapsed = ?start.elapsed(),
            chars = output.len(),
            "generation finished"
        );

        Ok(format!("{prompt}{output}"))
    }
}

/// Turns a question about a schema into a formatted query.
pub struct SqlGenerator<M> {
    model: M,
}

impl<M: TextModel> SqlGenerator<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    #[tracing::instrument(skip_all)]
    pub fn generate(&self, question: &str, schema: &str) -> Result<String> {
        let prompt = build_prompt(question, schema);

        let raw = self.model.complete(&prompt)?;

        tracing::debug!(raw_len = raw.len(), "model answered");

        Ok(extract_sql(&raw)?)
    }
}
