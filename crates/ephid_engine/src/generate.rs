use std::collections::BTreeMap;
use std::pin::pin;
use std::sync::Arc;

use ephid_core::{AllocError, EphemeralIds, IdentifierSpace, SpaceError};
use ephid_logging::{ephid_info, ephid_trace};
use futures_util::stream::{self, StreamExt};
use thiserror::Error;

use crate::cache::{load_space, store_space, SpaceCache};
use crate::catalog::{candidate_starters, is_banned};
use crate::key::cache_key;
use crate::{GenerationProgress, Prober, Stage, TokenizeError, Tokenizer, TokenizerProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Prepended to every identifier; must tokenize as exactly one token.
    pub prefix: String,
    /// Three-character starters instead of two.
    pub long: bool,
    /// Consult and update the configured cache.
    pub cache: bool,
    /// Starters probed concurrently. Never changes the result.
    pub concurrency: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            long: false,
            cache: true,
            concurrency: 8,
        }
    }
}

impl GenerateOptions {
    /// Byte length of every starter in the resulting space, prefix included.
    pub fn starter_length(&self) -> usize {
        self.prefix.len() + if self.long { 3 } else { 2 }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerateError {
    /// The anchor framings disagree or the prefix is not one token.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },
    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizeError),
    #[error("invalid identifier space: {0}")]
    Space(#[from] SpaceError),
    #[error(transparent)]
    Allocator(#[from] AllocError),
}

impl GenerateError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, progress: GenerationProgress);
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _progress: GenerationProgress) {}
}

/// Probes every allowed starter of the configured length.
pub async fn generate_space(
    tokenizer: &dyn Tokenizer,
    options: &GenerateOptions,
    sink: &dyn ProgressSink,
) -> Result<IdentifierSpace, GenerateError> {
    generate_space_from(tokenizer, options, candidate_starters(options.long), sink).await
}

/// Probes a caller-chosen set of starters. Deny-listed starters are skipped.
///
/// Starters are probed concurrently, bounded by `options.concurrency`; the
/// result is identical for any concurrency. Rejected candidates only shrink
/// the space; an empty space is a valid result.
pub async fn generate_space_from<I>(
    tokenizer: &dyn Tokenizer,
    options: &GenerateOptions,
    candidates: I,
    sink: &dyn ProgressSink,
) -> Result<IdentifierSpace, GenerateError>
where
    I: IntoIterator<Item = String>,
{
    let candidates: Vec<String> = candidates
        .into_iter()
        .filter(|starter| {
            let banned = is_banned(starter);
            if banned {
                ephid_trace!("Skipping deny-listed starter {starter}");
            }
            !banned
        })
        .collect();
    let total = candidates.len();

    sink.emit(GenerationProgress::stage(Stage::Anchoring));
    let prober = Prober::new(tokenizer, &options.prefix).await?;
    let prober = &prober;

    let mut progress = GenerationProgress {
        stage: Stage::Probing,
        probed: 0,
        total,
        accepted: 0,
    };
    sink.emit(progress.clone());

    let mut probes = pin!(stream::iter(candidates)
        .map(move |starter| async move {
            let outcome = prober.probe_starter(&starter).await;
            (starter, outcome)
        })
        .buffered(options.concurrency.max(1)));

    let mut starters = BTreeMap::new();
    while let Some((starter, outcome)) = probes.next().await {
        progress.probed += 1;
        if let Some(suffixes) = outcome? {
            starters.insert(format!("{}{starter}", options.prefix), suffixes);
            progress.accepted += 1;
        }
        sink.emit(progress.clone());
    }

    let space = IdentifierSpace::new(options.starter_length(), starters)?;
    ephid_info!(
        "Generated identifier space: {} of {} starters, {} identifiers",
        space.len(),
        total,
        space.identifier_count()
    );
    Ok(space)
}

/// Generation entry point: cache first, then the model's tokenizer.
pub struct Generator {
    provider: Arc<dyn TokenizerProvider>,
    cache: Option<Arc<dyn SpaceCache>>,
}

impl Generator {
    pub fn new(provider: Arc<dyn TokenizerProvider>) -> Self {
        Self {
            provider,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn SpaceCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn generate(
        &self,
        model_id: &str,
        options: &GenerateOptions,
    ) -> Result<IdentifierSpace, GenerateError> {
        self.generate_with_progress(model_id, options, &NoProgress).await
    }

    pub async fn generate_with_progress(
        &self,
        model_id: &str,
        options: &GenerateOptions,
        sink: &dyn ProgressSink,
    ) -> Result<IdentifierSpace, GenerateError> {
        let cache = self.cache.as_deref().filter(|_| options.cache);
        let key = cache_key(model_id, options);

        if let Some(cache) = cache {
            sink.emit(GenerationProgress::stage(Stage::CacheLookup));
            if let Some(space) = load_space(cache, &key, model_id, options) {
                ephid_info!(
                    "Loaded identifier space for {} from cache ({} starters)",
                    model_id,
                    space.len()
                );
                sink.emit(done(&space));
                return Ok(space);
            }
        }

        sink.emit(GenerationProgress::stage(Stage::LoadingTokenizer));
        let tokenizer = self.provider.load(model_id).await?;
        let space = generate_space(tokenizer.as_ref(), options, sink).await?;

        if let Some(cache) = cache {
            store_space(cache, &key, model_id, options, &space);
        }
        sink.emit(done(&space));
        Ok(space)
    }

    /// Generates (or loads) the space for `model_id` and builds an allocator.
    ///
    /// An empty space surfaces as [`AllocError::EmptySpace`].
    pub async fn allocator(
        &self,
        model_id: &str,
        options: &GenerateOptions,
    ) -> Result<EphemeralIds, GenerateError> {
        let space = self.generate(model_id, options).await?;
        Ok(EphemeralIds::new(space)?)
    }
}

fn done(space: &IdentifierSpace) -> GenerationProgress {
    GenerationProgress {
        stage: Stage::Done,
        probed: 0,
        total: 0,
        accepted: space.len(),
    }
}
