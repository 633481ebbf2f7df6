use std::sync::Arc;

use thiserror::Error;

pub type TokenId = u32;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("failed to load tokenizer for {model_id}: {message}")]
    Load { model_id: String, message: String },
    #[error("failed to tokenize {text:?}: {message}")]
    Encode { text: String, message: String },
}

/// Text to token ids for one model, without special or control tokens.
///
/// Implementations must be deterministic: the same text always yields the
/// same ids.
#[async_trait::async_trait]
pub trait Tokenizer: Send + Sync {
    async fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, TokenizeError>;
}

/// Loads the tokenizer of a model. Only consulted on a cache miss.
#[async_trait::async_trait]
pub trait TokenizerProvider: Send + Sync {
    async fn load(&self, model_id: &str) -> Result<Arc<dyn Tokenizer>, TokenizeError>;
}

/// Adapts an infallible, synchronous tokenize function.
#[derive(Debug, Clone, Copy)]
pub struct FnTokenizer<F>(pub F);

#[async_trait::async_trait]
impl<F> Tokenizer for FnTokenizer<F>
where
    F: Fn(&str) -> Vec<TokenId> + Send + Sync,
{
    async fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, TokenizeError> {
        Ok((self.0)(text))
    }
}
