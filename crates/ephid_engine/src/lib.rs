//! Ephemeral id engine: probes a tokenizer for context-invariant identifier
//! spaces, caches them and serves allocators built from them.
mod cache;
mod catalog;
mod engine;
mod generate;
mod key;
mod persist;
mod probe;
mod tokenizer;
mod types;

pub use cache::{DirSpaceCache, MemorySpaceCache, SpaceCache, CACHE_VERSION};
pub use catalog::{
    candidate_starters, candidate_suffixes, catalog_fingerprint, is_banned, Context,
    ALT_CONTEXTS, ALT_FRAMING, ANCHOR_TEXT, BASE_CONTEXTS, BASE_FRAMING, BANNED_WORDS,
};
pub use engine::GenerationHandle;
pub use generate::{
    generate_space, generate_space_from, GenerateError, GenerateOptions, Generator, NoProgress,
    ProgressSink,
};
pub use key::cache_key;
pub use persist::{CacheDir, PersistError};
pub use probe::Prober;
pub use tokenizer::{FnTokenizer, TokenId, TokenizeError, Tokenizer, TokenizerProvider};
pub use types::{GenerationEvent, GenerationProgress, JobId, Stage};

pub use ephid_core::{AllocError, EphemeralIds, IdentifierSpace, SpaceError, SUFFIX_LENGTH};
