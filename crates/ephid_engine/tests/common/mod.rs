#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use ephid_engine::{
    GenerationProgress, ProgressSink, TokenId, TokenizeError, Tokenizer, TokenizerProvider,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(ephid_logging::initialize_for_tests);
}

/// Ways the stub tokenizer deviates from its plain rules.
#[derive(Debug, Clone, Default)]
pub struct Quirks {
    /// This lowercase letter always starts a new token.
    pub split_before: Option<char>,
    /// This digit swallows the letters after it.
    pub sticky_digit: Option<char>,
    /// `(letter, punct)`: the letter merges with punctuation right after it.
    pub glue: Option<(char, char)>,
    /// Letter runs starting with one of these uppercase letters split after it.
    pub split_initials: &'static str,
}

impl Quirks {
    /// Only starters beginning with `K` or `T` stay single tokens.
    pub fn few_initials() -> Self {
        Self {
            split_initials: "ABCDEFGHIJLMNOPQRSUVWXYZ",
            ..Self::default()
        }
    }
}

/// Small deterministic tokenizer: a single space attaches to the piece after
/// it, letter runs are one token, digits and punctuation are one token each.
#[derive(Debug, Default)]
pub struct RuleTokenizer {
    quirks: Quirks,
    calls: AtomicUsize,
}

impl RuleTokenizer {
    pub fn new(quirks: Quirks) -> Self {
        Self {
            quirks,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn pieces(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        let mut pieces = Vec::new();
        let mut i = 0;
        while i < n {
            let start = i;
            if chars[i] == ' ' && i + 1 < n && chars[i + 1] != ' ' {
                i += 1;
            }
            let c = chars[i];
            i += 1;
            if c.is_ascii_alphabetic() {
                let split_initial =
                    c.is_ascii_uppercase() && self.quirks.split_initials.contains(c);
                if !split_initial {
                    while i < n
                        && chars[i].is_ascii_alphabetic()
                        && Some(chars[i]) != self.quirks.split_before
                    {
                        i += 1;
                    }
                }
                if let Some((letter, punct)) = self.quirks.glue {
                    if chars[i - 1] == letter && i < n && chars[i] == punct {
                        i += 1;
                    }
                }
            } else if c.is_ascii_digit() && Some(c) == self.quirks.sticky_digit {
                while i < n && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
            }
            pieces.push(chars[start..i].iter().collect());
        }
        pieces
    }

    pub fn encode(&self, text: &str) -> Vec<TokenId> {
        self.pieces(text).iter().map(|piece| token_id(piece)).collect()
    }
}

pub fn token_id(piece: &str) -> TokenId {
    let mut hasher = DefaultHasher::new();
    piece.hash(&mut hasher);
    hasher.finish() as TokenId
}

#[async_trait::async_trait]
impl Tokenizer for RuleTokenizer {
    async fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, TokenizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.encode(text))
    }
}

/// Hands out one shared tokenizer and counts how often it was asked to.
pub struct StubProvider {
    pub tokenizer: Arc<RuleTokenizer>,
    loads: AtomicUsize,
}

impl StubProvider {
    pub fn new(quirks: Quirks) -> Self {
        Self {
            tokenizer: Arc::new(RuleTokenizer::new(quirks)),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TokenizerProvider for StubProvider {
    async fn load(&self, _model_id: &str) -> Result<Arc<dyn Tokenizer>, TokenizeError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.tokenizer.clone())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<GenerationProgress>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<GenerationProgress> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, progress: GenerationProgress) {
        self.events.lock().unwrap().push(progress);
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
