use ephid_logging::ephid_trace;

use crate::catalog::{
    candidate_suffixes, Context, ALT_CONTEXTS, ALT_FRAMING, ANCHOR_TEXT, BASE_CONTEXTS,
    BASE_FRAMING,
};
use crate::{GenerateError, TokenId, TokenizeError, Tokenizer};

/// Context-invariance checks for one tokenizer and identifier prefix.
///
/// Construction tokenizes the anchor in the base and alt framings and fails
/// with [`GenerateError::Configuration`] when they disagree (the tokenizer
/// merges across the anchor, or the prefix is not a single token). After
/// that every rejection is a plain `false`/`None`, never an error.
pub struct Prober<'a> {
    tokenizer: &'a dyn Tokenizer,
    prefix: String,
    base_anchor: Vec<TokenId>,
    alt_anchor: Vec<TokenId>,
}

/// Starter-only tokenizations in both framings.
struct StarterTokens {
    base: Vec<TokenId>,
    alt: Vec<TokenId>,
}

impl<'a> Prober<'a> {
    pub async fn new(tokenizer: &'a dyn Tokenizer, prefix: &str) -> Result<Self, GenerateError> {
        let anchor = tokenizer.tokenize(ANCHOR_TEXT).await?;
        if anchor.is_empty() {
            return Err(GenerateError::configuration(format!(
                "anchor text {ANCHOR_TEXT:?} produced no tokens"
            )));
        }

        let base_anchor = if prefix.is_empty() {
            anchor.clone()
        } else {
            tokenizer.tokenize(&BASE_FRAMING.render(prefix, "")).await?
        };
        let alt_anchor = tokenizer.tokenize(&ALT_FRAMING.render(prefix, "")).await?;

        if !prefix.is_empty() && !extends_by(&base_anchor, &anchor, 1) {
            return Err(GenerateError::configuration(format!(
                "prefix {prefix:?} is not a single token: {anchor:?} -> {base_anchor:?}"
            )));
        }

        // With a prefix its own token sits last in the base anchor; only the
        // tokens before it must survive the alt framing unchanged.
        let shared = if prefix.is_empty() {
            base_anchor.len()
        } else {
            base_anchor.len() - 1
        };
        if alt_anchor.get(..shared) != Some(&base_anchor[..shared]) {
            return Err(GenerateError::configuration(format!(
                "base and alt framings diverge: {base_anchor:?} vs {alt_anchor:?}; \
                 prefix {prefix:?} may span several tokens \
                 or the tokenizer merges across the anchor"
            )));
        }

        Ok(Self {
            tokenizer,
            prefix: prefix.to_string(),
            base_anchor,
            alt_anchor,
        })
    }

    /// Accepted suffixes of `starter`, in candidate order, or `None` when the
    /// starter is not a single stable token or no suffix survives.
    pub async fn probe_starter(&self, starter: &str) -> Result<Option<Vec<String>>, TokenizeError> {
        let Some(tokens) = self.starter_tokens(starter).await? else {
            return Ok(None);
        };

        let mut accepted = Vec::new();
        for suffix in candidate_suffixes() {
            if self.suffix_is_stable(starter, &suffix, &tokens).await? {
                accepted.push(suffix);
            }
        }

        if accepted.is_empty() {
            ephid_trace!("Starter {starter} has no stable suffixes");
            return Ok(None);
        }
        Ok(Some(accepted))
    }

    /// Whether `starter + suffix` passes every starter, suffix and context
    /// check. Usable to re-verify an existing space against the catalog.
    pub async fn is_context_stable(
        &self,
        starter: &str,
        suffix: &str,
    ) -> Result<bool, TokenizeError> {
        match self.starter_tokens(starter).await? {
            Some(tokens) => self.suffix_is_stable(starter, suffix, &tokens).await,
            None => Ok(false),
        }
    }

    async fn starter_tokens(&self, starter: &str) -> Result<Option<StarterTokens>, TokenizeError> {
        let base = self.tokenize_in(BASE_FRAMING, starter).await?;
        if !extends_by(&base, &self.base_anchor, 1) {
            ephid_trace!(
                "Base starter mismatch for {starter}: {base:?}, anchor {:?}",
                self.base_anchor
            );
            return Ok(None);
        }

        let alt = self.tokenize_in(ALT_FRAMING, starter).await?;
        if !extends_by(&alt, &self.alt_anchor, 1) {
            ephid_trace!(
                "Alt starter mismatch for {starter}: {alt:?}, anchor {:?}",
                self.alt_anchor
            );
            return Ok(None);
        }

        // A prefix must glue to the starter the same way in both framings.
        if !self.prefix.is_empty() && base.last() != alt.last() {
            ephid_trace!("Starter token differs between framings for {starter}");
            return Ok(None);
        }

        Ok(Some(StarterTokens { base, alt }))
    }

    async fn suffix_is_stable(
        &self,
        starter: &str,
        suffix: &str,
        starter_tokens: &StarterTokens,
    ) -> Result<bool, TokenizeError> {
        let identifier = format!("{starter}{suffix}");

        let full_base = self.tokenize_in(BASE_FRAMING, &identifier).await?;
        let full_alt = self.tokenize_in(ALT_FRAMING, &identifier).await?;
        if !extends_by(&full_base, &starter_tokens.base, 2)
            || !extends_by(&full_alt, &starter_tokens.alt, 2)
        {
            ephid_trace!("Suffix does not start a token boundary for {identifier}");
            return Ok(false);
        }

        // Window: starter token followed by the two suffix tokens.
        let base_window = &full_base[starter_tokens.base.len() - 1..];
        let alt_window = &full_alt[starter_tokens.alt.len() - 1..];

        for (contexts, window) in [(BASE_CONTEXTS, base_window), (ALT_CONTEXTS, alt_window)] {
            for context in contexts {
                let tokens = self.tokenize_in(*context, &identifier).await?;
                if !contains_window(&tokens, window) {
                    ephid_trace!(
                        "Context mismatch for {identifier} in {:?}: {tokens:?}, window {window:?}",
                        context.render(&self.prefix, &identifier)
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    async fn tokenize_in(
        &self,
        context: Context,
        body: &str,
    ) -> Result<Vec<TokenId>, TokenizeError> {
        self.tokenizer.tokenize(&context.render(&self.prefix, body)).await
    }
}

/// `longer` is `base` followed by exactly `extra` more tokens.
fn extends_by(longer: &[TokenId], base: &[TokenId], extra: usize) -> bool {
    longer.len() == base.len() + extra && longer.starts_with(base)
}

fn contains_window(tokens: &[TokenId], window: &[TokenId]) -> bool {
    tokens.windows(window.len()).any(|run| run == window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extends_by_requires_exact_growth() {
        assert!(extends_by(&[1, 2, 3], &[1, 2], 1));
        assert!(!extends_by(&[1, 2, 3, 4], &[1, 2], 1));
        assert!(!extends_by(&[1, 5, 3], &[1, 2], 1));
    }

    #[test]
    fn window_must_be_contiguous() {
        assert!(contains_window(&[9, 1, 2, 3, 8], &[1, 2, 3]));
        assert!(!contains_window(&[1, 2, 9, 3], &[1, 2, 3]));
        assert!(!contains_window(&[1, 2], &[1, 2, 3]));
    }
}
