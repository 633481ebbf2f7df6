use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::cache::CACHE_VERSION;
use crate::catalog::catalog_fingerprint;
use crate::GenerateOptions;

/// Deterministic, filesystem-safe cache key for a generated space:
/// `model-{model}[--prefix-{prefix}][--long-true]--v{version}-{digest}.json`.
///
/// The digest covers the raw model id, prefix, starter mode and catalog
/// fingerprint, so two configurations that sanitize to the same text
/// still get different keys.
pub fn cache_key(model_id: &str, options: &GenerateOptions) -> String {
    let digest = short_hash(&format!(
        "{model_id}\0{prefix}\0{long}\0{catalog}",
        prefix = options.prefix,
        long = options.long,
        catalog = catalog_fingerprint(),
    ));

    let mut parts = vec![format!("model-{}", sanitize(&model_id.replace('/', "--")))];
    if !options.prefix.is_empty() {
        parts.push(format!("prefix-{}", sanitize(&options.prefix)));
    }
    if options.long {
        parts.push("long-true".to_string());
    }
    parts.push(format!("v{CACHE_VERSION}-{digest}"));
    format!("{}.json", parts.join("--"))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// First 4 bytes of the SHA-256 digest, as hex.
pub(crate) fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
