use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::SpaceError;

/// Byte length of every suffix: one ASCII digit followed by one lowercase letter.
pub const SUFFIX_LENGTH: usize = 2;

/// Validated `starter -> suffixes` map produced by generation.
///
/// Every key has exactly `starter_length` bytes (any identifier prefix is
/// part of the key), every suffix list is non-empty and every suffix is a
/// digit followed by a lowercase letter. Starters are kept in lexicographic
/// order so equal spaces compare and serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSpace", into = "RawSpace")]
pub struct IdentifierSpace {
    starter_length: usize,
    entries: Vec<(String, Vec<String>)>,
}

#[derive(Serialize, Deserialize)]
struct RawSpace {
    starter_length: usize,
    starters: BTreeMap<String, Vec<String>>,
}

impl IdentifierSpace {
    pub fn new(
        starter_length: usize,
        starters: BTreeMap<String, Vec<String>>,
    ) -> Result<Self, SpaceError> {
        for (starter, suffixes) in &starters {
            if starter.len() != starter_length {
                return Err(SpaceError::StarterLength {
                    starter: starter.clone(),
                    expected: starter_length,
                    actual: starter.len(),
                });
            }
            if suffixes.is_empty() {
                return Err(SpaceError::NoSuffixes(starter.clone()));
            }
            if let Some(bad) = suffixes.iter().find(|s| !is_valid_suffix(s)) {
                return Err(SpaceError::MalformedSuffix {
                    starter: starter.clone(),
                    suffix: bad.clone(),
                });
            }
        }

        Ok(Self {
            starter_length,
            entries: starters.into_iter().collect(),
        })
    }

    /// A space with no starters. Valid, but no allocator can be built from it.
    pub fn empty(starter_length: usize) -> Self {
        Self {
            starter_length,
            entries: Vec::new(),
        }
    }

    pub fn starter_length(&self) -> usize {
        self.starter_length
    }

    pub fn identifier_length(&self) -> usize {
        self.starter_length + SUFFIX_LENGTH
    }

    /// Number of starters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of distinct identifiers in the space.
    pub fn identifier_count(&self) -> usize {
        self.entries.iter().map(|(_, suffixes)| suffixes.len()).sum()
    }

    pub fn starters(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(starter, _)| starter.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(starter, suffixes)| (starter.as_str(), suffixes.as_slice()))
    }

    pub fn suffixes(&self, starter: &str) -> Option<&[String]> {
        self.entries
            .binary_search_by(|(key, _)| key.as_str().cmp(starter))
            .ok()
            .map(|index| self.entries[index].1.as_slice())
    }

    /// Leading starter of `identifier`, if it has the identifier shape.
    pub fn starter_of<'a>(&self, identifier: &'a str) -> Option<&'a str> {
        if identifier.len() != self.identifier_length() {
            return None;
        }
        identifier.get(..self.starter_length)
    }

    /// Whether `identifier` is one of the `starter + suffix` pairs of this space.
    pub fn contains(&self, identifier: &str) -> bool {
        let Some(starter) = self.starter_of(identifier) else {
            return false;
        };
        let suffix = &identifier[self.starter_length..];
        self.suffixes(starter)
            .is_some_and(|suffixes| suffixes.iter().any(|s| s == suffix))
    }

    pub(crate) fn entry(&self, index: usize) -> (&str, &[String]) {
        let (starter, suffixes) = &self.entries[index];
        (starter, suffixes)
    }
}

impl TryFrom<RawSpace> for IdentifierSpace {
    type Error = SpaceError;

    fn try_from(raw: RawSpace) -> Result<Self, Self::Error> {
        Self::new(raw.starter_length, raw.starters)
    }
}

impl From<IdentifierSpace> for RawSpace {
    fn from(space: IdentifierSpace) -> Self {
        Self {
            starter_length: space.starter_length,
            starters: space.entries.into_iter().collect(),
        }
    }
}

fn is_valid_suffix(suffix: &str) -> bool {
    let bytes = suffix.as_bytes();
    bytes.len() == SUFFIX_LENGTH && bytes[0].is_ascii_digit() && bytes[1].is_ascii_lowercase()
}
