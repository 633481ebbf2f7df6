//! Ephemeral id core: validated identifier spaces and the allocator that
//! draws unique ids from them.
mod allocator;
mod error;
mod space;

pub use allocator::EphemeralIds;
pub use error::{AllocError, SpaceError};
pub use space::{IdentifierSpace, SUFFIX_LENGTH};
