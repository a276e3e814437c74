//! Content-addressed bundle cache
//!
//! Bundled artifacts are stored as flat files keyed by a truncated SHA-256
//! of the canonical URL. Entries are immutable once written.
//!
//! # Cache Flow
//!
//! | Step | Result |
//! |------|--------|
//! | `exists` false | Build, then `write` |
//! | `exists` true | `read` and serve |
//! | Stat error | Treated as a miss, entry is rebuilt |

pub mod key;
pub mod store;

pub use key::{etag, CacheKey};
pub use store::BundleCache;
