//! Hash-based ID generation for dependency edges.
//!
//! Edge ids have the form `{prefix}-{hash}` (e.g. `dep-k3v9x2ma`), where the
//! hash is the base36 encoding of a SHA-256 digest over the edge's
//! endpoints, type, creation time and a nonce.
//!
//! The generator itself is stateless. The edge store is the authority on
//! which ids are taken, so callers walk [`EdgeIdGenerator::candidates`] and
//! keep the first id the store does not know:
//!
//! 1. `MAX_NONCE` candidates at the default length
//! 2. then one candidate per extra character, up to [`MAX_ID_LENGTH`]
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use tether::domain::{DependencyType, IssueId};
//! use tether::id_generation::{EdgeIdGenerator, EdgeIdSeed};
//!
//! let generator = EdgeIdGenerator::new("dep");
//! let source = IssueId::new("iss-1");
//! let target = IssueId::new("iss-2");
//! let seed = EdgeIdSeed {
//!     source: &source,
//!     target: &target,
//!     dep_type: DependencyType::Blocks,
//!     created_at: Utc::now(),
//! };
//!
//! let id = generator.candidates(&seed).next().unwrap();
//! assert!(id.as_str().starts_with("dep-"));
//! ```

use crate::domain::{DependencyType, EdgeId, IssueId};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Default prefix for edge ids.
pub const DEFAULT_EDGE_PREFIX: &str = "dep";

/// Hash length used before any collision.
pub const DEFAULT_ID_LENGTH: usize = 8;

/// 36^12 is the largest power of 36 below 2^64.
pub const MAX_ID_LENGTH: usize = 12;

/// Candidates tried at the default length before growing the id.
pub const MAX_NONCE: u32 = 16;

/// Inputs hashed into an edge id.
#[derive(Debug, Clone, Copy)]
pub struct EdgeIdSeed<'a> {
    /// Source issue of the new edge
    pub source: &'a IssueId,
    /// Target issue of the new edge
    pub target: &'a IssueId,
    /// Type of the new edge
    pub dep_type: DependencyType,
    /// Creation timestamp of the new edge
    pub created_at: DateTime<Utc>,
}

/// Produces candidate edge ids.
#[derive(Debug, Clone)]
pub struct EdgeIdGenerator {
    prefix: String,
}

impl EdgeIdGenerator {
    /// Create a generator emitting ids with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix put in front of every id.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// All candidate ids for `seed`, in the order they should be tried.
    pub fn candidates<'a>(&'a self, seed: &'a EdgeIdSeed<'a>) -> impl Iterator<Item = EdgeId> + 'a {
        let base = (0..MAX_NONCE).map(|nonce| (nonce, DEFAULT_ID_LENGTH));
        let longer = (DEFAULT_ID_LENGTH + 1..=MAX_ID_LENGTH)
            .zip(MAX_NONCE..)
            .map(|(length, nonce)| (nonce, length));

        base.chain(longer)
            .map(move |(nonce, length)| self.hash_id(seed, nonce, length))
    }

    fn hash_id(&self, seed: &EdgeIdSeed<'_>, nonce: u32, length: usize) -> EdgeId {
        let content = format!(
            "{}|{}|{}|{}|{}",
            seed.source,
            seed.target,
            seed.dep_type,
            seed.created_at.timestamp_nanos_opt().unwrap_or_default(),
            nonce
        );

        let digest = Sha256::digest(content.as_bytes());
        let mut prefix_bytes = [0_u8; 8];
        prefix_bytes.copy_from_slice(&digest[..8]);

        EdgeId::new(format!(
            "{}-{}",
            self.prefix,
            encode_base36(u64::from_be_bytes(prefix_bytes), length)
        ))
    }
}

impl Default for EdgeIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_PREFIX)
    }
}

/// Encode `num` as exactly `length` base36 digits (left-padded with zeros,
/// high digits dropped if `num` needs more).
fn encode_base36(mut num: u64, length: usize) -> String {
    let mut digits = vec![b'0'; length];
    for slot in digits.iter_mut().rev() {
        *slot = BASE36_CHARS[(num % 36) as usize];
        num /= 36;
    }
    digits.into_iter().map(char::from).collect()
}
