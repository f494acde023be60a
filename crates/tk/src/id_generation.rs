//! Hash-based ticket ID generation.
//!
//! IDs have the form `{prefix}-{hash}`, e.g. `nw-5c46`. The hash is the
//! SHA-256 of the title, the current time and a nonce, base36-encoded to
//! four characters. The prefix defaults to an abbreviation of the project
//! directory name (see [`prefix_from_dir_name`]).
//!
//! # Example
//!
//! ```
//! use tk::id_generation::{IdGenerator, IdGeneratorConfig};
//!
//! let mut generator = IdGenerator::new(IdGeneratorConfig {
//!     prefix: "nw".to_string(),
//! });
//! generator.register_id("nw-0000".to_string());
//!
//! let id = generator.generate("Write the parser").unwrap();
//! assert!(id.starts_with("nw-"));
//! assert_ne!(id, "nw-0000");
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;

/// Number of hash characters in a generated ID.
pub const ID_HASH_LENGTH: usize = 4;

/// Prefix used when no directory name is available.
pub const FALLBACK_PREFIX: &str = "tk";

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Every candidate collided with a known ID
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of candidates tried.
        attempts: u32,
    },
}

/// Configuration for ID generation
#[derive(Debug, Clone)]
pub struct IdGeneratorConfig {
    /// Prefix for all IDs (e.g., "nw")
    pub prefix: String,
}

/// Hash-based ID generator with collision detection against known IDs.
#[derive(Debug)]
pub struct IdGenerator {
    config: IdGeneratorConfig,
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a new ID generator with the given configuration
    #[must_use]
    pub fn new(config: IdGeneratorConfig) -> Self {
        Self {
            config,
            existing_ids: HashSet::new(),
        }
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: String) {
        self.existing_ids.insert(id);
    }

    /// Generate a new ID not yet registered with this generator.
    ///
    /// The returned ID is registered, so consecutive calls never repeat.
    ///
    /// # Errors
    ///
    /// Returns [`IdGenerationError::CollisionExhausted`] if every nonce and
    /// the one-character-longer fallback collide.
    pub fn generate(&mut self, title: &str) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        for nonce in 0..MAX_NONCE {
            let id = self.hash_id(title, timestamp, nonce, ID_HASH_LENGTH);
            if self.existing_ids.insert(id.clone()) {
                if nonce > 0 {
                    debug!(nonce, %id, "generated unique ID after collision retries");
                }
                return Ok(id);
            }
        }

        warn!(
            max_nonce = MAX_NONCE,
            "All nonces exhausted, increasing ID length to {}",
            ID_HASH_LENGTH + 1
        );
        let longer = self.hash_id(title, timestamp, 0, ID_HASH_LENGTH + 1);
        if self.existing_ids.insert(longer.clone()) {
            return Ok(longer);
        }

        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_NONCE + 1,
        })
    }

    fn hash_id(&self, title: &str, timestamp: i64, nonce: u32, length: usize) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{title}|{timestamp}|{nonce}").as_bytes());
        let hash_bytes = hasher.finalize();

        let hash_str = encode_base36(&hash_bytes[..8], length);
        format!("{}-{}", self.config.prefix, hash_str)
    }
}

/// Derive an ID prefix from a project directory name.
///
/// Takes the first letter or digit of each `-`/`_` separated segment, so
/// `my-cool_project` becomes `mcp`. If no segment has one, the first three
/// characters of the name are used.
///
/// ```
/// use tk::id_generation::prefix_from_dir_name;
///
/// assert_eq!(prefix_from_dir_name("new-world"), "nw");
/// assert_eq!(prefix_from_dir_name("ticket"), "t");
/// ```
#[must_use]
pub fn prefix_from_dir_name(name: &str) -> String {
    let mut prefix: String = name
        .split(['-', '_'])
        .filter_map(|segment| segment.chars().find(|c| c.is_alphanumeric()))
        .collect();

    if prefix.is_empty() {
        prefix = name.chars().take(3).collect();
    }

    if prefix.is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        prefix.to_lowercase()
    }
}

/// Encode the leading bytes of a hash as a base36 string of `length` chars.
///
/// The bytes are folded into a `u64` with wrapping arithmetic; callers pass
/// at most eight bytes.
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut n: u64 = 0;
    for &byte in bytes {
        n = n.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut result = Vec::with_capacity(length);
    while result.len() < length {
        let remainder = usize::try_from(n % 36).unwrap_or_default();
        result.push(char::from(BASE36_CHARS[remainder]));
        n /= 36;
    }

    result.into_iter().rev().collect()
}
