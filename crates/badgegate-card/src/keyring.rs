//! Sector key ring with a working-key cache.
//!
//! Authentication first tries the key that last worked, then the configured
//! primary key, then a static ring of well-known factory keys. Caching the
//! working key is deliberate: a multi-block operation (identity + counter)
//! should not re-walk the whole ring for every block.

/// A MIFARE sector key (key A).
pub type Key = [u8; 6];

/// Default transport key shipped on factory-fresh cards.
pub const DEFAULT_KEY: Key = [0xFF; 6];

/// Well-known factory keys tried after the primary key fails.
pub const FACTORY_KEYS: [Key; 6] = [
    [0xFF; 6],
    [0xA0; 6],
    [0x00; 6],
    [0xD3, 0xF7, 0xD3, 0xF7, 0xD3, 0xF7],
    [0xA1; 6],
    [0xB0; 6],
];

/// Ordered key candidates for sector authentication.
#[derive(Debug, Clone)]
pub struct KeyRing {
    primary: Key,
    cached: Option<Key>,
}

impl KeyRing {
    /// Create a ring with the given primary key.
    #[must_use]
    pub fn new(primary: Key) -> Self {
        KeyRing {
            primary,
            cached: None,
        }
    }

    /// Candidate keys in trial order: cached working key, primary, then the
    /// factory ring. Duplicates are skipped.
    #[must_use]
    pub fn candidates(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = Vec::with_capacity(FACTORY_KEYS.len() + 2);
        if let Some(cached) = self.cached {
            keys.push(cached);
        }
        for key in std::iter::once(self.primary).chain(FACTORY_KEYS) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Remember the key that just authenticated.
    pub fn remember(&mut self, key: Key) {
        self.cached = Some(key);
    }

    /// The currently cached working key, if any.
    #[must_use]
    pub fn cached(&self) -> Option<Key> {
        self.cached
    }
}

impl Default for KeyRing {
    fn default() -> Self {
        KeyRing::new(DEFAULT_KEY)
    }
}
