//! API key chain.
//!
//! The API hands out four keys per account. Each key starts with a 5-char
//! prefix telling which slot it belongs to:
//!
//! | prefix  | slot                   |
//! |---------|------------------------|
//! | `pprod` | public key, live mode  |
//! | `ptest` | public key, test mode  |
//! | `sprod` | secret key, live mode  |
//! | `stest` | secret key, test mode  |

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One of the four fixed key slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySlot {
    PublicLive,
    PublicTest,
    SecretLive,
    SecretTest,
}

impl KeySlot {
    /// All slots, in prefix order.
    pub const ALL: [KeySlot; 4] = [
        KeySlot::PublicLive,
        KeySlot::PublicTest,
        KeySlot::SecretLive,
        KeySlot::SecretTest,
    ];

    /// The 5-char prefix identifying keys for this slot.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            KeySlot::PublicLive => "pprod",
            KeySlot::PublicTest => "ptest",
            KeySlot::SecretLive => "sprod",
            KeySlot::SecretTest => "stest",
        }
    }

    /// Finds the slot a key belongs to, from its prefix.
    #[must_use]
    pub fn for_key(key: &str) -> Option<Self> {
        let prefix = key.get(..5)?;
        Self::ALL.into_iter().find(|slot| slot.prefix() == prefix)
    }
}

/// Holds at most one key per [`KeySlot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pprod: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ptest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sprod: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stest: Option<String>,
}

impl KeyChain {
    /// Creates an empty key chain (all four slots unset).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a key in the slot selected by its prefix.
    ///
    /// Returns `Error::InvalidKey` when the prefix matches no slot; the
    /// chain is left untouched in that case.
    pub fn insert(&mut self, key: &str) -> Result<KeySlot> {
        let slot = KeySlot::for_key(key).ok_or_else(|| Error::InvalidKey(key.to_string()))?;
        *self.slot_mut(slot) = Some(key.to_string());
        Ok(slot)
    }

    /// Stores several keys at once.
    ///
    /// Keys are validated one by one; the first invalid key aborts the call
    /// and leaves the keys before it applied.
    pub fn extend<I, S>(&mut self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            self.insert(key.as_ref())?;
        }
        Ok(())
    }

    /// Returns the key stored in a slot.
    #[must_use]
    pub fn get(&self, slot: KeySlot) -> Option<&str> {
        match slot {
            KeySlot::PublicLive => self.pprod.as_deref(),
            KeySlot::PublicTest => self.ptest.as_deref(),
            KeySlot::SecretLive => self.sprod.as_deref(),
            KeySlot::SecretTest => self.stest.as_deref(),
        }
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns true when no slot holds a key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        KeySlot::ALL.into_iter().all(|slot| self.get(slot).is_none())
    }

    fn slot_mut(&mut self, slot: KeySlot) -> &mut Option<String> {
        match slot {
            KeySlot::PublicLive => &mut self.pprod,
            KeySlot::PublicTest => &mut self.ptest,
            KeySlot::SecretLive => &mut self.sprod,
            KeySlot::SecretTest => &mut self.stest,
        }
    }
}
