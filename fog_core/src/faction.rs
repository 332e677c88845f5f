//! Faction identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for a faction tracked by the fog engine.
///
/// Ids are dense small integers; the engine fixes its faction capacity at
/// construction and range-checks every id against it. An id at or above the
/// configured capacity is never folded into a valid slot: stamps report it
/// as an error and queries treat it as seeing nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactionId(pub u32);

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default faction capacity when the configuration does not override it.
pub const DEFAULT_MAX_FACTIONS: u32 = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_bare_index() {
        assert_eq!(FactionId(3).to_string(), "3");
    }
}
