// Copyright (C) 2025 Thousand Worlds contributors. This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! 128-bit identifiers used throughout the core. Each wraps a [`Uuid`] so that
//! a character id can never be accidentally compared to a world id even
//! though both are plain UUIDs on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn new_random() -> Self {
                Self(Uuid::new_v4())
            }

            /// The nil id, used to denote "no character selected yet".
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Uuid's Display already renders the lowercase canonical form.
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::nil()
            }
        }
    };
}

uuid_id!(CharacterId, "Immutable identity of a character.");
uuid_id!(WorldId, "Identity of a world (including the distinguished lobby world).");
uuid_id!(SessionId, "Identity of one live client session.");

/// The lobby world is a distinguished, well-known world id: the all-zero
/// UUID. Sessions land here before a character has been created or entered.
pub const LOBBY_WORLD_ID: WorldId = WorldId::nil();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_string() {
        let id = CharacterId::new_random();
        let s = id.to_string();
        let parsed: CharacterId = s.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn nil_is_distinguished() {
        assert!(CharacterId::nil().is_nil());
        assert_ne!(CharacterId::new_random(), CharacterId::nil());
    }

    #[test]
    fn lobby_world_is_nil_world_id() {
        assert_eq!(LOBBY_WORLD_ID, WorldId::nil());
    }
}
