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

/// Precondition and infrastructure failures. These are distinct from
/// user-input-soft errors (missing target, unknown lobby command), which are
/// delivered as an `error` payload and never surface here — see the
/// dispatcher's handler tables.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no character selected")]
    NoCharacter,
    #[error("'{0}' has no effect here")]
    InvalidAction(String),
    #[error("not authorized")]
    Unauthorized,
    #[error("rate limited")]
    RateLimited,
    #[error("internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    /// The text shown to the client. Infrastructure detail is never leaked
    /// (§7 propagation policy); only the generic `Internal` case is
    /// stripped of its argument here.
    pub fn client_message(&self) -> &'static str {
        match self {
            DispatchError::NoCharacter => "No character selected.",
            DispatchError::InvalidAction(_) => "That doesn't do anything here.",
            DispatchError::Unauthorized => "You are not authorized to do that.",
            DispatchError::RateLimited => "You're doing that too fast.",
            DispatchError::Internal(_) => "Something went wrong. Please try again.",
        }
    }
}
