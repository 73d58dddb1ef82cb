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

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Snapshot of everything a client needs to re-render its own character
/// after a mutating command. Delivered to exactly one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub hp: i32,
    pub max_hp: i32,
    pub stamina: i32,
    pub max_stamina: i32,
    pub focus: i32,
    pub max_focus: i32,
    pub position: Position,
    pub inventory: Vec<String>,
    pub equipment: Option<String>,
    pub visible_tiles: Vec<String>,
}

impl StateUpdate {
    pub fn at(position: Position) -> Self {
        Self {
            hp: 100,
            max_hp: 100,
            stamina: 100,
            max_stamina: 100,
            focus: 100,
            max_focus: 100,
            position,
            inventory: Vec::new(),
            equipment: None,
            visible_tiles: Vec::new(),
        }
    }
}
