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

//! Pure functions deriving time-of-day and season from accumulated game
//! time. No I/O, no randomness: given the same `game_time` these always
//! agree, independent of when the ticker that produced `game_time` ran.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Dawn,
    Day,
    Dusk,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

/// Divides `game_time` into days and seasons at configurable lengths. The
/// lobby and demo binary use [`WorldClock::default`]; a world with an
/// unusually long year can construct its own.
#[derive(Debug, Clone, Copy)]
pub struct WorldClock {
    pub day_length: Duration,
    pub season_length: Duration,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self {
            day_length: Duration::from_secs(24 * 60 * 60),
            season_length: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

impl WorldClock {
    pub fn time_of_day(&self, game_time: Duration) -> TimeOfDay {
        let day_secs = self.day_length.as_secs_f64().max(1.0);
        let frac = (game_time.as_secs_f64() % day_secs) / day_secs;
        match frac {
            f if f < 0.125 => TimeOfDay::Dawn,
            f if f < 0.5 => TimeOfDay::Day,
            f if f < 0.625 => TimeOfDay::Dusk,
            _ => TimeOfDay::Night,
        }
    }

    pub fn season(&self, game_time: Duration) -> Season {
        let season_secs = self.season_length.as_secs_f64().max(1.0);
        let index = (game_time.as_secs_f64() / season_secs) as u64 % 4;
        match index {
            0 => Season::Spring,
            1 => Season::Summer,
            2 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}
