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

//! Pure movement math: direction parsing, the lobby's bounded Cartesian
//! walls, and spherical (lon/lat) movement on a world of given
//! circumference. None of this touches a repo or a socket, so it is
//! exhaustively unit-testable without async machinery.

use core_protocol::Position;

const DIAGONAL: f64 = std::f64::consts::FRAC_1_SQRT_2;

const LOBBY_X_MIN: f64 = 0.0;
const LOBBY_X_MAX: f64 = 10.0;
const LOBBY_Y_MIN: f64 = 0.0;
const LOBBY_Y_MAX: f64 = 1000.0;

/// A unit (or diagonal-unit) step plus the compass name used in refusal and
/// movement text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    pub name: &'static str,
    pub dx: f64,
    pub dy: f64,
}

const DIRECTIONS: &[(&[&str], Direction)] = &[
    (&["n", "north"], Direction { name: "north", dx: 0.0, dy: 1.0 }),
    (&["s", "south"], Direction { name: "south", dx: 0.0, dy: -1.0 }),
    (&["e", "east"], Direction { name: "east", dx: 1.0, dy: 0.0 }),
    (&["w", "west"], Direction { name: "west", dx: -1.0, dy: 0.0 }),
    (&["ne", "northeast"], Direction { name: "northeast", dx: DIAGONAL, dy: DIAGONAL }),
    (&["nw", "northwest"], Direction { name: "northwest", dx: -DIAGONAL, dy: DIAGONAL }),
    (&["se", "southeast"], Direction { name: "southeast", dx: DIAGONAL, dy: -DIAGONAL }),
    (&["sw", "southwest"], Direction { name: "southwest", dx: -DIAGONAL, dy: -DIAGONAL }),
    (&["u", "up"], Direction { name: "up", dx: 0.0, dy: 0.0 }),
    (&["d", "down"], Direction { name: "down", dx: 0.0, dy: 0.0 }),
];

/// Resolves a short or long direction token (case-insensitive). `up`/`down`
/// resolve to a zero-vector `Direction`: this core models only a 2-D
/// position, so vertical movement produces a response but no position
/// change (see `MoveOutcome::Moved` callers).
pub fn parse_direction(token: &str) -> Option<Direction> {
    let lower = token.to_ascii_lowercase();
    DIRECTIONS
        .iter()
        .find(|(names, _)| names.contains(&lower.as_str()))
        .map(|(_, dir)| *dir)
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// A wall, pole, or other hard boundary refused the move; `text` is
    /// shown to the mover and no position/repo update happens.
    Refused { text: String },
    /// The move succeeded; `note` carries an extra sentence for notable
    /// events (pole crossing, longitude wrap).
    Moved { position: Position, note: Option<String> },
}

/// Lobby movement: bounded Cartesian walls at `x ∈ [0,10], y ∈ [0,1000]`.
pub fn move_in_lobby(position: Position, direction: Direction) -> MoveOutcome {
    if direction.dx == 0.0 && direction.dy == 0.0 {
        return MoveOutcome::Moved { position, note: None };
    }

    let next = Position::new(position.x + direction.dx, position.y + direction.dy);
    if next.x < LOBBY_X_MIN || next.x > LOBBY_X_MAX || next.y < LOBBY_Y_MIN || next.y > LOBBY_Y_MAX {
        return MoveOutcome::Refused {
            text: format!("You cannot go further {}.", direction.name),
        };
    }
    MoveOutcome::Moved { position: next, note: None }
}

fn meters_per_degree_y(circumference_meters: f64) -> f64 {
    circumference_meters / 360.0
}

fn meters_per_degree_x(circumference_meters: f64, lat_degrees: f64) -> f64 {
    let cos = (lat_degrees.to_radians()).cos().abs().max(1e-4);
    (circumference_meters * cos) / 360.0
}

fn wrap_longitude(lon: f64) -> f64 {
    let mut wrapped = lon;
    while wrapped > 180.0 {
        wrapped -= 360.0;
    }
    while wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

/// Spherical movement: `position` is `(lon, lat)` in degrees. Mirrors the
/// reference algorithm exactly, including reflecting `lat` and shifting
/// `lon` by 180° on pole crossing.
pub fn move_on_sphere(position: Position, circumference_meters: f64, direction: Direction) -> MoveOutcome {
    if direction.dx == 0.0 && direction.dy == 0.0 {
        return MoveOutcome::Moved { position, note: None };
    }

    let lon = position.x;
    let lat = position.y;

    let new_lat_raw = lat + direction.dy / meters_per_degree_y(circumference_meters);
    let new_lon_raw = lon + direction.dx / meters_per_degree_x(circumference_meters, lat);

    let mut crossed_pole = false;
    let mut lat_final = new_lat_raw;
    let mut lon_final = new_lon_raw;

    if new_lat_raw.abs() > 90.0 {
        crossed_pole = true;
        lat_final = if new_lat_raw > 0.0 { 180.0 - new_lat_raw } else { -180.0 - new_lat_raw };
        lon_final += 180.0;
    }

    let wrapped_lon = wrap_longitude(lon_final);
    let did_wrap = (wrapped_lon - lon_final).abs() > f64::EPSILON;

    let note = match (crossed_pole, did_wrap) {
        (true, _) => Some("You cross the pole; the world reorients beneath you.".to_string()),
        (false, true) => Some("You cross the antimeridian.".to_string()),
        (false, false) => None,
    };

    MoveOutcome::Moved {
        position: Position::new(wrapped_lon, lat_final),
        note,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("n", "north")]
    #[test_case("north", "north")]
    #[test_case("SE", "southeast")]
    #[test_case("up", "up")]
    fn parses_known_directions(token: &str, expected_name: &str) {
        let dir = parse_direction(token).unwrap();
        assert_eq!(dir.name, expected_name);
    }

    #[test]
    fn unknown_direction_returns_none() {
        assert!(parse_direction("northnorth").is_none());
    }

    #[test]
    fn lobby_wall_refuses_northward_move_at_boundary() {
        let position = Position::new(5.0, 1000.0);
        let direction = parse_direction("n").unwrap();
        match move_in_lobby(position, direction) {
            MoveOutcome::Refused { text } => assert!(text.contains("cannot go further north")),
            other => panic!("expected refusal, got {other:?}"),
        }
    }

    #[test]
    fn lobby_allows_move_within_bounds() {
        let position = Position::new(5.0, 500.0);
        let direction = parse_direction("e").unwrap();
        match move_in_lobby(position, direction) {
            MoveOutcome::Moved { position, .. } => assert_eq!(position, Position::new(6.0, 500.0)),
            other => panic!("expected move, got {other:?}"),
        }
    }

    #[test]
    fn spherical_north_pole_crossing_matches_reference_scenario() {
        let position = Position::new(0.0, 89.99);
        let direction = parse_direction("n").unwrap();
        match move_on_sphere(position, 10_000.0, direction) {
            MoveOutcome::Moved { position, note } => {
                assert!((position.x - 180.0).abs() < 0.1);
                assert!((position.y - 89.974).abs() < 0.01);
                assert!(note.unwrap().contains("cross the pole"));
            }
            other => panic!("expected move, got {other:?}"),
        }
    }

    #[test]
    fn spherical_movement_keeps_latitude_in_range() {
        let position = Position::new(0.0, 0.0);
        let direction = parse_direction("n").unwrap();
        let MoveOutcome::Moved { position, .. } = move_on_sphere(position, 10_000.0, direction) else {
            panic!("expected move");
        };
        assert!(position.y.abs() <= 90.0);
    }

    #[test]
    fn longitude_wraps_into_canonical_range() {
        let position = Position::new(179.99, 0.0);
        let direction = parse_direction("e").unwrap();
        let MoveOutcome::Moved { position, note } = move_on_sphere(position, 10_000.0, direction) else {
            panic!("expected move");
        };
        assert!(position.x > -180.0 && position.x <= 180.0);
        assert!(note.is_some());
    }
}
