use core::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

use colony_core::RoomName;

use crate::SimError;

/// Tiles per room side.
pub const ROOM_SIZE: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn range(self, other: Tile) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }

    pub fn is_edge(self) -> bool {
        self.x == 0 || self.y == 0 || self.x == ROOM_SIZE - 1 || self.y == ROOM_SIZE - 1
    }
}

#[derive(Debug)]
struct OpenNode {
    f: u32,
    g: u32,
    tile: Tile,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (u32, u32, Tile, u64) {
        (self.f, self.g, self.tile, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key().cmp(&self.key())
    }
}

/// Walkability of one room's tiles.
#[derive(Debug, Clone)]
pub struct RoomGrid {
    blocked: Vec<bool>,
}

impl Default for RoomGrid {
    fn default() -> Self {
        Self {
            blocked: vec![false; (ROOM_SIZE * ROOM_SIZE) as usize],
        }
    }
}

impl RoomGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_blocked(&mut self, tile: Tile, blocked: bool) {
        if let Some(idx) = Self::idx(tile) {
            self.blocked[idx] = blocked;
        }
    }

    pub fn is_blocked(&self, tile: Tile) -> bool {
        Self::idx(tile).map(|idx| self.blocked[idx]).unwrap_or(true)
    }

    fn idx(tile: Tile) -> Option<usize> {
        let inside = tile.x >= 0 && tile.y >= 0 && tile.x < ROOM_SIZE && tile.y < ROOM_SIZE;
        inside.then(|| (tile.y * ROOM_SIZE + tile.x) as usize)
    }

    fn tile_from_idx(idx: usize) -> Tile {
        let idx = idx as i32;
        Tile::new(idx % ROOM_SIZE, idx / ROOM_SIZE)
    }

    fn neighbors(tile: Tile) -> [Tile; 8] {
        // Fixed order for determinism: N, NE, E, SE, S, SW, W, NW.
        [
            Tile::new(tile.x, tile.y - 1),
            Tile::new(tile.x + 1, tile.y - 1),
            Tile::new(tile.x + 1, tile.y),
            Tile::new(tile.x + 1, tile.y + 1),
            Tile::new(tile.x, tile.y + 1),
            Tile::new(tile.x - 1, tile.y + 1),
            Tile::new(tile.x - 1, tile.y),
            Tile::new(tile.x - 1, tile.y - 1),
        ]
    }

    /// Shortest walk from `start` to any tile accepted by `is_goal`.
    ///
    /// `heuristic` must not overestimate the remaining steps. The returned
    /// path includes both endpoints.
    pub fn find_path<G, H>(&self, start: Tile, mut is_goal: G, heuristic: H) -> Option<Vec<Tile>>
    where
        G: FnMut(Tile) -> bool,
        H: Fn(Tile) -> u32,
    {
        let start_idx = Self::idx(start)?;
        if is_goal(start) {
            return Some(vec![start]);
        }

        let len = (ROOM_SIZE * ROOM_SIZE) as usize;
        let mut g_score = vec![u32::MAX; len];
        let mut came_from: Vec<Option<usize>> = vec![None; len];
        let mut open = BinaryHeap::<OpenNode>::new();
        let mut tie: u64 = 0;

        g_score[start_idx] = 0;
        open.push(OpenNode {
            f: heuristic(start),
            g: 0,
            tile: start,
            tie,
        });

        while let Some(node) = open.pop() {
            let node_idx = Self::idx(node.tile)?;
            if node.g != g_score[node_idx] {
                // Stale heap entry.
                continue;
            }
            if is_goal(node.tile) {
                let mut path = vec![node.tile];
                let mut current = node_idx;
                while let Some(prev) = came_from[current] {
                    current = prev;
                    path.push(Self::tile_from_idx(current));
                }
                path.reverse();
                return Some(path);
            }

            for next in Self::neighbors(node.tile) {
                let Some(next_idx) = Self::idx(next) else {
                    continue;
                };
                if self.blocked[next_idx] {
                    continue;
                }
                let tentative = node.g.saturating_add(1);
                if tentative >= g_score[next_idx] {
                    continue;
                }
                came_from[next_idx] = Some(node_idx);
                g_score[next_idx] = tentative;
                tie += 1;
                open.push(OpenNode {
                    f: tentative.saturating_add(heuristic(next)),
                    g: tentative,
                    tile: next,
                    tie,
                });
            }
        }

        None
    }

    /// Next tile on the way to within `range` of `goal`; `None` when already
    /// there or unreachable.
    pub fn next_step(&self, start: Tile, goal: Tile, range: u32) -> Option<Tile> {
        let path = self.find_path(
            start,
            |t| t.range(goal) <= range,
            |t| t.range(goal).saturating_sub(range),
        )?;
        path.get(1).copied()
    }
}

/// World-map coordinates of a room name such as `W3N5` or `E0S12`.
///
/// West and north halves count down from -1 so neighbouring names stay
/// adjacent across the zero lines.
pub fn room_coords(name: &str) -> Result<(i32, i32), SimError> {
    let invalid = || SimError::InvalidRoomName(name.to_string());
    let (x, rest) = parse_axis(name, 'W', 'E').ok_or_else(invalid)?;
    let (y, rest) = parse_axis(rest, 'N', 'S').ok_or_else(invalid)?;
    if !rest.is_empty() {
        return Err(invalid());
    }
    Ok((x, y))
}

fn parse_axis(s: &str, neg: char, pos: char) -> Option<(i32, &str)> {
    let mut chars = s.chars();
    let dir = chars.next()?;
    let rest = chars.as_str();
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let n: i32 = rest[..end].parse().ok()?;
    let value = match dir {
        d if d == neg => -n - 1,
        d if d == pos => n,
        _ => return None,
    };
    Some((value, &rest[end..]))
}

/// Room adjacency over the rooms known to the simulation.
#[derive(Debug, Clone, Default)]
pub struct RoomMap {
    coords: BTreeMap<RoomName, (i32, i32)>,
}

impl RoomMap {
    pub fn insert(&mut self, room: RoomName) -> Result<(), SimError> {
        let coords = room_coords(room.as_str())?;
        self.coords.insert(room, coords);
        Ok(())
    }

    pub fn contains(&self, room: &RoomName) -> bool {
        self.coords.contains_key(room)
    }

    fn neighbours(&self, room: &RoomName) -> Vec<&RoomName> {
        let Some(&(x, y)) = self.coords.get(room) else {
            return Vec::new();
        };
        self.coords
            .iter()
            .filter(|(_, coords)| (coords.0 - x).abs() + (coords.1 - y).abs() == 1)
            .map(|(name, _)| name)
            .collect()
    }

    /// Rooms along the shortest route, excluding `from`.
    pub fn route(&self, from: &RoomName, to: &RoomName) -> Option<Vec<RoomName>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        let mut came_from: BTreeMap<&RoomName, &RoomName> = BTreeMap::new();
        let mut queue = VecDeque::from([from]);
        while let Some(room) = queue.pop_front() {
            if room == to {
                let mut route = Vec::new();
                let mut current = room;
                while current != from {
                    route.push(current.clone());
                    current = *came_from.get(current)?;
                }
                route.reverse();
                return Some(route);
            }
            for next in self.neighbours(room) {
                if next != from && !came_from.contains_key(next) {
                    came_from.insert(next, room);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// Which edge of `from` leads into the adjacent room `to`.
    pub fn exit_towards(&self, from: &RoomName, to: &RoomName) -> Option<Exit> {
        let (fx, fy) = *self.coords.get(from)?;
        let (tx, ty) = *self.coords.get(to)?;
        match (tx - fx, ty - fy) {
            (0, -1) => Some(Exit::Top),
            (1, 0) => Some(Exit::Right),
            (0, 1) => Some(Exit::Bottom),
            (-1, 0) => Some(Exit::Left),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Top,
    Right,
    Bottom,
    Left,
}

impl Exit {
    pub fn contains(self, tile: Tile) -> bool {
        match self {
            Exit::Top => tile.y == 0,
            Exit::Right => tile.x == ROOM_SIZE - 1,
            Exit::Bottom => tile.y == ROOM_SIZE - 1,
            Exit::Left => tile.x == 0,
        }
    }

    /// Steps left before standing on this edge.
    pub fn steps_from(self, tile: Tile) -> u32 {
        let steps = match self {
            Exit::Top => tile.y,
            Exit::Right => ROOM_SIZE - 1 - tile.x,
            Exit::Bottom => ROOM_SIZE - 1 - tile.y,
            Exit::Left => tile.x,
        };
        steps.max(0) as u32
    }

    /// Where an agent leaving through this edge arrives in the next room.
    pub fn arrival(self, tile: Tile) -> Tile {
        match self {
            Exit::Top => Tile::new(tile.x, ROOM_SIZE - 1),
            Exit::Right => Tile::new(0, tile.y),
            Exit::Bottom => Tile::new(tile.x, 0),
            Exit::Left => Tile::new(ROOM_SIZE - 1, tile.y),
        }
    }
}
