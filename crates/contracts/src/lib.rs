//! Cross-boundary contracts for the world simulation core: coordinate and
//! direction values, item and shop data, widget surfaces, and run configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

mod serde_u64_string;

/// Slot count of the base actor inventory.
pub const INVENTORY_SIZE: usize = 28;

/// Number of item slots a shop interface displays, occupied or not.
pub const SHOP_INTERFACE_SIZE: usize = 30;

/// Hard cap on a single merged item stack.
pub const MAX_ITEM_STACK: u32 = 2_147_483_647;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// An immutable map coordinate: x/y tile plus vertical level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub level: u8,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y, level: 0 }
    }

    pub fn at_level(x: i32, y: i32, level: u8) -> Self {
        Self { x, y, level }
    }

    /// A copy of this position shifted by the given deltas, same level.
    pub fn translated(&self, delta_x: i32, delta_y: i32) -> Self {
        Self {
            x: self.x + delta_x,
            y: self.y + delta_y,
            level: self.level,
        }
    }

    /// Whether `x`/`y` fall inside the box `center ± radius` on both axes,
    /// bounds inclusive. Levels are not compared.
    pub fn within_box(x: i32, y: i32, center: Position, radius: i32) -> bool {
        x <= center.x + radius
            && x >= center.x - radius
            && y <= center.y + radius
            && y >= center.y - radius
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.level)
    }
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// The eight compass directions a mobile actor can step or face, in protocol
/// index order. Index 6 (south) is the spawn-time facing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    NorthWest,
    North,
    NorthEast,
    West,
    East,
    SouthWest,
    South,
    SouthEast,
}

/// No direction; the broadcast layer renders this as "standing".
pub const DIRECTION_NONE: i32 = -1;

/// Protocol index of the default spawn facing.
pub const DIRECTION_SOUTH_INDEX: i32 = 6;

const DIRECTION_TABLE: [(Direction, i32, i32); 8] = [
    (Direction::NorthWest, -1, 1),
    (Direction::North, 0, 1),
    (Direction::NorthEast, 1, 1),
    (Direction::West, -1, 0),
    (Direction::East, 1, 0),
    (Direction::SouthWest, -1, -1),
    (Direction::South, 0, -1),
    (Direction::SouthEast, 1, -1),
];

impl Direction {
    /// Looks up a direction by its protocol index. Unknown indices resolve
    /// to `None`; callers treat that as "no movement".
    pub fn from_index(index: i32) -> Option<Direction> {
        if !(0..DIRECTION_TABLE.len() as i32).contains(&index) {
            return None;
        }
        Some(DIRECTION_TABLE[index as usize].0)
    }

    /// Looks up the direction of a single-tile step.
    pub fn from_delta(delta_x: i32, delta_y: i32) -> Option<Direction> {
        DIRECTION_TABLE
            .iter()
            .find(|(_, dx, dy)| *dx == delta_x && *dy == delta_y)
            .map(|(direction, _, _)| *direction)
    }

    pub fn index(&self) -> i32 {
        DIRECTION_TABLE
            .iter()
            .position(|(direction, _, _)| direction == self)
            .map(|position| position as i32)
            .unwrap_or(DIRECTION_NONE)
    }

    /// The coordinate delta of one step in this direction.
    pub fn delta(&self) -> (i32, i32) {
        DIRECTION_TABLE
            .iter()
            .find(|(direction, _, _)| direction == self)
            .map(|(_, dx, dy)| (*dx, *dy))
            .unwrap_or((0, 0))
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// An item instance: a definition id plus a stack amount. Non-stackable
/// items always carry amount 1 inside a container slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub item_id: u32,
    pub amount: u32,
}

impl Item {
    pub fn new(item_id: u32, amount: u32) -> Self {
        Self { item_id, amount }
    }

    pub fn single(item_id: u32) -> Self {
        Self { item_id, amount: 1 }
    }
}

/// Catalog-side description of an item id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDefinition {
    pub item_id: u32,
    pub name: String,
    pub stackable: bool,
    /// Base shop value in coins.
    pub value: u32,
}

/// An item lying in the world, outside any container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorldItem {
    pub item_id: u32,
    pub amount: u32,
    pub position: Position,
    /// World index of the only player the item is initially visible to.
    #[serde(default)]
    pub initially_visible_to: Option<u32>,
    /// Tick at which the item despawns.
    #[serde(default)]
    pub expires: Option<u64>,
    #[serde(default)]
    pub removed: bool,
}

// ---------------------------------------------------------------------------
// Shops
// ---------------------------------------------------------------------------

/// One stocked line of a shop inventory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShopItem {
    pub item_id: u32,
    pub amount_in_stock: u32,
}

/// A configured shop: stable identification key, display name, stock lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shop {
    pub identification: String,
    pub name: String,
    pub items: Vec<ShopItem>,
}

// ---------------------------------------------------------------------------
// Observable-state values
// ---------------------------------------------------------------------------

/// An animation to broadcast this tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Animation {
    pub id: u32,
    pub delay: u32,
}

impl From<u32> for Animation {
    fn from(id: u32) -> Self {
        Self { id, delay: 0 }
    }
}

/// A graphic (spotanim) to broadcast this tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Graphic {
    pub id: u32,
    pub delay: u32,
    pub height: u32,
}

impl From<u32> for Graphic {
    fn from(id: u32) -> Self {
        Self {
            id,
            delay: 0,
            height: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// Widget surfaces
// ---------------------------------------------------------------------------

/// Widget ids of the client interfaces this core pushes updates into.
pub mod widgets {
    pub const INVENTORY: u16 = 3214;

    pub mod shop {
        pub const SHOP_SCREEN: u16 = 3824;
        pub const SHOP_INVENTORY: u16 = 3900;
        pub const PLAYER_TAB: u16 = 3822;
        pub const PLAYER_INVENTORY: u16 = 3823;
    }
}

/// How a widget pair is being displayed on a player's screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WidgetDisplay {
    ScreenAndTab,
}

/// A widget surface currently open on a player's screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveWidget {
    pub widget_id: u16,
    pub secondary_widget_id: u16,
    pub display: WidgetDisplay,
    pub close_on_walk: bool,
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Host-supplied configuration for a world instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorldConfig {
    #[serde(with = "serde_u64_string")]
    pub seed: u64,
    /// Simulation tick cadence in milliseconds.
    pub tick_millis: u64,
    /// Period of the per-actor random wander behavior.
    pub wander_interval_millis: u64,
    /// One-shot delay after which a faced actor reference expires.
    pub face_clear_timeout_millis: u64,
    /// Upper bound on wander candidate proposals before falling back to
    /// "no movement".
    pub max_wander_attempts: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            tick_millis: 600,
            wander_interval_millis: 1_000,
            face_clear_timeout_millis: 20_000,
            max_wander_attempts: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_equality_is_field_equality() {
        assert_eq!(Position::new(3222, 3222), Position::at_level(3222, 3222, 0));
        assert_ne!(Position::new(3222, 3222), Position::at_level(3222, 3222, 1));
        assert_ne!(Position::new(3222, 3222), Position::new(3222, 3223));
    }

    #[test]
    fn position_translation_keeps_level() {
        let origin = Position::at_level(10, 20, 2);
        let moved = origin.translated(-3, 4);
        assert_eq!(moved, Position::at_level(7, 24, 2));
    }

    #[test]
    fn within_box_bounds_are_inclusive() {
        let center = Position::new(100, 100);
        assert!(Position::within_box(104, 96, center, 4));
        assert!(Position::within_box(100, 100, center, 0));
        assert!(!Position::within_box(105, 100, center, 4));
        assert!(!Position::within_box(100, 95, center, 4));
    }

    #[test]
    fn direction_table_round_trips_indices() {
        for index in 0..8 {
            let direction = Direction::from_index(index).expect("valid index");
            assert_eq!(direction.index(), index);
            let (dx, dy) = direction.delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(direction));
        }
    }

    #[test]
    fn unknown_direction_index_is_none() {
        assert_eq!(Direction::from_index(-1), None);
        assert_eq!(Direction::from_index(8), None);
        assert_eq!(Direction::from_delta(0, 0), None);
        assert_eq!(Direction::from_delta(2, 0), None);
    }

    #[test]
    fn south_is_the_default_facing_index() {
        assert_eq!(Direction::South.index(), DIRECTION_SOUTH_INDEX);
        assert_eq!(Direction::South.delta(), (0, -1));
    }

    #[test]
    fn world_config_seed_round_trips_as_string() {
        let config = WorldConfig::default();
        let serialized = serde_json::to_string(&config).expect("serialize");
        assert!(serialized.contains("\"seed\":\"1337\""));
        let decoded: WorldConfig = serde_json::from_str(&serialized).expect("deserialize");
        assert_eq!(decoded, config);
    }

    #[test]
    fn animation_and_graphic_from_id_use_broadcast_defaults() {
        let animation = Animation::from(422);
        assert_eq!(animation.delay, 0);
        let graphic = Graphic::from(86);
        assert_eq!((graphic.delay, graphic.height), (0, 120));
    }
}
