/// Turns an item stays on the grid after appearing before it is removed
pub const ITEM_EXPIRE_TURNS: i32 = 16;
/// Root snakes grow on every move up to and including this turn
pub const AUTO_GROWTH_ROUND: i32 = 8;
/// Split is refused once a camp fields this many snakes
pub const MAX_SNAKES_PER_CAMP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Number of rows (x ranges over `0..length`)
    pub length: u32,
    /// Number of columns (y ranges over `0..width`)
    pub width: u32,
    /// Last turn that is played
    pub max_round: i32,
}

impl GameConfig {
    pub fn new(length: u32, width: u32, max_round: i32) -> Self {
        Self {
            length,
            width,
            max_round,
        }
    }

    pub fn with_grid_size(length: u32, width: u32) -> Self {
        Self {
            length,
            width,
            ..Default::default()
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            length: 16,
            width: 16,
            max_round: 512,
        }
    }
}
