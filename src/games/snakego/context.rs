use super::config::{AUTO_GROWTH_ROUND, GameConfig};
use super::state::{Board, GridPos, Item, Snake};
use crate::game::traits::{Camp, SnakeId};

/// Full mutable game state.
///
/// Every structural change to the roster goes through here so the occupancy
/// layer of `board` always equals the union of the live snakes' bodies.
#[derive(Debug)]
pub struct Context {
    /// Live snakes in acting order
    snakes: Vec<Snake>,
    pub board: Board,
    /// Items that are pending or visible on the grid; held items live on snakes
    pub items: Vec<Item>,
    pub turn: i32,
    pub current_player: Camp,
    pub auto_growth_round: i32,
    pub max_round: i32,
    next_snake_id: SnakeId,
}

impl Context {
    /// Two root snakes on opposite corners: snake 0 at `(0, width - 1)` and
    /// snake 1 at `(length - 1, 0)`.
    pub fn new(config: &GameConfig, items: Vec<Item>) -> Self {
        let mut ctx = Self {
            snakes: Vec::new(),
            board: Board::new(config.length, config.width),
            items,
            turn: 1,
            current_player: 0,
            auto_growth_round: AUTO_GROWTH_ROUND,
            max_round: config.max_round,
            next_snake_id: 0,
        };

        let roots = [
            GridPos::new(0, config.width as i32 - 1),
            GridPos::new(config.length as i32 - 1, 0),
        ];
        for (camp, start) in roots.into_iter().enumerate() {
            let id = ctx.allocate_snake_id();
            let index = ctx.snakes.len();
            ctx.add_snake(Snake::new(id, camp as Camp, vec![start]), index);
        }

        ctx
    }

    pub fn allocate_snake_id(&mut self) -> SnakeId {
        let id = self.next_snake_id;
        self.next_snake_id += 1;
        id
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    pub fn snakes_of(&self, camp: Camp) -> impl Iterator<Item = &Snake> {
        self.snakes.iter().filter(move |s| s.camp == camp)
    }

    pub fn get_snake_count(&self, camp: Camp) -> usize {
        self.snakes_of(camp).count()
    }

    pub fn get_snake(&self, id: SnakeId) -> Option<&Snake> {
        self.snakes.iter().find(|s| s.id == id)
    }

    pub fn get_snake_mut(&mut self, id: SnakeId) -> Option<&mut Snake> {
        self.snakes.iter_mut().find(|s| s.id == id)
    }

    /// Mutable access to held items only; bodies stay behind add/delete.
    pub fn inventories_mut(&mut self) -> impl Iterator<Item = &mut Vec<Item>> {
        self.snakes.iter_mut().map(|s| &mut s.items)
    }

    pub fn position_of(&self, id: SnakeId) -> Option<usize> {
        self.snakes.iter().position(|s| s.id == id)
    }

    /// Inserts at `index` (clamped to the roster length) and marks its body
    /// on the occupancy layer.
    pub fn add_snake(&mut self, snake: Snake, index: usize) {
        debug_assert!(!snake.is_empty(), "snake {} has no body", snake.id);
        self.board.place_snake(&snake.body, snake.id);
        let index = index.min(self.snakes.len());
        self.snakes.insert(index, snake);
    }

    /// Takes the snake out of the roster and clears its cells.
    pub fn delete_snake(&mut self, id: SnakeId) -> Option<(usize, Snake)> {
        let index = self.position_of(id)?;
        let snake = self.snakes.remove(index);
        self.board.clear_snake(&snake.body);
        Some((index, snake))
    }

    /// Removes an item from the grid list, clearing its cell if it still
    /// shows this item.
    pub fn delete_map_item(&mut self, index: usize) -> Item {
        let item = self.items.remove(index);
        if self.board.item_at(&item.pos) == Some(item.id) {
            self.board.set_item(&item.pos, None);
        }
        item
    }

    pub fn is_growth_window(&self) -> bool {
        self.turn <= self.auto_growth_round
    }

    pub fn is_over(&self) -> bool {
        self.turn > self.max_round
    }
}
