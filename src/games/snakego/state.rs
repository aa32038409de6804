use crate::game::traits::{Camp, ItemId, SnakeId};

/// A cell on the game grid
///
/// `x` is the row (`0..length`) and `y` the column (`0..width`).
/// Coordinates are signed so a head stepping off the grid is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn moved(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
}

impl std::ops::Add for GridPos {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for GridPos {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Movement directions, in wire order (codes 1 to 4).
///
/// Named after the axis they step along; `turned_left` rotates from +x
/// towards +y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    PlusX,
    PlusY,
    MinusX,
    MinusY,
}

impl Direction {
    /// Rotational order: each entry is a quarter turn from the previous one.
    pub const ALL: [Direction; 4] = [
        Direction::PlusX,
        Direction::PlusY,
        Direction::MinusX,
        Direction::MinusY,
    ];

    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::PlusX => (1, 0),
            Direction::PlusY => (0, 1),
            Direction::MinusX => (-1, 0),
            Direction::MinusY => (0, -1),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Direction::PlusX => 0,
            Direction::PlusY => 1,
            Direction::MinusX => 2,
            Direction::MinusY => 3,
        }
    }

    pub fn from_index(index: usize) -> Direction {
        Self::ALL[index % 4]
    }

    pub fn code(&self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_code(code: u8) -> Option<Direction> {
        match code {
            1..=4 => Some(Self::ALL[code as usize - 1]),
            _ => None,
        }
    }

    /// Direction of the unit step `from -> to`, if the cells are adjacent.
    pub fn between(from: GridPos, to: GridPos) -> Option<Direction> {
        let step = to - from;
        Self::ALL
            .into_iter()
            .find(|d| d.delta() == (step.x, step.y))
    }

    pub fn turned_left(&self) -> Direction {
        Self::from_index(self.index() + 1)
    }

    pub fn turned_right(&self) -> Direction {
        Self::from_index(self.index() + 3)
    }
}

/// The three grid layers: wall owner, snake occupancy and visible item.
pub struct Board {
    length: u32,
    width: u32,
    walls: Vec<Option<Camp>>,
    snakes: Vec<Option<SnakeId>>,
    items: Vec<Option<ItemId>>,
}

impl Board {
    pub fn new(length: u32, width: u32) -> Self {
        let cells = (length * width) as usize;
        Self {
            length,
            width,
            walls: vec![None; cells],
            snakes: vec![None; cells],
            items: vec![None; cells],
        }
    }

    /// `(length, width)`
    pub fn get_grid_dimensions(&self) -> (u32, u32) {
        (self.length, self.width)
    }

    pub fn in_bounds(&self, pos: &GridPos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as u32) < self.length
            && (pos.y as u32) < self.width
    }

    fn pos_to_index(&self, pos: &GridPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.x as u32 * self.width + pos.y as u32) as usize)
        } else {
            debug_assert!(false, "cell {pos:?} outside {}x{} grid", self.length, self.width);
            None
        }
    }

    pub fn wall_owner(&self, pos: &GridPos) -> Option<Camp> {
        self.pos_to_index(pos).and_then(|idx| self.walls[idx])
    }

    pub fn is_wall(&self, pos: &GridPos) -> bool {
        self.wall_owner(pos).is_some()
    }

    /// Sets every listed cell to `owner`; `None` clears the walls.
    pub fn set_walls(&mut self, cells: &[GridPos], owner: Option<Camp>) {
        for pos in cells {
            if let Some(idx) = self.pos_to_index(pos) {
                self.walls[idx] = owner;
            }
        }
    }

    pub fn count_walls(&self, camp: Camp) -> usize {
        self.walls.iter().filter(|&&c| c == Some(camp)).count()
    }

    pub fn snake_at(&self, pos: &GridPos) -> Option<SnakeId> {
        self.pos_to_index(pos).and_then(|idx| self.snakes[idx])
    }

    pub fn place_snake(&mut self, body: &[GridPos], id: SnakeId) {
        for pos in body {
            if let Some(idx) = self.pos_to_index(pos) {
                self.snakes[idx] = Some(id);
            }
        }
    }

    pub fn clear_snake(&mut self, body: &[GridPos]) {
        for pos in body {
            if let Some(idx) = self.pos_to_index(pos) {
                self.snakes[idx] = None;
            }
        }
    }

    /// All occupied cells with their occupant, in row-major order.
    pub fn occupied_cells(&self) -> Vec<(GridPos, SnakeId)> {
        self.snakes
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| {
                cell.map(|id| {
                    let x = (idx as u32 / self.width) as i32;
                    let y = (idx as u32 % self.width) as i32;
                    (GridPos::new(x, y), id)
                })
            })
            .collect()
    }

    pub fn item_at(&self, pos: &GridPos) -> Option<ItemId> {
        self.pos_to_index(pos).and_then(|idx| self.items[idx])
    }

    pub fn set_item(&mut self, pos: &GridPos, item: Option<ItemId>) {
        if let Some(idx) = self.pos_to_index(pos) {
            self.items[idx] = item;
        }
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("length", &self.length)
            .field("width", &self.width)
            .field("walls", &self.walls.iter().filter(|c| c.is_some()).count())
            .field("occupied", &self.snakes.iter().filter(|c| c.is_some()).count())
            .field("items", &self.items.iter().filter(|c| c.is_some()).count())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Adds its parameter to the holder's growth bank
    Food,
    /// Passive marker; lost when its holder splits
    Marker,
    /// Enables one fire action
    Beam,
    Other(u8),
}

impl ItemKind {
    pub fn from_wire(value: u8) -> Self {
        match value {
            0 => ItemKind::Food,
            1 => ItemKind::Marker,
            2 => ItemKind::Beam,
            other => ItemKind::Other(other),
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            ItemKind::Food => 0,
            ItemKind::Marker => 1,
            ItemKind::Beam => 2,
            ItemKind::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub pos: GridPos,
    /// Turn on which the item appears
    pub time: i32,
    pub kind: ItemKind,
    /// Growth amount for food, holding duration for everything else
    pub param: i32,
    /// Turn on which a snake picked it up
    pub picked_at: Option<i32>,
}

impl Item {
    pub fn new(id: ItemId, pos: GridPos, time: i32, kind: ItemKind, param: i32) -> Self {
        Self {
            id,
            pos,
            time,
            kind,
            param,
            picked_at: None,
        }
    }

    pub fn is_picked(&self) -> bool {
        self.picked_at.is_some()
    }

    pub fn held_too_long(&self, turn: i32) -> bool {
        self.picked_at.is_some_and(|at| turn - at > self.param)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    pub id: SnakeId,
    pub camp: Camp,
    /// Head first
    pub body: Vec<GridPos>,
    /// Pending growth, consumed one cell per move
    pub length_bank: i32,
    /// At most one item per kind; food never lands here
    pub items: Vec<Item>,
}

impl Snake {
    pub fn new(id: SnakeId, camp: Camp, body: Vec<GridPos>) -> Self {
        Self {
            id,
            camp,
            body,
            length_bank: 0,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn head(&self) -> Option<GridPos> {
        self.body.first().copied()
    }

    pub fn is_root(&self) -> bool {
        self.id == SnakeId::from(self.camp)
    }

    /// Food goes to the growth bank; other kinds replace a held item of the
    /// same kind in place or are appended.
    pub fn add_item(&mut self, item: Item) {
        if item.kind == ItemKind::Food {
            self.length_bank += item.param;
            return;
        }

        match self.items.iter_mut().find(|held| held.kind == item.kind) {
            Some(held) => *held = item,
            None => self.items.push(item),
        }
    }

    pub fn get_item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let idx = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(idx))
    }

    pub fn front_item(&self) -> Option<&Item> {
        self.items.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_pos_operations() {
        let head = GridPos::new(3, 0);
        assert_eq!(head.moved(Direction::PlusY), GridPos::new(3, 1));
        assert_eq!(head.moved(Direction::MinusX), GridPos::new(2, 0));
        assert_eq!(head.moved(Direction::MinusY), GridPos::new(3, -1));
        assert_eq!(head - GridPos::new(3, 1), GridPos::new(0, -1));
        assert_eq!(head + GridPos::new(0, -1), GridPos::new(3, -1));
    }

    #[test]
    fn test_direction_codes() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.code() as usize, i + 1);
            assert_eq!(Direction::from_code(dir.code()), Some(*dir));
        }
        assert_eq!(Direction::from_code(0), None);
        assert_eq!(Direction::from_code(5), None);
    }

    #[test]
    fn test_direction_rotation() {
        assert_eq!(Direction::PlusX.turned_left(), Direction::PlusY);
        assert_eq!(Direction::PlusX.turned_right(), Direction::MinusY);
        assert_eq!(
            Direction::between(GridPos::new(2, 2), GridPos::new(2, 1)),
            Some(Direction::MinusY)
        );
        assert_eq!(Direction::between(GridPos::new(2, 2), GridPos::new(3, 3)), None);
    }

    #[test]
    fn test_board_bounds() {
        let board = Board::new(5, 4);
        assert!(board.in_bounds(&GridPos::new(4, 3)));
        assert!(!board.in_bounds(&GridPos::new(5, 0)));
        assert!(!board.in_bounds(&GridPos::new(0, -1)));
        assert_eq!(board.get_grid_dimensions(), (5, 4));
    }

    #[test]
    fn test_clearing_walls_is_idempotent() {
        let mut board = Board::new(6, 6);
        let cells = [GridPos::new(1, 1), GridPos::new(1, 2), GridPos::new(2, 2)];
        board.set_walls(&cells, Some(1));
        assert_eq!(board.count_walls(1), 3);
        assert_eq!(board.wall_owner(&GridPos::new(1, 2)), Some(1));

        board.set_walls(&cells[..2], None);
        let once: Vec<_> = cells.iter().map(|c| board.wall_owner(c)).collect();
        board.set_walls(&cells[..2], None);
        let twice: Vec<_> = cells.iter().map(|c| board.wall_owner(c)).collect();

        assert_eq!(once, twice);
        assert_eq!(board.count_walls(1), 1);
    }

    #[test]
    fn test_board_occupancy() {
        let mut board = Board::new(4, 4);
        let body = [GridPos::new(0, 0), GridPos::new(0, 1)];
        board.place_snake(&body, 3);
        assert_eq!(board.snake_at(&GridPos::new(0, 1)), Some(3));
        assert_eq!(board.occupied_cells(), vec![(body[0], 3), (body[1], 3)]);

        board.clear_snake(&body);
        assert!(board.occupied_cells().is_empty());
    }

    #[test]
    fn test_item_kind_wire_values() {
        assert_eq!(ItemKind::from_wire(0), ItemKind::Food);
        assert_eq!(ItemKind::from_wire(2), ItemKind::Beam);
        assert_eq!(ItemKind::from_wire(7), ItemKind::Other(7));
        assert_eq!(ItemKind::Other(7).to_wire(), 7);
        assert_eq!(ItemKind::Marker.to_wire(), 1);
    }

    #[test]
    fn test_snake_accessors() {
        let snake = Snake::new(4, 1, vec![GridPos::new(2, 3), GridPos::new(2, 2)]);
        assert_eq!(snake.len(), 2);
        assert!(!snake.is_empty());
        assert_eq!(snake.head(), Some(GridPos::new(2, 3)));
        assert!(!snake.is_root());

        let husk = Snake::new(1, 1, Vec::new());
        assert!(husk.is_empty());
        assert_eq!(husk.head(), None);
        assert!(husk.is_root());
    }

    #[test]
    fn test_food_goes_to_bank() {
        let mut snake = Snake::new(0, 0, vec![GridPos::new(0, 0)]);
        snake.add_item(Item::new(0, GridPos::new(1, 1), 1, ItemKind::Food, 3));
        assert_eq!(snake.length_bank, 3);
        assert!(snake.items.is_empty());
    }

    #[test]
    fn test_same_kind_replaces_in_place() {
        let mut snake = Snake::new(0, 0, vec![GridPos::new(0, 0)]);
        snake.add_item(Item::new(0, GridPos::new(1, 1), 1, ItemKind::Beam, 5));
        snake.add_item(Item::new(1, GridPos::new(1, 2), 1, ItemKind::Marker, 5));
        snake.add_item(Item::new(2, GridPos::new(1, 3), 2, ItemKind::Beam, 9));

        let ids: Vec<_> = snake.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(snake.front_item().map(|i| i.param), Some(9));

        assert!(snake.remove_item(1).is_some());
        assert!(snake.get_item(1).is_none());
        assert!(snake.remove_item(1).is_none());
    }

    #[test]
    fn test_held_item_expiry() {
        let mut item = Item::new(0, GridPos::new(0, 0), 1, ItemKind::Beam, 3);
        assert!(!item.held_too_long(100));
        item.picked_at = Some(4);
        assert!(!item.held_too_long(7));
        assert!(item.held_too_long(8));
    }
}
