use super::config::{ITEM_EXPIRE_TURNS, MAX_SNAKES_PER_CAMP};
use super::context::Context;
use super::enclosure::enclosed_cells;
use super::state::{Direction, GridPos, ItemKind, Snake};
use crate::game::traits::{GameError, ItemId, Rejection, SnakeId};

/// One of the seven actions a snake can take on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Move(Direction),
    Fire,
    Split,
}

impl Action {
    pub const FIRE_CODE: u8 = 5;
    pub const SPLIT_CODE: u8 = 6;

    pub fn code(&self) -> u8 {
        match self {
            Action::Move(direction) => direction.code(),
            Action::Fire => Self::FIRE_CODE,
            Action::Split => Self::SPLIT_CODE,
        }
    }

    pub fn from_code(code: u8) -> Option<Action> {
        match code {
            Self::FIRE_CODE => Some(Action::Fire),
            Self::SPLIT_CODE => Some(Action::Split),
            other => Direction::from_code(other).map(Action::Move),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Head left the grid
    OutOfBounds,
    /// Head entered a wall cell
    Wall,
    /// Head entered another snake's body
    Collision,
}

/// What an applied action did to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Moved,
    Died { cause: DeathCause },
    /// The snake closed a loop on itself; it dies and its camp walls off
    /// `claimed`. Snakes caught inside are `victims`.
    Solidified {
        claimed: Vec<GridPos>,
        victims: Vec<SnakeId>,
    },
    Fired { cleared: Vec<GridPos> },
    Split { spawned: SnakeId },
}

impl Outcome {
    /// Every snake removed from play by this outcome.
    pub fn casualties(&self, actor: SnakeId) -> Vec<SnakeId> {
        match self {
            Outcome::Died { .. } => vec![actor],
            Outcome::Solidified { victims, .. } => {
                let mut dead = vec![actor];
                dead.extend(victims.iter().copied());
                dead
            }
            _ => Vec::new(),
        }
    }
}

pub fn apply_action(ctx: &mut Context, snake_id: SnakeId, action: Action) -> Result<Outcome, GameError> {
    let index = ctx
        .position_of(snake_id)
        .ok_or(GameError::SnakeNotFound(snake_id))?;

    match action {
        Action::Move(direction) => move_snake(ctx, index, direction),
        Action::Fire => fire(ctx, index),
        Action::Split => split(ctx, index),
    }
}

fn move_snake(ctx: &mut Context, index: usize, direction: Direction) -> Result<Outcome, GameError> {
    let snake = &ctx.snakes()[index];
    let snake_id = snake.id;
    let head = snake.head().ok_or(GameError::SnakeNotFound(snake_id))?;
    let auto_grow = ctx.is_growth_window() && snake.is_root();
    let growing = auto_grow || snake.length_bank > 0;
    let target = head.moved(direction);

    let reverses = snake.body.get(1) == Some(&target);
    if reverses && (snake.len() > 2 || (snake.len() == 2 && growing)) {
        return Err(Rejection::Reversal.into());
    }

    let (index, mut snake) = ctx
        .delete_snake(snake_id)
        .ok_or(GameError::SnakeNotFound(snake_id))?;

    if !ctx.board.in_bounds(&target) {
        return Ok(Outcome::Died { cause: DeathCause::OutOfBounds });
    }
    if ctx.board.is_wall(&target) {
        return Ok(Outcome::Died { cause: DeathCause::Wall });
    }

    let tail = *snake.body.last().ok_or(GameError::SnakeNotFound(snake_id))?;
    snake.body.insert(0, target);
    snake.body.pop();
    if auto_grow {
        snake.body.push(tail);
    } else if snake.length_bank > 0 {
        snake.length_bank -= 1;
        snake.body.push(tail);
    }

    if let Some(item_id) = ctx.board.item_at(&target) {
        pick_up(ctx, &mut snake, item_id);
    }

    let collision = snake.body.iter().skip(1).position(|pos| *pos == target);
    if let Some(offset) = collision {
        return Ok(solidify(ctx, &snake, offset + 1));
    }

    if ctx.board.snake_at(&target).is_some() {
        return Ok(Outcome::Died { cause: DeathCause::Collision });
    }

    ctx.add_snake(snake, index);
    Ok(Outcome::Moved)
}

fn pick_up(ctx: &mut Context, snake: &mut Snake, item_id: ItemId) {
    let Some(idx) = ctx.items.iter().position(|item| item.id == item_id) else {
        tracing::warn!("Item {} shown on the grid but not listed", item_id);
        return;
    };

    let mut item = ctx.delete_map_item(idx);
    item.picked_at = Some(ctx.turn);
    tracing::debug!("Snake {} picked up item {} ({:?})", snake.id, item.id, item.kind);
    snake.add_item(item);
}

/// `snake` has already left the roster; its head sits on `body[hit]`.
fn solidify(ctx: &mut Context, snake: &Snake, hit: usize) -> Outcome {
    let (length, width) = ctx.board.get_grid_dimensions();
    let mut claimed = snake.body[..hit].to_vec();
    let mut enclosed = enclosed_cells(&claimed, length, width);

    for pos in &snake.body[hit..] {
        if let Some(k) = enclosed.iter().position(|cell| cell == pos) {
            claimed.push(*pos);
            enclosed.remove(k);
        }
    }

    let mut victims = Vec::new();
    for pos in &enclosed {
        if let Some(victim) = ctx.board.snake_at(pos) {
            ctx.delete_snake(victim);
            victims.push(victim);
        }
    }

    claimed.extend(enclosed);
    ctx.board.set_walls(&claimed, Some(snake.camp));

    tracing::info!(
        "Snake {} solidified {} cells for camp {} ({} trapped)",
        snake.id,
        claimed.len(),
        snake.camp,
        victims.len()
    );

    Outcome::Solidified { claimed, victims }
}

fn split(ctx: &mut Context, index: usize) -> Result<Outcome, GameError> {
    let snake = &ctx.snakes()[index];
    let snake_id = snake.id;
    if ctx.get_snake_count(snake.camp) >= MAX_SNAKES_PER_CAMP {
        return Err(Rejection::CampFull(snake.camp).into());
    }
    if snake.len() <= 1 {
        return Err(Rejection::TooShort.into());
    }

    let (index, mut snake) = ctx
        .delete_snake(snake_id)
        .ok_or(GameError::SnakeNotFound(snake_id))?;

    let keep = snake.len().div_ceil(2);
    let mut tail_body = snake.body.split_off(keep);
    tail_body.reverse();

    let mut tail_items = Vec::new();
    for item in std::mem::take(&mut snake.items) {
        match item.kind {
            ItemKind::Food => tail_items.push(item),
            ItemKind::Marker => {}
            _ => snake.items.push(item),
        }
    }

    let spawned_id = ctx.allocate_snake_id();
    let mut spawned = Snake::new(spawned_id, snake.camp, tail_body);
    spawned.items = tail_items;
    spawned.length_bank = snake.length_bank;
    snake.length_bank = 0;

    ctx.add_snake(snake, index);
    ctx.add_snake(spawned, index + 1);

    Ok(Outcome::Split { spawned: spawned_id })
}

fn fire(ctx: &mut Context, index: usize) -> Result<Outcome, GameError> {
    let snake = &ctx.snakes()[index];
    let snake_id = snake.id;
    if snake.front_item().map(|item| item.kind) != Some(ItemKind::Beam) {
        return Err(Rejection::NoBeam.into());
    }
    let (head, neck) = match snake.body.as_slice() {
        [head, neck, ..] => (*head, *neck),
        _ => return Err(Rejection::TooShort.into()),
    };

    if let Some(snake) = ctx.get_snake_mut(snake_id) {
        snake.items.remove(0);
    }

    let step = head - neck;
    let mut cleared = Vec::new();
    let mut pos = head + step;
    while ctx.board.in_bounds(&pos) {
        cleared.push(pos);
        pos = pos + step;
    }

    ctx.board.set_walls(&cleared, None);
    Ok(Outcome::Fired { cleared })
}

/// Item lifecycle at the start of each round: expire stale grid items,
/// reveal or hand out items appearing this turn, then drop held items past
/// their holding duration.
pub fn update_items(ctx: &mut Context) {
    let turn = ctx.turn;

    let mut idx = 0;
    while idx < ctx.items.len() {
        let item = &ctx.items[idx];

        if item.time <= turn - ITEM_EXPIRE_TURNS && !item.is_picked() {
            let expired = ctx.delete_map_item(idx);
            tracing::debug!("Item {} expired at {:?}", expired.id, expired.pos);
            continue;
        }

        if item.time == turn {
            if let Some(holder) = ctx.board.snake_at(&item.pos) {
                let mut item = ctx.items.remove(idx);
                item.picked_at = Some(turn);
                if let Some(snake) = ctx.get_snake_mut(holder) {
                    snake.add_item(item);
                }
                continue;
            }
            let (pos, id) = (item.pos, item.id);
            ctx.board.set_item(&pos, Some(id));
        }

        idx += 1;
    }

    for items in ctx.inventories_mut() {
        items.retain(|item| !item.held_too_long(turn));
    }
}
