use super::config::MAX_SNAKES_PER_CAMP;
use super::context::Context;
use super::state::{Direction, ItemKind, Snake};
use super::systems::Action;
use crate::game::traits::Strategy;

/// Length at which the camp's leading snake splits
pub const SPLIT_LENGTH: usize = 10;

/// Baseline decision function: fire when armed, split the leading snake once
/// it is long, curl the other snakes into tight loops to claim walls,
/// otherwise take the first move that cannot kill.
///
/// Every action it returns passes the legality checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct CautiousStrategy;

impl CautiousStrategy {
    fn is_safe(snake: &Snake, ctx: &Context, direction: Direction) -> bool {
        let Some(head) = snake.head() else {
            return false;
        };
        let target = head.moved(direction);
        ctx.board.in_bounds(&target)
            && !ctx.board.is_wall(&target)
            && ctx.board.snake_at(&target).is_none()
            && snake.body.get(1) != Some(&target)
    }

    /// Left turn relative to the heading, if that step closes a loop on the
    /// snake's own body or is safe. The tail cell is vacated by the move and
    /// never closes a loop.
    fn curl(snake: &Snake, ctx: &Context) -> Option<Direction> {
        let (head, neck) = match snake.body.as_slice() {
            [head, neck, ..] => (*head, *neck),
            _ => return None,
        };
        let turn = Direction::between(neck, head)?.turned_left();
        let target = head.moved(turn);

        let last = snake.len() - 1;
        let closes = snake.body[3.min(last)..last].contains(&target);
        (closes || Self::is_safe(snake, ctx, turn)).then_some(turn)
    }

    fn reverses(snake: &Snake, direction: Direction) -> bool {
        snake
            .head()
            .is_some_and(|head| snake.body.get(1) == Some(&head.moved(direction)))
    }
}

impl Strategy for CautiousStrategy {
    fn decide(&mut self, snake: &Snake, ctx: &Context) -> Action {
        let armed = snake.front_item().is_some_and(|item| item.kind == ItemKind::Beam);
        if armed && snake.len() > 1 {
            return Action::Fire;
        }

        let leading = ctx.snakes_of(snake.camp).next().map(|s| s.id) == Some(snake.id);
        if leading
            && snake.len() >= SPLIT_LENGTH
            && ctx.get_snake_count(snake.camp) < MAX_SNAKES_PER_CAMP
        {
            return Action::Split;
        }

        if !leading {
            if let Some(turn) = Self::curl(snake, ctx) {
                return Action::Move(turn);
            }
        }

        let direction = Direction::ALL
            .into_iter()
            .find(|d| Self::is_safe(snake, ctx, *d))
            .or_else(|| Direction::ALL.into_iter().find(|d| !Self::reverses(snake, *d)))
            .unwrap_or(Direction::PlusX);

        Action::Move(direction)
    }
}
