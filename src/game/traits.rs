use crate::games::snakego::{Action, Context, Snake};

/// Team index; also the index of the player controlling the team.
pub type Camp = u8;
pub type SnakeId = u32;
pub type ItemId = u32;

/// Why an action was refused. State is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Move would turn the head back onto the second body cell
    #[error("cannot reverse onto own body")]
    Reversal,
    /// Split while the camp already fields the maximum number of snakes
    #[error("camp {0} already has the maximum number of snakes")]
    CampFull(Camp),
    /// Split or fire on a single-cell snake
    #[error("snake is too short")]
    TooShort,
    /// Fire without a beam at the front of the inventory
    #[error("no beam item to fire")]
    NoBeam,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The action was illegal; the caller may consult its strategy again
    #[error("illegal action: {0}")]
    Rejected(#[from] Rejection),
    /// Snake referenced by the roster is not alive in the context
    #[error("snake {0} not found")]
    SnakeNotFound(SnakeId),
    /// An action was applied while no snake of the acting player is left
    #[error("no snake is waiting to act")]
    NoActiveSnake,
}

/// Decision function consulted once per acting snake.
pub trait Strategy {
    fn decide(&mut self, snake: &Snake, ctx: &Context) -> Action;
}

impl<F> Strategy for F
where
    F: FnMut(&Snake, &Context) -> Action,
{
    fn decide(&mut self, snake: &Snake, ctx: &Context) -> Action {
        self(snake, ctx)
    }
}
