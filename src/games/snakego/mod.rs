pub mod config;
pub mod context;
pub mod enclosure;
pub mod state;
pub mod strategy;
pub mod systems;

use crate::game::traits::{Camp, GameError, SnakeId};

pub use config::GameConfig;
pub use context::Context;
pub use enclosure::{Enclosure, enclosed_cells};
pub use state::{Board, Direction, GridPos, Item, ItemKind, Snake};
pub use strategy::CautiousStrategy;
pub use systems::{Action, DeathCause, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnakeRef {
    pub id: SnakeId,
    pub camp: Camp,
}

/// Snapshot entry for the half turn in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterEntry {
    Alive(SnakeRef),
    Dead(SnakeRef),
}

impl RosterEntry {
    pub fn snake(&self) -> SnakeRef {
        match self {
            RosterEntry::Alive(s) | RosterEntry::Dead(s) => *s,
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self, RosterEntry::Alive(_))
    }
}

/// Turn/round state machine.
///
/// A half turn runs `begin_turn` (item upkeep when player 0 starts a round,
/// then the roster snapshot), one `apply` per active snake and finally
/// `next_player`.
pub struct Controller {
    ctx: Context,
    /// Snakes that were alive when the half turn began, in acting order
    roster: Vec<RosterEntry>,
    /// Index into `roster` of the snake whose action is awaited
    next_snake: Option<usize>,
}

impl Controller {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            roster: Vec::new(),
            next_snake: None,
        }
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn current_player(&self) -> Camp {
        self.ctx.current_player
    }

    pub fn turn(&self) -> i32 {
        self.ctx.turn
    }

    pub fn is_over(&self) -> bool {
        self.ctx.is_over()
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn round_preprocess(&mut self) {
        systems::update_items(&mut self.ctx);
    }

    pub fn round_init(&mut self) {
        self.roster = self
            .ctx
            .snakes()
            .iter()
            .map(|s| RosterEntry::Alive(SnakeRef { id: s.id, camp: s.camp }))
            .collect();
        self.next_snake = self.find_next_snake(0);
    }

    pub fn begin_turn(&mut self) {
        if self.ctx.current_player == 0 {
            self.round_preprocess();
        }
        self.round_init();
    }

    fn find_next_snake(&self, from: usize) -> Option<usize> {
        let player = self.ctx.current_player;
        (from..self.roster.len()).find(|&idx| {
            let entry = self.roster[idx];
            entry.is_alive() && entry.snake().camp == player
        })
    }

    pub fn active_snake_id(&self) -> Option<SnakeId> {
        self.next_snake.map(|idx| self.roster[idx].snake().id)
    }

    pub fn active_snake(&self) -> Option<&Snake> {
        self.active_snake_id().and_then(|id| self.ctx.get_snake(id))
    }

    fn mark_dead(&mut self, id: SnakeId) {
        for entry in self.roster.iter_mut() {
            if let RosterEntry::Alive(s) = *entry {
                if s.id == id {
                    *entry = RosterEntry::Dead(s);
                }
            }
        }
    }

    /// Resolves `action` for the active snake and advances to the next one.
    ///
    /// A rejected action leaves the state and the active snake unchanged.
    pub fn apply(&mut self, action: Action) -> Result<Outcome, GameError> {
        let cursor = self.next_snake.ok_or(GameError::NoActiveSnake)?;
        let snake_id = self.roster[cursor].snake().id;

        let outcome = systems::apply_action(&mut self.ctx, snake_id, action)?;

        for dead in outcome.casualties(snake_id) {
            self.mark_dead(dead);
        }
        match &outcome {
            Outcome::Died { cause } => {
                tracing::info!("Snake {} died on turn {} ({:?})", snake_id, self.ctx.turn, cause);
            }
            Outcome::Split { spawned } => {
                tracing::debug!("Snake {} split off snake {}", snake_id, spawned);
            }
            Outcome::Fired { cleared } => {
                tracing::debug!("Snake {} fired, clearing {} cells", snake_id, cleared.len());
            }
            _ => {}
        }

        self.next_snake = self.find_next_snake(cursor + 1);
        Ok(outcome)
    }

    pub fn next_player(&mut self) {
        self.ctx.current_player = 1 - self.ctx.current_player;
        if self.ctx.current_player == 0 {
            self.ctx.turn += 1;
        }
        self.next_snake = None;
    }
}
