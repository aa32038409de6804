use tokio::io::{AsyncRead, AsyncWrite};

use crate::game::traits::{Camp, GameError, Rejection, SnakeId, Strategy};
use crate::games::snakego::{Action, Context, Controller, GameConfig, GridPos, Item};
use crate::network::Gateway;
use crate::protocol::{GameResult, Inbound, ItemRecord, ProtocolError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("strategy chose {action:?} for snake {snake}: {reason}")]
    IllegalDecision {
        snake: SnakeId,
        action: Action,
        reason: Rejection,
    },
}

/// One game from the client's side: mirrors the judge's simulation, answers
/// for our snakes and replays the opponent's actions.
pub struct Session<R, W, S> {
    gateway: Gateway<R, W>,
    strategy: S,
}

impl<R, W, S> Session<R, W, S>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Strategy,
{
    pub fn new(gateway: Gateway<R, W>, strategy: S) -> Self {
        Self { gateway, strategy }
    }

    pub async fn run(mut self) -> Result<GameResult, SessionError> {
        let setup = self.gateway.recv_setup().await?;
        let config = setup.config();
        let player: Camp = setup.player;
        tracing::info!(
            "Assigned player {} on a {}x{} grid, {} rounds",
            player,
            config.length,
            config.width,
            config.max_round
        );

        let records = self.gateway.recv_items().await?;
        let items = load_items(&config, records);
        tracing::debug!("Item list loaded, {} items", items.len());

        let mut controller = Controller::new(Context::new(&config, items));

        loop {
            if controller.is_over() {
                return self.await_result().await;
            }
            controller.begin_turn();

            if controller.current_player() == player {
                if let Some(result) = self.play_own_turn(&mut controller).await? {
                    return Ok(result);
                }
            } else if let Some(result) = self.replay_opponent_turn(&mut controller).await? {
                return Ok(result);
            }

            controller.next_player();
        }
    }

    async fn play_own_turn(&mut self, controller: &mut Controller) -> Result<Option<GameResult>, SessionError> {
        while let Some(snake) = controller.active_snake() {
            let snake_id = snake.id;
            let action = self.strategy.decide(snake, controller.ctx());

            match controller.apply(action) {
                Ok(outcome) => {
                    tracing::debug!("Turn {}: snake {} {:?} -> {:?}", controller.turn(), snake_id, action, outcome);
                }
                Err(GameError::Rejected(reason)) => {
                    return Err(SessionError::IllegalDecision {
                        snake: snake_id,
                        action,
                        reason,
                    });
                }
                Err(e) => return Err(e.into()),
            }

            self.gateway.send_action(action).await?;
            if let Inbound::GameOver(result) = self.gateway.recv_turn().await? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    async fn replay_opponent_turn(&mut self, controller: &mut Controller) -> Result<Option<GameResult>, SessionError> {
        while let Some(snake_id) = controller.active_snake_id() {
            let action = match self.gateway.recv_turn().await? {
                Inbound::Action(action) => action,
                Inbound::GameOver(result) => return Ok(Some(result)),
            };

            match controller.apply(action) {
                Ok(outcome) => {
                    tracing::debug!("Turn {}: opponent snake {} {:?} -> {:?}", controller.turn(), snake_id, action, outcome);
                }
                Err(GameError::Rejected(reason)) => {
                    tracing::warn!("Opponent snake {} sent rejected action {:?}: {}", snake_id, action, reason);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }

    async fn await_result(&mut self) -> Result<GameResult, SessionError> {
        loop {
            match self.gateway.recv_turn().await? {
                Inbound::GameOver(result) => return Ok(result),
                Inbound::Action(action) => {
                    tracing::warn!("Ignoring action {:?} after the last round", action);
                }
            }
        }
    }
}

/// Assigns ids in list order and drops records that fall off the grid.
fn load_items(config: &GameConfig, records: Vec<ItemRecord>) -> Vec<Item> {
    records
        .into_iter()
        .enumerate()
        .map(|(id, record)| record.into_item(id as u32))
        .filter(|item| {
            let GridPos { x, y } = item.pos;
            let inside = (x as u32) < config.length && (y as u32) < config.width;
            if !inside {
                tracing::warn!("Dropping item {} outside the grid at {:?}", item.id, item.pos);
            }
            inside
        })
        .collect()
}
