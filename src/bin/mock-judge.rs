//! Local stand-in for the tournament judge: serves one client as player 0 and
//! plays player 1 itself.

use std::time::Duration;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snake_go::game::traits::{Camp, GameError, Strategy};
use snake_go::games::snakego::{CautiousStrategy, Context, Controller};
use snake_go::protocol::{self, GameResult, GameSetup, Inbound, ItemRecord, ProtocolError, ResultKind};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

const CLIENT: Camp = 0;
const NO_WINNER: u8 = 0xFF;

#[derive(Parser)]
#[command(name = "mock-judge")]
#[command(about = "Plays one game of snake territory against a client over TCP")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:9000")]
    bind: String,

    /// Grid rows
    #[arg(long, default_value_t = 16)]
    length: u8,

    /// Grid columns
    #[arg(long, default_value_t = 16)]
    width: u8,

    #[arg(long, default_value_t = 512)]
    max_round: i16,

    /// Number of items scattered over the game
    #[arg(long, default_value_t = 32)]
    items: u8,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// How long the client may think per action (milliseconds)
    #[arg(long, default_value_t = 2000)]
    client_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mock_judge=info".parse()?)
                .add_directive("snake_go=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.length >= 2 && args.width >= 2, "grid must be at least 2x2");

    let listener = TcpListener::bind(&args.bind).await?;
    tracing::info!("Mock judge listening on {}", listener.local_addr()?);

    let (stream, peer) = listener.accept().await?;
    stream.set_nodelay(true)?;
    tracing::info!("Client connected from {}", peer);

    let (reader, writer) = stream.into_split();
    let setup = GameSetup {
        length: args.length,
        width: args.width,
        max_round: args.max_round,
        player: CLIENT,
    };
    let records = random_items(&setup, args.items, args.seed);

    let mut judge = Judge::start(reader, writer, setup, records, Duration::from_millis(args.client_timeout_ms)).await?;
    let result = judge.play().await?;

    tracing::info!(
        "Game over ({:?}): winner {}, walls {} - {}",
        result.kind,
        result.winner,
        result.scores[0],
        result.scores[1]
    );
    Ok(())
}

/// Seeded item list sorted by appearance turn.
fn random_items(setup: &GameSetup, count: u8, seed: u64) -> Vec<ItemRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let last_turn = setup.max_round.max(1);

    let mut records: Vec<ItemRecord> = (0..count)
        .map(|_| {
            let kind = match rng.gen_range(0..10) {
                0..=5 => 0,
                6..=7 => 2,
                _ => 1,
            };
            let param = if kind == 0 { rng.gen_range(1..=3) } else { rng.gen_range(4..=32) };
            ItemRecord {
                x: rng.gen_range(0..setup.length),
                y: rng.gen_range(0..setup.width),
                kind,
                time: rng.gen_range(1..=last_turn),
                param,
            }
        })
        .collect();
    records.sort_by_key(|record| record.time);
    records
}

/// Scores are wall counts; the camp with more walls wins.
fn score(controller: &Controller, kind: ResultKind) -> GameResult {
    let board = &controller.ctx().board;
    let walls = [board.count_walls(0), board.count_walls(1)];
    let scores = walls.map(|count| count.min(i16::MAX as usize) as i16);

    let winner = match kind {
        ResultKind::Normal => match walls[0].cmp(&walls[1]) {
            std::cmp::Ordering::Greater => 0,
            std::cmp::Ordering::Less => 1,
            std::cmp::Ordering::Equal => NO_WINNER,
        },
        ResultKind::InternalError => CLIENT,
        _ => 1 - CLIENT,
    };

    GameResult { kind, winner, scores }
}

struct Judge {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    controller: Controller,
    strategy: CautiousStrategy,
    client_timeout: Duration,
}

impl Judge {
    async fn start(
        reader: OwnedReadHalf,
        mut writer: OwnedWriteHalf,
        setup: GameSetup,
        records: Vec<ItemRecord>,
        client_timeout: Duration,
    ) -> Result<Self, ProtocolError> {
        protocol::write_setup(&mut writer, &setup).await?;
        protocol::write_items(&mut writer, &records).await?;

        let items = records
            .into_iter()
            .enumerate()
            .map(|(id, record)| record.into_item(id as u32))
            .collect();
        let controller = Controller::new(Context::new(&setup.config(), items));

        Ok(Self {
            reader,
            writer,
            controller,
            strategy: CautiousStrategy,
            client_timeout,
        })
    }

    async fn play(&mut self) -> Result<GameResult, ProtocolError> {
        let kind = loop {
            if self.controller.is_over() {
                break ResultKind::Normal;
            }
            self.controller.begin_turn();

            let ended = if self.controller.current_player() == CLIENT {
                self.client_turn().await?
            } else {
                self.own_turn().await?
            };
            if let Some(kind) = ended {
                break kind;
            }

            self.controller.next_player();
        };

        let result = score(&self.controller, kind);
        if let Err(e) = protocol::write_inbound(&mut self.writer, &Inbound::GameOver(result)).await {
            tracing::warn!("Failed to send result: {}", e);
        }
        Ok(result)
    }

    /// Reads and applies one action per client snake, acknowledging each.
    async fn client_turn(&mut self) -> Result<Option<ResultKind>, ProtocolError> {
        while let Some(snake_id) = self.controller.active_snake_id() {
            let read = tokio::time::timeout(self.client_timeout, protocol::read_action(&mut self.reader)).await;
            let action = match read {
                Ok(Ok(action)) => action,
                Ok(Err(ProtocolError::Io(e))) => {
                    tracing::warn!("Client connection failed: {}", e);
                    return Ok(Some(ResultKind::PlayerError));
                }
                Ok(Err(e)) => {
                    tracing::warn!("Malformed frame from client: {}", e);
                    return Ok(Some(ResultKind::InvalidFormat));
                }
                Err(_) => {
                    tracing::warn!("Client timed out on turn {}", self.controller.turn());
                    return Ok(Some(ResultKind::PlayerError));
                }
            };

            match self.controller.apply(action) {
                Ok(outcome) => {
                    tracing::debug!("Client snake {} {:?} -> {:?}", snake_id, action, outcome);
                }
                Err(GameError::Rejected(reason)) => {
                    tracing::warn!("Client snake {} sent illegal {:?}: {}", snake_id, action, reason);
                    return Ok(Some(ResultKind::IllegalAction));
                }
                Err(e) => {
                    tracing::error!("Engine failure: {}", e);
                    return Ok(Some(ResultKind::InternalError));
                }
            }

            protocol::write_inbound(&mut self.writer, &Inbound::Action(action)).await?;
        }
        Ok(None)
    }

    async fn own_turn(&mut self) -> Result<Option<ResultKind>, ProtocolError> {
        while let Some(snake) = self.controller.active_snake() {
            let snake_id = snake.id;
            let action = self.strategy.decide(snake, self.controller.ctx());

            if let Err(e) = self.controller.apply(action) {
                tracing::error!("Judge snake {} produced {:?}: {}", snake_id, action, e);
                return Ok(Some(ResultKind::InternalError));
            }
            protocol::write_inbound(&mut self.writer, &Inbound::Action(action)).await?;
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_go::games::snakego::GridPos;

    fn setup(length: u8, width: u8) -> GameSetup {
        GameSetup {
            length,
            width,
            max_round: 40,
            player: CLIENT,
        }
    }

    #[test]
    fn test_random_items_are_seeded_and_on_grid() {
        let setup = setup(6, 9);
        let first = random_items(&setup, 50, 7);
        let second = random_items(&setup, 50, 7);

        assert_eq!(first, second);
        assert_eq!(first.len(), 50);
        assert!(first.windows(2).all(|w| w[0].time <= w[1].time));
        for record in &first {
            assert!(record.x < 6 && record.y < 9);
            assert!((1..=40).contains(&record.time));
            assert!(matches!(record.kind, 0..=2));
        }
    }

    #[test]
    fn test_score_by_wall_count() {
        let config = setup(6, 6).config();
        let mut controller = Controller::new(Context::new(&config, Vec::new()));
        let board = &mut controller.ctx_mut().board;
        board.set_walls(&[GridPos::new(2, 2), GridPos::new(2, 3)], Some(1));
        board.set_walls(&[GridPos::new(4, 4)], Some(0));

        let result = score(&controller, ResultKind::Normal);
        assert_eq!(result.winner, 1);
        assert_eq!(result.scores, [1, 2]);

        assert_eq!(score(&controller, ResultKind::IllegalAction).winner, 1);
        assert_eq!(score(&controller, ResultKind::InternalError).winner, CLIENT);

        let even = Controller::new(Context::new(&config, Vec::new()));
        assert_eq!(score(&even, ResultKind::Normal).winner, NO_WINNER);
    }
}
