//! Big-endian wire format shared by the judge and the client.
//!
//! Engine to client: one setup record, one item list, then a stream of
//! one-byte action opcodes that ends with a result record. Client to engine:
//! length-prefixed action frames.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::game::traits::ItemId;
use crate::games::snakego::{Action, GameConfig, GridPos, Item, ItemKind};

/// Leading byte of a result record
pub const RESULT_OPCODE: u8 = 0x11;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
    #[error("action frame declares {0} bytes, expected 1")]
    FrameLength(i32),
    #[error("item list declares {0} items")]
    NegativeCount(i16),
    #[error("player index {0} is neither 0 nor 1")]
    InvalidPlayer(u8),
    #[error("grid {length}x{width} is too small to seat both root snakes")]
    InvalidGrid { length: u8, width: u8 },
    #[error("no message within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSetup {
    pub length: u8,
    pub width: u8,
    pub max_round: i16,
    /// Which camp this client plays
    pub player: u8,
}

impl GameSetup {
    pub fn config(&self) -> GameConfig {
        GameConfig::new(self.length as u32, self.width as u32, self.max_round as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRecord {
    pub x: u8,
    pub y: u8,
    pub kind: u8,
    pub time: i16,
    pub param: i16,
}

impl ItemRecord {
    pub fn from_item(item: &Item) -> Self {
        Self {
            x: item.pos.x as u8,
            y: item.pos.y as u8,
            kind: item.kind.to_wire(),
            time: item.time as i16,
            param: item.param as i16,
        }
    }

    pub fn into_item(self, id: ItemId) -> Item {
        Item::new(
            id,
            GridPos::new(self.x as i32, self.y as i32),
            self.time as i32,
            ItemKind::from_wire(self.kind),
            self.param as i32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Normal,
    PlayerError,
    IllegalAction,
    InvalidFormat,
    InternalError,
    Other(u8),
}

impl ResultKind {
    pub fn from_wire(value: u8) -> Self {
        match value {
            0x00 => ResultKind::Normal,
            0x10 => ResultKind::PlayerError,
            0x11 => ResultKind::IllegalAction,
            0x12 => ResultKind::InvalidFormat,
            0x20 => ResultKind::InternalError,
            other => ResultKind::Other(other),
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            ResultKind::Normal => 0x00,
            ResultKind::PlayerError => 0x10,
            ResultKind::IllegalAction => 0x11,
            ResultKind::InvalidFormat => 0x12,
            ResultKind::InternalError => 0x20,
            ResultKind::Other(other) => other,
        }
    }
}

/// Terminal record sent by the judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub kind: ResultKind,
    pub winner: u8,
    pub scores: [i16; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    Action(Action),
    GameOver(GameResult),
}

pub async fn read_setup<R: AsyncRead + Unpin>(reader: &mut R) -> Result<GameSetup, ProtocolError> {
    let length = reader.read_u8().await?;
    let width = reader.read_u8().await?;
    let max_round = reader.read_i16().await?;
    let player = reader.read_u8().await?;
    if player > 1 {
        return Err(ProtocolError::InvalidPlayer(player));
    }
    if length < 2 || width < 2 {
        return Err(ProtocolError::InvalidGrid { length, width });
    }
    Ok(GameSetup {
        length,
        width,
        max_round,
        player,
    })
}

pub async fn write_setup<W: AsyncWrite + Unpin>(writer: &mut W, setup: &GameSetup) -> Result<(), ProtocolError> {
    writer.write_u8(setup.length).await?;
    writer.write_u8(setup.width).await?;
    writer.write_i16(setup.max_round).await?;
    writer.write_u8(setup.player).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_items<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<ItemRecord>, ProtocolError> {
    let _reserved = reader.read_u8().await?;
    let count = reader.read_i16().await?;
    if count < 0 {
        return Err(ProtocolError::NegativeCount(count));
    }

    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        records.push(ItemRecord {
            x: reader.read_u8().await?,
            y: reader.read_u8().await?,
            kind: reader.read_u8().await?,
            time: reader.read_i16().await?,
            param: reader.read_i16().await?,
        });
    }
    Ok(records)
}

pub async fn write_items<W: AsyncWrite + Unpin>(writer: &mut W, records: &[ItemRecord]) -> Result<(), ProtocolError> {
    let mut buf = Vec::with_capacity(3 + records.len() * 7);
    buf.push(0);
    buf.extend_from_slice(&(records.len() as i16).to_be_bytes());
    for record in records {
        buf.extend_from_slice(&[record.x, record.y, record.kind]);
        buf.extend_from_slice(&record.time.to_be_bytes());
        buf.extend_from_slice(&record.param.to_be_bytes());
    }
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_inbound<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Inbound, ProtocolError> {
    let opcode = reader.read_u8().await?;
    if opcode == RESULT_OPCODE {
        let kind = ResultKind::from_wire(reader.read_u8().await?);
        let winner = reader.read_u8().await?;
        let first = reader.read_i16().await?;
        let second = reader.read_i16().await?;
        return Ok(Inbound::GameOver(GameResult {
            kind,
            winner,
            scores: [first, second],
        }));
    }

    Action::from_code(opcode)
        .map(Inbound::Action)
        .ok_or(ProtocolError::UnknownOpcode(opcode))
}

pub async fn write_inbound<W: AsyncWrite + Unpin>(writer: &mut W, message: &Inbound) -> Result<(), ProtocolError> {
    match message {
        Inbound::Action(action) => writer.write_u8(action.code()).await?,
        Inbound::GameOver(result) => {
            let mut buf = vec![RESULT_OPCODE, result.kind.to_wire(), result.winner];
            buf.extend_from_slice(&result.scores[0].to_be_bytes());
            buf.extend_from_slice(&result.scores[1].to_be_bytes());
            writer.write_all(&buf).await?;
        }
    }
    writer.flush().await?;
    Ok(())
}

pub async fn read_action<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Action, ProtocolError> {
    let length = reader.read_i32().await?;
    if length != 1 {
        return Err(ProtocolError::FrameLength(length));
    }
    let code = reader.read_u8().await?;
    Action::from_code(code).ok_or(ProtocolError::UnknownOpcode(code))
}

pub async fn write_action<W: AsyncWrite + Unpin>(writer: &mut W, action: Action) -> Result<(), ProtocolError> {
    let mut frame = 1i32.to_be_bytes().to_vec();
    frame.push(action.code());
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::snakego::Direction;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_setup_bytes() {
        let (mut judge, mut client) = duplex(64);
        let setup = GameSetup {
            length: 16,
            width: 12,
            max_round: 300,
            player: 1,
        };
        write_setup(&mut judge, &setup).await.unwrap();

        let mut raw = [0u8; 5];
        client.read_exact(&mut raw).await.unwrap();
        assert_eq!(raw, [16, 12, 0x01, 0x2c, 1]);

        write_setup(&mut judge, &setup).await.unwrap();
        let decoded = read_setup(&mut client).await.unwrap();
        assert_eq!(decoded, setup);
        assert_eq!(decoded.config(), GameConfig::new(16, 12, 300));
    }

    #[tokio::test]
    async fn test_setup_rejects_bad_player() {
        let (mut judge, mut client) = duplex(64);
        judge.write_all(&[8, 8, 0, 10, 3]).await.unwrap();
        assert!(matches!(
            read_setup(&mut client).await,
            Err(ProtocolError::InvalidPlayer(3))
        ));
    }

    #[tokio::test]
    async fn test_setup_rejects_degenerate_grid() {
        for (length, width) in [(4, 0), (0, 4), (1, 1), (1, 8)] {
            let (mut judge, mut client) = duplex(64);
            judge.write_all(&[length, width, 0, 10, 0]).await.unwrap();
            match read_setup(&mut client).await {
                Err(ProtocolError::InvalidGrid { length: l, width: w }) => {
                    assert_eq!((l, w), (length, width));
                }
                other => panic!("expected invalid grid for {length}x{width}, got {other:?}"),
            }
        }

        let (mut judge, mut client) = duplex(64);
        judge.write_all(&[2, 2, 0, 10, 1]).await.unwrap();
        assert_eq!(read_setup(&mut client).await.unwrap().config(), GameConfig::new(2, 2, 10));
    }

    #[tokio::test]
    async fn test_item_list() {
        let (mut judge, mut client) = duplex(256);
        let records = vec![
            ItemRecord { x: 3, y: 4, kind: 0, time: 5, param: 2 },
            ItemRecord { x: 15, y: 0, kind: 2, time: -1, param: 300 },
        ];
        write_items(&mut judge, &records).await.unwrap();

        let decoded = read_items(&mut client).await.unwrap();
        assert_eq!(decoded, records);

        let item = decoded[1].into_item(7);
        assert_eq!(item.id, 7);
        assert_eq!(item.pos, GridPos::new(15, 0));
        assert_eq!(item.kind, ItemKind::Beam);
        assert_eq!(ItemRecord::from_item(&item), records[1]);
    }

    #[tokio::test]
    async fn test_negative_item_count() {
        let (mut judge, mut client) = duplex(64);
        judge.write_all(&[0, 0xff, 0xfe]).await.unwrap();
        assert!(matches!(
            read_items(&mut client).await,
            Err(ProtocolError::NegativeCount(-2))
        ));
    }

    #[tokio::test]
    async fn test_inbound_action_and_result() {
        let (mut judge, mut client) = duplex(64);
        let result = GameResult {
            kind: ResultKind::IllegalAction,
            winner: 1,
            scores: [12, -3],
        };
        write_inbound(&mut judge, &Inbound::Action(Action::Split)).await.unwrap();
        write_inbound(&mut judge, &Inbound::GameOver(result)).await.unwrap();

        assert_eq!(read_inbound(&mut client).await.unwrap(), Inbound::Action(Action::Split));
        assert_eq!(read_inbound(&mut client).await.unwrap(), Inbound::GameOver(result));
    }

    #[tokio::test]
    async fn test_unknown_inbound_opcode() {
        let (mut judge, mut client) = duplex(64);
        judge.write_u8(9).await.unwrap();
        assert!(matches!(
            read_inbound(&mut client).await,
            Err(ProtocolError::UnknownOpcode(9))
        ));
    }

    #[tokio::test]
    async fn test_action_frame() {
        let (mut client, mut judge) = duplex(64);
        write_action(&mut client, Action::Move(Direction::MinusY)).await.unwrap();

        let mut raw = [0u8; 5];
        judge.read_exact(&mut raw).await.unwrap();
        assert_eq!(raw, [0, 0, 0, 1, 4]);

        write_action(&mut client, Action::Fire).await.unwrap();
        assert_eq!(read_action(&mut judge).await.unwrap(), Action::Fire);
    }

    #[tokio::test]
    async fn test_malformed_action_frames() {
        let (mut client, mut judge) = duplex(64);
        client.write_all(&[0, 0, 0, 2, 1, 1]).await.unwrap();
        assert!(matches!(
            read_action(&mut judge).await,
            Err(ProtocolError::FrameLength(2))
        ));

        let (mut client, mut judge) = duplex(64);
        client.write_all(&[0, 0, 0, 1, 7]).await.unwrap();
        assert!(matches!(
            read_action(&mut judge).await,
            Err(ProtocolError::UnknownOpcode(7))
        ));
    }

    #[tokio::test]
    async fn test_result_kind_codes() {
        for code in [0x00, 0x10, 0x11, 0x12, 0x20, 0x33] {
            assert_eq!(ResultKind::from_wire(code).to_wire(), code);
        }
        assert_eq!(ResultKind::from_wire(0x12), ResultKind::InvalidFormat);
    }
}
