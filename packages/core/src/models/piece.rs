use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::game::Side;
use crate::models::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl From<PieceType> for u8 {
    fn from(piece_type: PieceType) -> u8 {
        match piece_type {
            PieceType::Pawn => 1,
            PieceType::Rook => 2,
            PieceType::Knight => 3,
            PieceType::Bishop => 4,
            PieceType::Queen => 5,
            PieceType::King => 6,
        }
    }
}

impl TryFrom<u8> for PieceType {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(PieceType::Pawn),
            2 => Ok(PieceType::Rook),
            3 => Ok(PieceType::Knight),
            4 => Ok(PieceType::Bishop),
            5 => Ok(PieceType::Queen),
            6 => Ok(PieceType::King),
            code => Err(DecodeError {
                type_name: "PieceType",
                code,
            }),
        }
    }
}

/// One piece on the board of one game session. Each record is a DynamoDB
/// item partitioned by `game_id` with `id` as the sort key, so a session's
/// pieces are a single partition. Per-move mutation is the rule engine's
/// job; this layer only seeds and stores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piece {
    pub game_id: String,
    pub id: String,
    pub piece_type: PieceType,
    pub file: u8,
    pub rank: u8,
    pub side: Side,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(game_id: &str, piece_type: PieceType, file: u8, rank: u8, side: Side) -> Self {
        Piece {
            game_id: game_id.to_string(),
            id: Uuid::new_v4().to_string(),
            piece_type,
            file,
            rank,
            side,
            has_moved: false,
        }
    }

    /// The standard opening arrangement for one session: 16 pieces per side,
    /// files and ranks 1-based. Home plays up from ranks 1 and 2.
    pub fn starting_set(game_id: &str) -> Vec<Piece> {
        const BACK_RANK: [PieceType; 8] = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        let mut pieces = Vec::with_capacity(32);
        for (side, back_rank, pawn_rank) in [(Side::Home, 1, 2), (Side::Away, 8, 7)] {
            for (i, piece_type) in BACK_RANK.iter().enumerate() {
                pieces.push(Piece::new(
                    game_id,
                    *piece_type,
                    i as u8 + 1,
                    back_rank,
                    side,
                ));
            }
            for file in 1..=8 {
                pieces.push(Piece::new(game_id, PieceType::Pawn, file, pawn_rank, side));
            }
        }
        pieces
    }
}
