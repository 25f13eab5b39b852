use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::DecodeError;

/// One of the two seats in a game. Stored as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> u8 {
        match side {
            Side::Home => 1,
            Side::Away => 2,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Side::Home),
            2 => Ok(Side::Away),
            code => Err(DecodeError {
                type_name: "Side",
                code,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Winner {
    NotComplete,
    Home,
    Away,
    Draw,
}

impl From<Winner> for u8 {
    fn from(winner: Winner) -> u8 {
        match winner {
            Winner::NotComplete => 1,
            Winner::Home => 2,
            Winner::Away => 3,
            Winner::Draw => 4,
        }
    }
}

impl TryFrom<u8> for Winner {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Winner::NotComplete),
            2 => Ok(Winner::Home),
            3 => Ok(Winner::Away),
            4 => Ok(Winner::Draw),
            code => Err(DecodeError {
                type_name: "Winner",
                code,
            }),
        }
    }
}

/// The rule-based reason a completed game ended, distinct from who won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Conclusion {
    NotComplete,
    Checkmate,
    Resign,
    Time,
    Stalemate,
    ThreefoldRepetition,
    FiftyMoveRule,
    AgreedDraw,
}

impl From<Conclusion> for u8 {
    fn from(conclusion: Conclusion) -> u8 {
        match conclusion {
            Conclusion::NotComplete => 1,
            Conclusion::Checkmate => 2,
            Conclusion::Resign => 3,
            Conclusion::Time => 4,
            Conclusion::Stalemate => 5,
            Conclusion::ThreefoldRepetition => 6,
            Conclusion::FiftyMoveRule => 7,
            Conclusion::AgreedDraw => 8,
        }
    }
}

impl TryFrom<u8> for Conclusion {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Conclusion::NotComplete),
            2 => Ok(Conclusion::Checkmate),
            3 => Ok(Conclusion::Resign),
            4 => Ok(Conclusion::Time),
            5 => Ok(Conclusion::Stalemate),
            6 => Ok(Conclusion::ThreefoldRepetition),
            7 => Ok(Conclusion::FiftyMoveRule),
            8 => Ok(Conclusion::AgreedDraw),
            code => Err(DecodeError {
                type_name: "Conclusion",
                code,
            }),
        }
    }
}

#[derive(Debug)]
pub enum GameError {
    InvalidTurnDelta(i64),
    AlreadyStarted,
    IncompleteOutcome,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::InvalidTurnDelta(delta) => {
                write!(f, "Turn can only advance by exactly 1, got {}", delta)
            }
            GameError::AlreadyStarted => write!(f, "Game already has an away player"),
            GameError::IncompleteOutcome => {
                write!(f, "Winner and conclusion must both be set to finish a game")
            }
        }
    }
}

impl std::error::Error for GameError {}

/// A game session. The session may be in any of the following states:
///   1. Open - the host is waiting for a second player; `away_id` is unset.
///   2. In progress - `start` has been called with the away player.
///   3. Completed - winner and conclusion are set and `ended_at` is stamped.
///
/// `turn_number` and `current_turn` are private: `advance_turn` is the only
/// way to move them, so the pair can never drift apart. Clock countdown is
/// not performed here; an external scheduler reads `last_turn` and writes
/// `home_time`/`away_time` back through the plain update path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub host_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_id: Option<String>,
    current_turn: Side,
    turn_number: u32,
    pub mode: u8,
    pub starting_time: u64,
    pub time_per_turn: u64,
    pub home_time: u64,
    pub away_time: u64,
    pub home_offering_draw: bool,
    pub away_offering_draw: bool,
    pub winner: Winner,
    pub conclusion: Conclusion,
    pub opened_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub last_turn: Option<DateTime<Utc>>,
}

impl Game {
    pub fn new(host_id: &str, starting_time: u64, time_per_turn: u64) -> Self {
        Game {
            id: Uuid::new_v4().to_string(),
            host_id: host_id.to_string(),
            away_id: None,
            current_turn: Side::Home,
            turn_number: 1,
            mode: 1, // only valid value for now
            starting_time,
            time_per_turn,
            home_time: starting_time,
            away_time: starting_time,
            home_offering_draw: false,
            away_offering_draw: false,
            winner: Winner::NotComplete,
            conclusion: Conclusion::NotComplete,
            opened_at: Utc::now(),
            started_at: None,
            ended_at: None,
            last_turn: None,
        }
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn current_turn(&self) -> Side {
        self.current_turn
    }

    pub fn is_open(&self) -> bool {
        self.away_id.is_none()
    }

    pub fn is_in_progress(&self) -> bool {
        self.away_id.is_some() && !self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.winner != Winner::NotComplete
    }

    /// Seat the away player and stamp `started_at`/`last_turn`. Fails if the
    /// seat is already taken; nothing is mutated in that case.
    pub fn start(&mut self, away_id: &str) -> Result<(), GameError> {
        if self.away_id.is_some() {
            return Err(GameError::AlreadyStarted);
        }
        let now = Utc::now();
        self.away_id = Some(away_id.to_string());
        self.started_at = Some(now);
        self.last_turn = Some(now);
        Ok(())
    }

    /// Advance the turn. Only a delta of exactly 1 is accepted; the turn
    /// number and the side to move change together or not at all.
    pub fn advance_turn(&mut self, delta: i64) -> Result<(), GameError> {
        if delta != 1 {
            return Err(GameError::InvalidTurnDelta(delta));
        }
        self.turn_number += 1;
        self.current_turn = self.current_turn.opposite();
        Ok(())
    }

    /// Record the outcome. Winner and conclusion transition together, so
    /// passing a not-complete value for either is rejected.
    pub fn finish(&mut self, winner: Winner, conclusion: Conclusion) -> Result<(), GameError> {
        if winner == Winner::NotComplete || conclusion == Conclusion::NotComplete {
            return Err(GameError::IncompleteOutcome);
        }
        self.winner = winner;
        self.conclusion = conclusion;
        self.ended_at = Some(Utc::now());
        Ok(())
    }
}
