use std::sync::Arc;

use tracing::info;

use crate::models::game::{Conclusion, Game, Winner};
use crate::models::piece::Piece;
use crate::repositories::game_repository::GameRepository;
use crate::repositories::piece_repository::PieceRepository;
use crate::services::errors::game_service_errors::GameServiceError;
use crate::services::errors::user_service_errors::UserServiceError;
use crate::services::user_service::UserService;

pub struct GameService {
    games: Arc<dyn GameRepository + Send + Sync>,
    pieces: Arc<dyn PieceRepository + Send + Sync>,
    users: Arc<UserService>,
}

impl GameService {
    pub fn new(
        games: Arc<dyn GameRepository + Send + Sync>,
        pieces: Arc<dyn PieceRepository + Send + Sync>,
        users: Arc<UserService>,
    ) -> Self {
        GameService {
            games,
            pieces,
            users,
        }
    }

    async fn check_user_exists(&self, user_id: &str) -> Result<(), GameServiceError> {
        self.users
            .get_user_by_id(user_id)
            .await
            .map_err(|e| match e {
                UserServiceError::UserNotFound => GameServiceError::UserNotFound,
                e => GameServiceError::RepositoryError(e.to_string()),
            })?;
        Ok(())
    }

    /// Open a new session. The host seat is taken; the away seat stays
    /// empty until `start_game`.
    pub async fn create_game(
        &self,
        host_id: &str,
        starting_time: u64,
        time_per_turn: u64,
    ) -> Result<Game, GameServiceError> {
        if host_id.is_empty() {
            return Err(GameServiceError::ValidationError(
                "Host ID cannot be empty".to_string(),
            ));
        }
        if starting_time == 0 {
            return Err(GameServiceError::ValidationError(
                "Starting time must be positive".to_string(),
            ));
        }
        self.check_user_exists(host_id).await?;

        let game = Game::new(host_id, starting_time, time_per_turn);
        self.games.create_game(&game).await?;
        info!("Created open game {} hosted by {}", game.id, host_id);
        Ok(game)
    }

    pub async fn get_game(&self, game_id: &str) -> Result<Game, GameServiceError> {
        self.games.get_game(game_id).await.map_err(Into::into)
    }

    pub async fn get_pieces(&self, game_id: &str) -> Result<Vec<Piece>, GameServiceError> {
        self.pieces.get_pieces(game_id).await.map_err(Into::into)
    }

    /// Seat the away player, persist the transition, and seed the starting
    /// piece set. The conditional write guarantees only one joiner wins the
    /// seat even if the entity check raced a concurrent start.
    pub async fn start_game(
        &self,
        game_id: &str,
        away_id: &str,
    ) -> Result<Game, GameServiceError> {
        if away_id.is_empty() {
            return Err(GameServiceError::ValidationError(
                "Away ID cannot be empty".to_string(),
            ));
        }
        self.check_user_exists(away_id).await?;

        let mut game = self.games.get_game(game_id).await?;
        game.start(away_id)?;
        self.games.start_game(&game).await?;
        self.pieces
            .create_pieces(&Piece::starting_set(&game.id))
            .await?;
        info!("Started game {} with away player {}", game.id, away_id);
        Ok(game)
    }

    /// Advance the turn by `delta` (only 1 is valid). The write is
    /// conditioned on the turn number that was read, so a concurrent
    /// advance surfaces as `Conflict` and is never retried here.
    pub async fn advance_turn(
        &self,
        game_id: &str,
        delta: i64,
    ) -> Result<Game, GameServiceError> {
        let mut game = self.games.get_game(game_id).await?;
        let read_turn = game.turn_number();
        game.advance_turn(delta)?;
        self.games.update_game_turn(&game, read_turn).await?;
        Ok(game)
    }

    /// Record the outcome of a finished game. Which outcome applies is the
    /// rule engine's call; this only performs the paired-field write.
    pub async fn conclude_game(
        &self,
        game_id: &str,
        winner: Winner,
        conclusion: Conclusion,
    ) -> Result<Game, GameServiceError> {
        let mut game = self.games.get_game(game_id).await?;
        let read_turn = game.turn_number();
        game.finish(winner, conclusion)?;
        self.games.update_game_turn(&game, read_turn).await?;
        info!("Concluded game {}: {:?} by {:?}", game.id, winner, conclusion);
        Ok(game)
    }

    /// Plain-field write for collaborators (clock adjustments, draw-offer
    /// flags). Carries no invariant beyond the session existing.
    pub async fn save_game(&self, game: &Game) -> Result<(), GameServiceError> {
        self.games.update_game(game).await.map_err(Into::into)
    }

    /// Delete a session and its piece records. This is the only sanctioned
    /// way pieces are destroyed.
    pub async fn delete_game(&self, game_id: &str) -> Result<(), GameServiceError> {
        self.pieces.delete_pieces(game_id).await?;
        self.games.delete_game(game_id).await?;
        info!("Deleted game {}", game_id);
        Ok(())
    }
}
