use crate::models::game::Game;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_attribute_value, to_item};

pub struct DynamoDbGameRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbGameRepository {
    pub fn new(client: Client) -> Self {
        let table_name =
            std::env::var("GAMES_TABLE").expect("GAMES_TABLE environment variable must be set");
        Self { client, table_name }
    }
}

/// Every mutation is one conditional write on the session's item, so the
/// read-modify-write is indivisible with respect to concurrent callers.
#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError>;

    async fn get_game(&self, game_id: &str) -> Result<Game, GameRepositoryError>;

    /// Persist the start transition. Fails with `Conflict` if the stored
    /// item already has an away seat, so only one joiner can claim it.
    async fn start_game(&self, game: &Game) -> Result<(), GameRepositoryError>;

    /// Persist a turn-coupled mutation. The write only lands if the stored
    /// turn number still matches the one the caller read.
    async fn update_game_turn(&self, game: &Game, read_turn: u32)
        -> Result<(), GameRepositoryError>;

    /// Plain-field update for collaborator writes (clock adjustments, draw
    /// offers). No optimistic check beyond the item existing.
    async fn update_game(&self, game: &Game) -> Result<(), GameRepositoryError>;

    async fn delete_game(&self, game_id: &str) -> Result<(), GameRepositoryError>;
}

impl DynamoDbGameRepository {
    async fn conditional_put(
        &self,
        game: &Game,
        request: aws_sdk_dynamodb::operation::put_item::builders::PutItemFluentBuilder,
    ) -> Result<(), GameRepositoryError> {
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        let result = request.set_item(Some(item)).send().await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                if is_conditional_check_failure(&e) {
                    Err(GameRepositoryError::Conflict)
                } else {
                    Err(GameRepositoryError::DynamoDb(e.to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl GameRepository for DynamoDbGameRepository {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;
        Ok(())
    }

    async fn get_game(&self, game_id: &str) -> Result<Game, GameRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(
                "id",
                to_attribute_value(game_id)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;
        if let Some(item) = output.item {
            let game: Game =
                from_item(item).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
            Ok(game)
        } else {
            Err(GameRepositoryError::NotFound)
        }
    }

    async fn start_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        // open games have no away_id attribute at all, so the second joiner's
        // write fails its condition check
        let request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .condition_expression("attribute_exists(id) AND attribute_not_exists(away_id)");
        self.conditional_put(game, request).await
    }

    async fn update_game_turn(
        &self,
        game: &Game,
        read_turn: u32,
    ) -> Result<(), GameRepositoryError> {
        let request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .condition_expression("turn_number = :read_turn")
            .expression_attribute_values(
                ":read_turn",
                to_attribute_value(read_turn)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?,
            );
        self.conditional_put(game, request).await
    }

    async fn update_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .condition_expression("attribute_exists(id)");
        self.conditional_put(game, request).await
    }

    async fn delete_game(&self, game_id: &str) -> Result<(), GameRepositoryError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(
                "id",
                to_attribute_value(game_id)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;
        Ok(())
    }
}

fn is_conditional_check_failure(error: &SdkError<PutItemError>) -> bool {
    if let SdkError::ServiceError(service_err) = error {
        service_err.err().is_conditional_check_failed_exception()
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game::Side;

    #[test]
    fn test_open_game_item_has_no_away_attribute() {
        let game = Game::new("host", 600, 5);

        let item: serde_dynamo::Item = to_item(&game).unwrap();
        let map: std::collections::HashMap<String, serde_dynamo::AttributeValue> = item.into();

        // the start condition `attribute_not_exists(away_id)` relies on this
        assert!(!map.contains_key("away_id"));
        assert!(map.contains_key("turn_number"));
        assert!(map.contains_key("current_turn"));
    }

    #[test]
    fn test_started_game_item_has_away_attribute() {
        let mut game = Game::new("host", 600, 5);
        game.start("away").unwrap();

        let item: serde_dynamo::Item = to_item(&game).unwrap();
        let map: std::collections::HashMap<String, serde_dynamo::AttributeValue> = item.into();

        assert!(matches!(
            map.get("away_id"),
            Some(serde_dynamo::AttributeValue::S(id)) if id == "away"
        ));
    }

    #[test]
    fn test_enums_stored_as_numbers() {
        let mut game = Game::new("host", 600, 5);
        game.advance_turn(1).unwrap();

        let item: serde_dynamo::Item = to_item(&game).unwrap();
        let map: std::collections::HashMap<String, serde_dynamo::AttributeValue> = item.into();

        assert!(matches!(
            map.get("current_turn"),
            Some(serde_dynamo::AttributeValue::N(n)) if n == "2"
        ));
        assert!(matches!(
            map.get("winner"),
            Some(serde_dynamo::AttributeValue::N(n)) if n == "1"
        ));

        let restored: Game = from_item(serde_dynamo::Item::from(map)).unwrap();
        assert_eq!(restored.current_turn(), Side::Away);
        assert_eq!(restored.turn_number(), 2);
    }
}
