use crate::models::piece::Piece;
use crate::repositories::errors::piece_repository_errors::PieceRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{DeleteRequest, PutRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_attribute_value, to_item};

// DynamoDB caps BatchWriteItem at 25 requests
const BATCH_WRITE_LIMIT: usize = 25;

// BatchWriteItem can succeed while leaving some requests unprocessed
// (throttling); those are resubmitted up to this many times per chunk
const MAX_BATCH_ATTEMPTS: usize = 3;

pub struct DynamoDbPieceRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbPieceRepository {
    pub fn new(client: Client) -> Self {
        let table_name =
            std::env::var("PIECES_TABLE").expect("PIECES_TABLE environment variable must be set");
        Self { client, table_name }
    }
}

#[async_trait]
pub trait PieceRepository: Send + Sync {
    /// Batch-write a set of pieces, normally the 32-record starting set.
    async fn create_pieces(&self, pieces: &[Piece]) -> Result<(), PieceRepositoryError>;

    async fn get_pieces(&self, game_id: &str) -> Result<Vec<Piece>, PieceRepositoryError>;

    /// Per-move mutation path for the rule engine.
    async fn update_piece(&self, piece: &Piece) -> Result<(), PieceRepositoryError>;

    /// Remove every piece of a session. Only called on session deletion;
    /// pieces are never destroyed independently.
    async fn delete_pieces(&self, game_id: &str) -> Result<(), PieceRepositoryError>;
}

impl DynamoDbPieceRepository {
    async fn batch_write(
        &self,
        requests: Vec<WriteRequest>,
    ) -> Result<(), PieceRepositoryError> {
        for chunk in requests.chunks(BATCH_WRITE_LIMIT) {
            let mut pending = chunk.to_vec();
            for _ in 0..MAX_BATCH_ATTEMPTS {
                if pending.is_empty() {
                    break;
                }
                let output = self
                    .client
                    .batch_write_item()
                    .request_items(&self.table_name, pending)
                    .send()
                    .await
                    .map_err(|e| PieceRepositoryError::DynamoDb(e.to_string()))?;
                pending = unprocessed_requests(output.unprocessed_items, &self.table_name);
            }
            if !pending.is_empty() {
                return Err(PieceRepositoryError::DynamoDb(format!(
                    "{} write requests still unprocessed after {} attempts",
                    pending.len(),
                    MAX_BATCH_ATTEMPTS
                )));
            }
        }
        Ok(())
    }
}

/// Pull this table's leftover requests out of a BatchWriteItem response. A
/// partially applied batch is not a success; the remainder must be resent.
fn unprocessed_requests(
    unprocessed: Option<std::collections::HashMap<String, Vec<WriteRequest>>>,
    table_name: &str,
) -> Vec<WriteRequest> {
    unprocessed
        .and_then(|mut tables| tables.remove(table_name))
        .unwrap_or_default()
}

#[async_trait]
impl PieceRepository for DynamoDbPieceRepository {
    async fn create_pieces(&self, pieces: &[Piece]) -> Result<(), PieceRepositoryError> {
        let mut requests = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let item =
                to_item(piece).map_err(|e| PieceRepositoryError::Serialization(e.to_string()))?;
            let put = PutRequest::builder()
                .set_item(Some(item))
                .build()
                .map_err(|e| PieceRepositoryError::Serialization(e.to_string()))?;
            requests.push(WriteRequest::builder().put_request(put).build());
        }
        self.batch_write(requests).await
    }

    async fn get_pieces(&self, game_id: &str) -> Result<Vec<Piece>, PieceRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("game_id = :game_id")
            .expression_attribute_values(
                ":game_id",
                to_attribute_value(game_id)
                    .map_err(|e| PieceRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| PieceRepositoryError::DynamoDb(e.to_string()))?;

        let mut pieces = Vec::new();
        if let Some(items) = output.items {
            for item in items {
                let piece: Piece = from_item(item)
                    .map_err(|e| PieceRepositoryError::Serialization(e.to_string()))?;
                pieces.push(piece);
            }
        }
        Ok(pieces)
    }

    async fn update_piece(&self, piece: &Piece) -> Result<(), PieceRepositoryError> {
        let item =
            to_item(piece).map_err(|e| PieceRepositoryError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| PieceRepositoryError::DynamoDb(e.to_string()))?;
        Ok(())
    }

    async fn delete_pieces(&self, game_id: &str) -> Result<(), PieceRepositoryError> {
        let pieces = self.get_pieces(game_id).await?;

        let mut requests = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            let delete = DeleteRequest::builder()
                .key(
                    "game_id",
                    to_attribute_value(&piece.game_id)
                        .map_err(|e| PieceRepositoryError::Serialization(e.to_string()))?,
                )
                .key(
                    "id",
                    to_attribute_value(&piece.id)
                        .map_err(|e| PieceRepositoryError::Serialization(e.to_string()))?,
                )
                .build()
                .map_err(|e| PieceRepositoryError::Serialization(e.to_string()))?;
            requests.push(WriteRequest::builder().delete_request(delete).build());
        }
        self.batch_write(requests).await
    }
}
