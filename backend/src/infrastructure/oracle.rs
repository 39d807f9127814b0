use async_trait::async_trait;
use karaoke_core::ports::{OracleError, OracleReply, OracleRequest, SongOracle};

/// Oracle used when no generative service is wired in. Every call fails,
/// so the catalog answers from the local cache.
#[derive(Debug, Clone, Default)]
pub struct DisconnectedOracle;

#[async_trait]
impl SongOracle for DisconnectedOracle {
  async fn generate(&self, request: &OracleRequest) -> Result<OracleReply, OracleError> {
    tracing::debug!(grounded = request.grounded, "oracle call without a transport");
    Err(OracleError::Unreachable("no oracle transport configured".to_string()))
  }
}
