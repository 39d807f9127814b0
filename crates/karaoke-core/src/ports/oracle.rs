use crate::domain::Reference;

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
  #[error("oracle unreachable: {0}")]
  Unreachable(String),

  #[error("request rejected: {0}")]
  Rejected(String),

  #[error("internal error: {0}")]
  Internal(String),
}

/// A single prompt sent to the generative search service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
  pub prompt: String,
  /// Ask the service to ground the answer with a web search.
  pub grounded: bool,
  /// Ask the service for a JSON-only answer. The reply is still parsed
  /// leniently because the service does not always comply.
  pub expect_json: bool,
}

/// Raw answer: free text (maybe JSON, maybe prose around JSON) plus the
/// grounding links the service attached to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OracleReply {
  pub text: String,
  pub references: Vec<Reference>,
}

/// Port over the generative search service.
///
/// The service is a black box: text in, text out. Everything that makes
/// sense of the answer lives in [`crate::oracle_reply`] and the catalog
/// service, so adapters stay a thin transport.
#[async_trait::async_trait]
pub trait SongOracle: Send + Sync {
  async fn generate(&self, request: &OracleRequest) -> Result<OracleReply, OracleError>;
}
