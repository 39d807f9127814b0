pub mod cache;
pub mod connectivity;
pub mod oracle;
pub mod output;

pub use cache::{CacheError, OFFLINE_CAPACITY, SongCache};
pub use connectivity::{Connectivity, ConnectivitySignal, ConnectivitySubscription};
pub use oracle::{OracleError, OracleReply, OracleRequest, SongOracle};
pub use output::{InstrumentalOutput, PlaybackError};
