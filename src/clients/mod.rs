pub mod eosio;
pub mod nodeos;
pub mod traits;

pub use nodeos::NodeosClient;
pub use traits::{ChainClient, Row, TransactionResult};
