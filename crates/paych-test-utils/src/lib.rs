pub mod helpers;
pub mod mock_chain;

pub use helpers::*;
pub use mock_chain::MockChain;
