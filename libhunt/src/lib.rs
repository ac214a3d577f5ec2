pub mod catalog;
pub mod error;
pub mod oplog;
pub mod record;
pub mod score;
pub mod store;

pub use error::HuntError;
pub use record::{RECORD_WIDTH, Treasure, TreasureFields};
pub use store::HuntStore;
