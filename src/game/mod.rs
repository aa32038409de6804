pub mod traits;

pub use traits::{Camp, GameError, ItemId, Rejection, SnakeId, Strategy};
