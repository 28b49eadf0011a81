pub mod duration;
pub mod events;
pub mod model;

pub use duration::parse_duration;
pub use events::AuctionEvent;
pub use model::{Auction, AuctionId, AuctionStatus, Bid, UserId};
