pub mod compose;
pub mod cursor;
pub mod decode;
mod error;
pub mod post;
pub mod session;
pub mod source;
pub mod store;
pub mod util;

pub use compose::Draft;
pub use cursor::{Direction, FetchPermit, PaginationCursor};
pub use decode::{decode, decode_many, Decoder, DecoderConfig};
pub use error::*;
pub use post::{Link, PostRecord};
pub use session::{FeedEvent, FeedSession};
pub use source::{FeedSource, Publisher};
pub use store::FeedStore;
