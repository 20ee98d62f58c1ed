pub mod codec;
pub mod filter;
pub mod shared;

pub use filter::{BloomFilterCore, FilterState};
pub use shared::SharedFilter;
