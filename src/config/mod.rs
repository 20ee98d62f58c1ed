pub mod filter;
pub mod server;
pub mod settings;
pub mod storage;
