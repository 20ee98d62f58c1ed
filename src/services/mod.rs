pub mod bloom;
pub mod hash;
pub mod metrics;
pub mod storage;
