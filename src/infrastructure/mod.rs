pub mod connectivity;
pub mod remote;
pub mod storage;
