pub mod cli;
pub mod core;
pub mod dispatch;
pub mod providers;
pub mod session;
pub mod storage;
pub mod timer;

#[cfg(test)]
pub mod test_utils;
