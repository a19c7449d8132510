// Navigation bar actions: sign-out and the destructive clear-all.

pub mod clear;
pub mod handlers;

pub use clear::{clear_all_data, ClearError, ClearReport};
