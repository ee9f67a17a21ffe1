pub mod api;
pub mod flash;
pub mod models;
pub mod tally;
