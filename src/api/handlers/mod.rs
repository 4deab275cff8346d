pub mod health;
pub mod tally;
