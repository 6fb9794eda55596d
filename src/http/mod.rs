pub mod activities;
pub mod health;
pub mod players;
pub mod routes;
pub mod stats;
