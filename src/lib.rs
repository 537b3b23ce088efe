//! The backend for the lodge's chore schedule: members, work jobs, trades
//! and fines, administered over GraphQL.

pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod models;
pub mod util;
