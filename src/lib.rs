pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod middleware;
pub mod orders;
pub mod payments;

#[cfg(test)]
mod test_util;

pub use api::build_app;
pub use db::connect;
