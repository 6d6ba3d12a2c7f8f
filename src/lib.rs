// Library for tests to access modules

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod routes;
pub mod sample_repo;
pub mod version;
