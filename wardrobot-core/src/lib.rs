// src/lib.rs

pub mod db;
pub mod http;
pub mod processing;
pub mod repositories;
pub mod services;
pub mod storage;

pub use db::Database;
pub use wardrobot_common::Error;
