// Shared helpers for integration tests; each test binary uses a subset
#![allow(dead_code)]

pub mod db;
pub mod factories;
pub mod memory_store;
