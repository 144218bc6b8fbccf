// src/lib.rs

//! bookwatch: catalogue ingestion with change tracking

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
