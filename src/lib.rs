// src/lib.rs

//! radarlance: watches remote JS/HTML resources and archives every distinct
//! version they go through.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
