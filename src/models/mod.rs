// src/models/mod.rs

pub mod page;
pub mod user;
