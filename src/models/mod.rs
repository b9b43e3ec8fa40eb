// src/models/mod.rs
pub mod auth;
pub mod settings;
pub mod video;
pub mod youtube;
