// src/handlers.rs

pub mod church;
pub mod event;
pub mod roster;
