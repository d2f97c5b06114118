// src/services.rs

pub mod auth;
pub mod church_directory;
pub mod church_service;
pub mod conflict;
pub mod event_query_service;
pub mod event_service;
pub mod roster_service;
pub mod time_window;
