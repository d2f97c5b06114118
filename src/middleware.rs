// src/middleware.rs

pub mod auth;
pub mod church_code;
