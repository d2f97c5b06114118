pub mod auth;
pub mod church;
pub mod event;
