pub mod a2a;
pub mod banner;
pub mod bridge;
pub mod commands;
pub mod config;
pub mod consts;
pub mod error;
pub mod events;
pub mod spinner;
pub mod telegram;
