//! devns - mint names on an on-chain name registry from the terminal

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod seed;
pub mod session;
pub mod ui;
