pub mod config;
pub mod controller;
pub mod fetch;
pub mod filter;
pub mod loader;
pub mod model;
pub mod output;
pub mod render;
pub mod traffic;
