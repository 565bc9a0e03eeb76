pub mod analysis;
pub mod board;
pub mod config;
pub mod error;
pub mod history;
pub mod moves;
pub mod piece;
pub mod rules;
pub mod session;

#[cfg(target_arch = "wasm32")]
mod wasm_api;
