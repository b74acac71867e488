pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod keymap;
pub mod prompt;
pub mod store;
pub mod template;
