//! Keyboard navigation and fullscreen presenting for markdown slide decks.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod deck;
pub mod logging;
pub mod nav;
pub mod parser;
pub mod theme;
