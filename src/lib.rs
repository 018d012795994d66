//! Creature catalog tooling built around a turn-based battle simulator.

pub mod battle;
pub mod cli;
pub mod config;
pub mod data;
pub mod server;
