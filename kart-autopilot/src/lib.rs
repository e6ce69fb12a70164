pub mod arena;
pub mod benchmark;
pub mod car;
pub mod config;
pub mod items;
pub mod runner;
pub mod util;
