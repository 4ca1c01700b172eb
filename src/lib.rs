pub mod audio;
pub mod clock;
pub mod combo;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;
pub mod persistence;
pub mod powerups;
pub mod snapshot;
pub mod state;
pub mod waves;
