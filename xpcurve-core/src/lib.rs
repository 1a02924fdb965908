#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;

pub mod util {
    pub mod atomic;
    pub mod hex;
}

pub mod codec;

pub mod archive;
pub mod version;

pub mod table {
    pub mod reward;
    pub mod xp;
}

pub mod curve;
pub mod gate;
pub mod record;
pub mod splice;

pub mod pipeline;

// Re-exports: stable API surface
pub use config::Config;
pub use pipeline::{Collaborators, RunOutcome, run};
