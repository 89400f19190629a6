//! Query modules, one per table family. Every function takes a borrowed
//! `Connection` so the engine decides writer vs reader.

pub mod accounts;
pub mod audits;
pub mod shares;
pub mod usage;
