pub mod archive;
pub mod bucket;
pub mod config;
pub mod lock;
pub mod naming;
pub mod prune;
pub mod reclaim;
pub mod run;
pub mod select;
pub mod verify;
pub mod warn;
pub mod window;
