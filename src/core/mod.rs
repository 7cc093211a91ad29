pub mod advance;
pub mod backlog;
pub mod config;
pub mod measure;
pub mod presenter;
pub mod reveal;
pub mod scripted;
pub mod sequencer;
pub mod source;
