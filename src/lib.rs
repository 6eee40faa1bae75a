pub mod config;
pub mod error;
pub mod event;
pub mod hand;
pub mod pipeline;
pub mod protocol;
pub mod sink;
pub mod tracker;
