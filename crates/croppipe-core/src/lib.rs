pub mod aspect;
pub mod config;
pub mod consts;
pub mod display;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod record;
pub mod selector;
pub mod workspace;
