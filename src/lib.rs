pub use crate::{
    buffer::Buffer, config::Config, controller::Controller, error::Error, row::HlClass, row::Row,
    syntax::SyntaxConf,
};

pub mod ansi_escape;
mod append_buffer;
mod buffer;
mod config;
mod controller;
mod error;
mod prompt;
mod row;
mod syntax;
mod terminal;
mod viewport;
