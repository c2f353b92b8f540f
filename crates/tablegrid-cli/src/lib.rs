//! Building blocks of the `tgrid` command-line tool

pub mod demo;
pub mod render;
pub mod script;

pub use render::TextRenderer;
pub use script::Session;
