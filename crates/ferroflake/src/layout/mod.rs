mod builder;
mod components;
mod config;
mod view;

pub use builder::*;
pub use components::*;
pub use config::*;
pub use view::*;
