pub mod config;
pub mod core;
pub mod grid;
pub mod pick;
pub mod render;
pub mod runtime;
pub mod scene;
#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TilescopeError {
    #[error("invalid tile label: {0}")]
    Label(String),

    #[error("invalid grid: {0}")]
    Grid(String),

    #[error("invalid scene configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, error_stack::Report<TilescopeError>>;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

pub mod prelude {
    pub use crate::core::*;
    pub use crate::grid::*;
    pub use crate::pick::*;
    pub use crate::render::TileScenePlugin;
    pub use crate::runtime::*;
    pub use crate::scene::*;
}
