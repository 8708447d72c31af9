//! Tilescope viewer
//!
//! Opens a window showing a tile grid, either loaded from a scene file or
//! filled from the command line.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use clap::Parser;
    use error_stack::ResultExt;
    use tilescope::config::load_scene;
    use tilescope::core::Scene;
    use tilescope::runtime::{DEFAULT_LOG_FILTER, RunOptions, run_scene_with};
    use tilescope::scene::scene;
    use tilescope::{Result, TilescopeError};

    /// Tile grid viewer with hover picking
    #[derive(Parser, Clone, Debug)]
    #[command(name = "tilescope")]
    #[command(about = "Show a 3D tile grid and label the tile under the pointer")]
    pub struct Config {
        /// Scene file (JSON). When absent a grid is built from the size flags
        #[arg(long)]
        pub scene: Option<PathBuf>,

        /// Columns of the generated grid
        #[arg(long, default_value = "5")]
        pub columns: u32,

        /// Rows of the generated grid
        #[arg(long, default_value = "5")]
        pub rows: u32,

        /// Layers of the generated grid
        #[arg(long, default_value = "1")]
        pub layers: u32,

        /// Tile edge length of the generated grid
        #[arg(long, default_value = "1.0")]
        pub tile_size: f32,

        /// Name of the tile the camera should target
        #[arg(long)]
        pub focus: Option<String>,

        /// Hide the hover tooltip
        #[arg(long)]
        pub no_tooltip: bool,

        /// Hide the reset-view button
        #[arg(long)]
        pub no_reset_button: bool,

        /// Draw a box around the grid bounds
        #[arg(long)]
        pub bounds: bool,

        /// Draw the bounds box around this named tile only
        #[arg(long, value_name = "NAME")]
        pub bounds_of: Option<String>,

        /// Show each tile's coordinate label above it
        #[arg(long)]
        pub tile_labels: bool,

        /// Log filter directives
        #[arg(long, default_value = DEFAULT_LOG_FILTER)]
        pub log_filter: String,
    }

    impl Config {
        pub fn scene(&self) -> Result<Scene> {
            let mut scene = match &self.scene {
                Some(path) => load_scene(path)?,
                None => {
                    let mut builder = scene().tile_size(self.tile_size).layer_height(self.tile_size);
                    for layer in 0..self.layers {
                        builder = builder.layer(layer, self.columns, self.rows);
                    }
                    builder.frame_grid().build()?
                }
            };

            if self.focus.is_some() {
                scene.focus = self.focus.clone();
            }
            if self.no_tooltip {
                scene.overlay.tooltip = false;
            }
            if self.no_reset_button {
                scene.overlay.reset_button = false;
            }
            if self.bounds {
                scene.overlay.bounds_helper = true;
            }
            if let Some(name) = &self.bounds_of {
                scene.overlay.bounds_helper = true;
                scene.overlay.bounds_target = Some(name.clone());
            }
            if self.tile_labels {
                scene.overlay.tile_labels = true;
            }
            Ok(scene)
        }
    }

    pub fn main() -> Result<()> {
        let config = Config::parse();
        let scene = config
            .scene()
            .change_context(TilescopeError::Config("cannot prepare scene".into()))?;

        run_scene_with(
            scene,
            RunOptions {
                log_filter: config.log_filter,
            },
        );
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> tilescope::Result<()> {
    cli::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
