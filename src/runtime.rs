use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;

use crate::core::Scene;
use crate::render::{SceneRes, TileScenePlugin};

pub const DEFAULT_LOG_FILTER: &str = "info,wgpu=error,naga=warn";

#[derive(Clone, Debug)]
pub struct RunOptions {
    /// `tracing` env-filter directives.
    pub log_filter: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn window_title(scene: &Scene) -> String {
    scene.title.clone().unwrap_or_else(|| "tilescope".to_string())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn run_scene(scene: Scene) {
    run_scene_with(scene, RunOptions::default());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn run_scene_with(scene: Scene, options: RunOptions) {
    let bg = scene.background;
    App::new()
        .insert_resource(ClearColor(bg.into()))
        .add_plugins((
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: window_title(&scene),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: options.log_filter,
                    level: Level::INFO,
                    ..default()
                }),
            TileScenePlugin,
        ))
        .insert_resource(SceneRes::new(scene))
        .run();
}

#[cfg(target_arch = "wasm32")]
pub fn run_scene(scene: Scene, canvas_id: &str) {
    let bg = scene.background;
    App::new()
        .insert_resource(ClearColor(bg.into()))
        .add_plugins((
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: window_title(&scene),
                        canvas: Some(format!("#{}", canvas_id)),
                        fit_canvas_to_parent: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: DEFAULT_LOG_FILTER.to_string(),
                    level: Level::INFO,
                    ..default()
                }),
            TileScenePlugin,
        ))
        .insert_resource(SceneRes::new(scene))
        .run();
}
