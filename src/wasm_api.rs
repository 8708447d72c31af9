//! WASM API exports for JavaScript interop
//!
//! Only compiled when targeting wasm32.

#![cfg(target_arch = "wasm32")]

use bevy_math::Vec2;
use parking_lot::Mutex;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

use crate::config::{parse_scene, scene_to_json};
use crate::core::{Scene, TileSpec};
use crate::pick::resolve_pick;
use crate::runtime::run_scene;

fn js_error(report: error_stack::Report<crate::TilescopeError>) -> JsValue {
    JsValue::from_str(&format!("{report:?}"))
}

/// JavaScript-accessible scene wrapper
#[wasm_bindgen]
pub struct JsScene {
    scene: Arc<Mutex<Scene>>,
    canvas_id: String,
    started: bool,
}

#[wasm_bindgen]
impl JsScene {
    /// Create a scene from JSON
    ///
    /// # Arguments
    /// * `json` - JSON string representing the Scene
    /// * `canvas_id` - HTML canvas element ID (without #)
    #[wasm_bindgen(constructor)]
    pub fn new(json: &str, canvas_id: &str) -> Result<JsScene, JsValue> {
        let scene = parse_scene(json).map_err(js_error)?;
        Ok(JsScene {
            scene: Arc::new(Mutex::new(scene)),
            canvas_id: canvas_id.to_string(),
            started: false,
        })
    }

    /// Start the render loop. Only the first call has an effect.
    #[wasm_bindgen]
    pub fn start(&mut self) {
        if self.started {
            web_sys::console::warn_1(&"Scene already started".into());
            return;
        }
        let scene = self.scene.lock().clone();
        self.started = true;
        run_scene(scene, &self.canvas_id);
    }

    /// Replace the whole scene. Has no effect on a running render loop.
    #[wasm_bindgen]
    pub fn set_scene(&mut self, json: &str) -> Result<(), JsValue> {
        let scene = parse_scene(json).map_err(js_error)?;
        *self.scene.lock() = scene;
        Ok(())
    }

    /// Add one tile. Rejected if its coordinate or name is already taken.
    #[wasm_bindgen]
    pub fn add_tile(
        &mut self,
        column: i32,
        layer: u32,
        row: i32,
        name: Option<String>,
    ) -> Result<(), JsValue> {
        let spec = TileSpec {
            name,
            ..TileSpec::new(column, layer, row)
        };
        self.scene.lock().add_tile(spec).map_err(js_error)
    }

    /// Label of the tile under a pixel as seen from the scene's initial
    /// camera, or `undefined` when nothing is hit.
    #[wasm_bindgen]
    pub fn pick_label(&self, x: f32, y: f32, width: f32, height: f32) -> Result<Option<String>, JsValue> {
        let scene = self.scene.lock();
        let grid = scene.build_grid().map_err(js_error)?;
        let Some(rig) = scene.camera.rig(width / height) else {
            return Ok(None);
        };
        Ok(resolve_pick(Vec2::new(x, y), Vec2::new(width, height), &rig, grid.tiles())
            .map(|tile| tile.label()))
    }

    /// Tile centers as a flat `[x0, y0, z0, x1, ...]` array.
    #[wasm_bindgen]
    pub fn tile_centers(&self) -> Result<js_sys::Float32Array, JsValue> {
        let grid = self.scene.lock().build_grid().map_err(js_error)?;
        let flat: Vec<f32> = grid
            .tiles()
            .iter()
            .flat_map(|tile| tile.center().to_array())
            .collect();
        Ok(js_sys::Float32Array::from(flat.as_slice()))
    }

    /// Current scene as JSON
    #[wasm_bindgen]
    pub fn to_json(&self) -> Result<String, JsValue> {
        scene_to_json(&self.scene.lock()).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn canvas_id(&self) -> String {
        self.canvas_id.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn tile_count(&self) -> usize {
        self.scene.lock().tiles.len()
    }

    #[wasm_bindgen(getter)]
    pub fn is_started(&self) -> bool {
        self.started
    }
}
