//! Scene files.
//!
//! A scene is plain JSON matching [`Scene`]; every field is optional, so `{}`
//! describes an empty grid seen from the default camera.

use error_stack::{Report, ResultExt};
use std::path::Path;

use crate::core::Scene;
use crate::{Result, TilescopeError};

/// Parse and validate a scene from JSON text.
pub fn parse_scene(json: &str) -> Result<Scene> {
    let scene: Scene = serde_json::from_str(json)
        .change_context(TilescopeError::Config("malformed scene JSON".into()))?;
    scene.validate()?;
    Ok(scene)
}

/// Read, parse and validate a scene file.
pub fn load_scene(path: impl AsRef<Path>) -> Result<Scene> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| {
        Report::new(e).change_context(TilescopeError::Config(format!(
            "cannot read {}",
            path.display()
        )))
    })?;
    parse_scene(&json).change_context(TilescopeError::Config(format!(
        "in scene file {}",
        path.display()
    )))
}

pub fn scene_to_json(scene: &Scene) -> Result<String> {
    serde_json::to_string_pretty(scene)
        .change_context(TilescopeError::Config("cannot serialize scene".into()))
}
