#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod road;

use std::fmt;

use geom::{GeomMesh, GeomMeshDiagnostics, Point3};
use road::{
    ChainError, ControlPointChain, ControlPointGraph, DebugDrawBatch, PointId, RoadSettings,
    SettingsError, generate_road_with_debug,
};
use thiserror::Error;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // a host may already have installed its own logger
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Errors surfaced by [`RoadEngine`]. Generation itself never fails.
#[derive(Debug, Error)]
pub enum RoadError {
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Editing session for a set of road chains.
///
/// Edits only touch the control-point graph. [`regenerate`](Self::regenerate)
/// rebuilds the mesh from scratch and replaces the previous one wholesale.
#[wasm_bindgen]
pub struct RoadEngine {
    graph: ControlPointGraph,
    settings: RoadSettings,
    mesh: GeomMesh,
    diagnostics: GeomMeshDiagnostics,
    debug: DebugDrawBatch,
    dirty: bool,
}

#[wasm_bindgen]
impl RoadEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> RoadEngine {
        RoadEngine {
            graph: ControlPointGraph::new(),
            settings: RoadSettings::default(),
            mesh: GeomMesh::default(),
            diagnostics: GeomMeshDiagnostics::default(),
            debug: DebugDrawBatch::new(),
            dirty: false,
        }
    }

    /// Replace the settings with a plain JS object (camelCase keys, missing
    /// keys take their defaults).
    #[wasm_bindgen]
    pub fn set_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        let settings: RoadSettings = serde_wasm_bindgen::from_value(settings)
            .map_err(|err| to_js_error(RoadError::Serialization(err.to_string())))?;
        self.apply_settings(settings).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn settings(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.settings).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Start a new chain. Returns the point id.
    #[wasm_bindgen]
    pub fn add_point(&mut self, x: f64, y: f64, z: f64) -> Result<usize, JsValue> {
        let id = self.graph.add_point(Point3::new(x, y, z)).map_err(to_js_error)?;
        self.dirty = true;
        Ok(id.0)
    }

    /// Extend the chain ending at `after`. Returns the new point id.
    #[wasm_bindgen]
    pub fn append_point(&mut self, after: usize, x: f64, y: f64, z: f64) -> Result<usize, JsValue> {
        let id = self
            .graph
            .append_point(PointId(after), Point3::new(x, y, z))
            .map_err(to_js_error)?;
        self.dirty = true;
        Ok(id.0)
    }

    #[wasm_bindgen]
    pub fn move_point(&mut self, id: usize, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.graph
            .move_point(PointId(id), Point3::new(x, y, z))
            .map_err(to_js_error)?;
        self.dirty = true;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn remove_point(&mut self, id: usize) -> Result<(), JsValue> {
        self.graph.remove_point(PointId(id)).map_err(to_js_error)?;
        self.dirty = true;
        Ok(())
    }

    /// Link the tail of the chain containing `id` back to its head.
    #[wasm_bindgen]
    pub fn close_chain(&mut self, id: usize) -> Result<(), JsValue> {
        self.graph.close_chain(PointId(id)).map_err(to_js_error)?;
        self.dirty = true;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn point_count(&self) -> usize {
        self.graph.len()
    }

    /// Rebuild the mesh if anything changed since the last call. Returns the
    /// triangle count.
    #[wasm_bindgen]
    pub fn regenerate(&mut self) -> usize {
        if self.dirty {
            self.rebuild();
        }
        self.mesh.triangle_count()
    }

    /// Flat `[x, y, z, ...]` vertex positions.
    #[wasm_bindgen]
    pub fn mesh_positions(&self) -> Vec<f64> {
        self.mesh.positions_flat().to_vec()
    }

    #[wasm_bindgen]
    pub fn mesh_indices(&self) -> Vec<u32> {
        self.mesh.indices.clone()
    }

    #[wasm_bindgen]
    pub fn mesh_normals(&self) -> Vec<f64> {
        self.mesh.normals_flat().map(<[f64]>::to_vec).unwrap_or_default()
    }

    #[wasm_bindgen]
    pub fn mesh_uvs(&self) -> Vec<f64> {
        self.mesh.uvs_flat().map(<[f64]>::to_vec).unwrap_or_default()
    }

    /// True when the vertex count needs 32-bit indices.
    #[wasm_bindgen]
    pub fn needs_u32_indices(&self) -> bool {
        self.mesh.index_format() == geom::IndexFormat::U32
    }

    #[wasm_bindgen]
    pub fn diagnostics(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.diagnostics).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Lines and points of the last generation, empty unless
    /// `debugVisualization` is on.
    #[wasm_bindgen]
    pub fn debug_draw(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.debug).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl Default for RoadEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RoadEngine {
    /// Validates and stores `settings`. The mesh is rebuilt on the next
    /// [`regenerate`](Self::regenerate).
    pub fn apply_settings(&mut self, settings: RoadSettings) -> Result<(), RoadError> {
        settings.validate()?;
        self.settings = settings;
        self.dirty = true;
        Ok(())
    }

    /// Same as [`apply_settings`](Self::apply_settings), from JSON text.
    pub fn apply_settings_json(&mut self, json: &str) -> Result<(), RoadError> {
        let settings = RoadSettings::from_json(json).map_err(|err| RoadError::Serialization(err.to_string()))?;
        self.apply_settings(settings)
    }

    #[must_use]
    pub fn graph(&self) -> &ControlPointGraph {
        &self.graph
    }

    /// Mutable graph access for bulk edits; marks the mesh stale.
    pub fn graph_mut(&mut self) -> &mut ControlPointGraph {
        self.dirty = true;
        &mut self.graph
    }

    #[must_use]
    pub fn current_settings(&self) -> &RoadSettings {
        &self.settings
    }

    #[must_use]
    pub fn mesh(&self) -> &GeomMesh {
        &self.mesh
    }

    #[must_use]
    pub fn last_diagnostics(&self) -> &GeomMeshDiagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn debug_batch(&self) -> &DebugDrawBatch {
        &self.debug
    }

    /// Chains currently described by the graph.
    #[must_use]
    pub fn chains(&self) -> Vec<ControlPointChain> {
        self.graph.chains()
    }

    fn rebuild(&mut self) {
        let (chains, capped) = self.graph.chains_with_cap();
        self.debug.clear();
        let (mesh, mut diagnostics) = generate_road_with_debug(&chains, &self.settings, Some(&mut self.debug));
        if capped {
            diagnostics.safety_cap_hit = true;
            diagnostics.add_warning("chain traversal cap reached");
        }
        debug_log!("regenerated road: {}", diagnostics.summary());

        self.mesh = mesh;
        self.diagnostics = diagnostics;
        self.dirty = false;
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
