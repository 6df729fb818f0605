#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Path navigation and camera choreography for scroll- and time-driven 3D
//! scenes. The host owns the renderer and the render loop; this crate only
//! turns input signals into poses and plain numeric geometry.

pub mod document;
pub mod geom;
pub mod presets;
pub mod quality;
pub mod scene;

use std::fmt;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use document::SceneDocument;
use quality::{CapabilitySignal, QualityTier};
use scene::SceneDirector;

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
    log::set_logger(&DEFAULT_LOGGER).expect("error initializing logger");
    log::set_max_level(LevelFilter::Debug);
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

/// Resolves the session tier once. A capability object from the host wins;
/// otherwise the browser is probed directly, and a failed probe means `Low`.
fn resolve_tier(capability: &JsValue) -> QualityTier {
    let signal = if capability.is_undefined() || capability.is_null() {
        quality::probe_browser()
    } else {
        match serde_wasm_bindgen::from_value::<CapabilitySignal>(capability.clone()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                log::warn!("capability signal unreadable, using low quality: {err}");
                None
            }
        }
    };
    let tier = quality::resolve_quality(signal.as_ref());
    log::debug!("quality tier: {}", tier.as_str());
    tier
}

/// Public entry point for hosts. One engine drives one mounted scene.
#[wasm_bindgen]
pub struct SceneEngine {
    director: SceneDirector,
}

#[wasm_bindgen]
impl SceneEngine {
    /// Builds a scene from a JS scene document.
    #[wasm_bindgen(constructor)]
    pub fn new(document: JsValue, capability: JsValue) -> Result<SceneEngine, JsValue> {
        let document: SceneDocument =
            serde_wasm_bindgen::from_value(document).map_err(to_js_error)?;
        Self::from_document(&document, resolve_tier(&capability))
    }

    #[wasm_bindgen(js_name = journeyRailway)]
    pub fn journey_railway(capability: JsValue) -> Result<SceneEngine, JsValue> {
        Self::from_document(&presets::journey_railway(), resolve_tier(&capability))
    }

    #[wasm_bindgen(js_name = techConstellation)]
    pub fn tech_constellation(capability: JsValue) -> Result<SceneEngine, JsValue> {
        Self::from_document(&presets::tech_constellation(), resolve_tier(&capability))
    }

    /// Feeds the page scroll position. Ignored by time-driven scenes.
    #[wasm_bindgen(js_name = setScroll)]
    pub fn set_scroll(&mut self, offset: f64, document_height: f64, viewport_height: f64) {
        self.director
            .set_scroll(offset, document_height, viewport_height);
    }

    /// Advances one frame and returns the pose and mover state to render.
    #[wasm_bindgen]
    pub fn update(&mut self, delta_seconds: f64) -> Result<JsValue, JsValue> {
        let frame = self.director.update(delta_seconds);
        to_js_value(&frame)
    }

    #[wasm_bindgen(js_name = pointerEnter)]
    pub fn pointer_enter(&mut self, node_id: &str) {
        self.director.pointer_enter(node_id);
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self, node_id: &str) {
        self.director.pointer_leave(node_id);
    }

    /// Returns whether the click started a camera move.
    #[wasm_bindgen]
    pub fn click(&mut self, node_id: &str) -> bool {
        self.director.click(node_id)
    }

    /// Close button or Escape.
    #[wasm_bindgen(js_name = closeDetail)]
    pub fn close_detail(&mut self) -> bool {
        self.director.close_detail()
    }

    #[wasm_bindgen]
    pub fn teardown(&mut self) {
        self.director.teardown();
    }

    #[wasm_bindgen(js_name = selectedNode)]
    pub fn selected_node(&self) -> Option<String> {
        self.director.selected_node().map(ToString::to_string)
    }

    #[wasm_bindgen(js_name = qualityTier)]
    pub fn quality_tier(&self) -> String {
        self.director.tier().as_str().to_string()
    }

    /// Track or connection geometry plus node positions, built once.
    #[wasm_bindgen(js_name = staticGeometry)]
    pub fn static_geometry(&self) -> Result<JsValue, JsValue> {
        to_js_value(self.director.static_geometry())
    }

    #[wasm_bindgen(js_name = flowMarkers)]
    pub fn flow_markers(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.director.flow_markers())
    }

    #[wasm_bindgen]
    pub fn particles(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.director.particles())
    }
}

impl SceneEngine {
    fn from_document(document: &SceneDocument, tier: QualityTier) -> Result<SceneEngine, JsValue> {
        let director = document.build(tier).map_err(to_js_error)?;
        Ok(SceneEngine { director })
    }
}

fn to_js_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen::JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
