use js_sys::{Array, Function, JSON};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use stagecraft_core::{Interaction, SectionConfig};
use stagecraft_page::Page;

mod host;

pub use host::{JsProbe, JsResolver};

#[wasm_bindgen]
pub struct StagecraftPage {
    page: Page,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn js_err(context: &str, err: impl std::fmt::Display) -> JsError {
    JsError::new(&format!("{context}: {err:#}"))
}

/// Accept a section config as a JSON string or a plain JS object.
fn parse_section(config: JsValue) -> Result<SectionConfig, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        return Err(JsError::new("section config is null/undefined"));
    }
    let text = match config.as_string() {
        Some(s) => s,
        None => JSON::stringify(&config)
            .map_err(|e| JsError::new(&format!("section config stringify error: {e:?}")))?
            .as_string()
            .ok_or_else(|| JsError::new("section config stringify produced non-string"))?,
    };
    SectionConfig::from_json_str(&text).map_err(|e| js_err("section config", e))
}

fn optional_function(v: JsValue) -> Option<Function> {
    if jsvalue_is_undefined_or_null(&v) {
        None
    } else {
        v.dyn_into::<Function>().ok()
    }
}

#[wasm_bindgen]
impl StagecraftPage {
    #[wasm_bindgen(constructor)]
    pub fn new() -> StagecraftPage {
        console_error_panic_hook::set_once();
        StagecraftPage { page: Page::new() }
    }

    /// Bind a section. `resolve(ref)` returns a handle or null; the optional
    /// `resolve_all(ref)` returns every matching handle in document order.
    #[wasm_bindgen(js_name = add_section)]
    pub fn add_section(
        &mut self,
        id: String,
        config: JsValue,
        resolve: Function,
        resolve_all: JsValue,
    ) -> Result<(), JsError> {
        let config = parse_section(config)?;
        let mut resolver = JsResolver {
            resolve,
            resolve_all: optional_function(resolve_all),
        };
        self.page
            .add_section(&id, &config, &mut resolver)
            .map_err(|e| js_err("add_section", e))
    }

    #[wasm_bindgen(js_name = remove_section)]
    pub fn remove_section(&mut self, id: String) -> Result<(), JsError> {
        self.page
            .remove_section(&id)
            .map_err(|e| js_err("remove_section", e))
    }

    #[wasm_bindgen(js_name = section_ids)]
    pub fn section_ids(&self) -> Array {
        self.page.section_ids().map(JsValue::from_str).collect()
    }

    pub fn scroll(&mut self, scroll_y: f64) {
        self.page.on_scroll(scroll_y);
    }

    pub fn resize(
        &mut self,
        width: f64,
        height: f64,
        path_length: Function,
        region_rect: Function,
    ) {
        let mut probe = JsProbe {
            path_length,
            region_rect,
        };
        self.page.on_resize(width, height, &mut probe);
    }

    /// `kind` is one of `pointer_enter`, `pointer_leave`, `focus_in`, `focus_out`.
    pub fn pointer(&mut self, id: String, kind: String, now_ms: f64) -> Result<(), JsError> {
        let interaction: Interaction = swb::from_value(JsValue::from_str(&kind))
            .map_err(|e| js_err("pointer kind", e))?;
        self.page
            .on_interaction(&id, interaction, now_ms)
            .map_err(|e| js_err("pointer", e))
    }

    pub fn select(&mut self, id: String, index: i32, now_ms: f64) -> Result<(), JsError> {
        self.page
            .select(&id, index as i64, now_ms)
            .map_err(|e| js_err("select", e))
    }

    pub fn teardown(&mut self, id: String) -> Result<(), JsError> {
        self.page
            .teardown(&id)
            .map_err(|e| js_err("teardown", e))
    }

    /// Run one frame. Returns `{ epoch, now_ms, changes, events, progress }`.
    pub fn step(
        &mut self,
        now_ms: f64,
        path_length: Function,
        region_rect: Function,
    ) -> Result<JsValue, JsError> {
        let mut probe = JsProbe {
            path_length,
            region_rect,
        };
        let frame = self
            .page
            .step(now_ms, &mut probe)
            .map_err(|e| js_err("step", e))?;
        swb::to_value(&frame).map_err(|e| js_err("step serialize", e))
    }
}

impl Default for StagecraftPage {
    fn default() -> Self {
        Self::new()
    }
}

/// ABI version for the JS wrapper to check compatibility.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
