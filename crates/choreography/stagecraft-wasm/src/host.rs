//! Host traits backed by JS callbacks.

use js_sys::{Array, Function, Reflect};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use stagecraft_core::{LayoutProbe, Rect, TargetHandle, TargetResolver};

fn is_nullish(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Stringify a handle returned by JS; numbers are accepted as keys.
fn handle_from_js(val: JsValue) -> Option<TargetHandle> {
    if is_nullish(&val) {
        return None;
    }
    if let Some(s) = val.as_string() {
        return Some(s);
    }
    if let Some(n) = val.as_f64() {
        return Some(if n.fract() == 0.0 {
            format!("{}", n as i64)
        } else {
            format!("{n}")
        });
    }
    swb::from_value::<String>(val).ok()
}

/// `resolve(ref) -> string | number | null` and optionally
/// `resolve_all(ref) -> Array<string | number>`.
pub struct JsResolver {
    pub resolve: Function,
    pub resolve_all: Option<Function>,
}

impl TargetResolver for JsResolver {
    fn resolve(&mut self, element_ref: &str) -> Option<TargetHandle> {
        let arg = JsValue::from_str(element_ref);
        match self.resolve.call1(&JsValue::UNDEFINED, &arg) {
            Ok(val) => handle_from_js(val),
            Err(_) => None,
        }
    }

    fn resolve_all(&mut self, group_ref: &str) -> Vec<TargetHandle> {
        let Some(f) = &self.resolve_all else {
            return self.resolve(group_ref).into_iter().collect();
        };
        let arg = JsValue::from_str(group_ref);
        match f.call1(&JsValue::UNDEFINED, &arg) {
            Ok(val) if Array::is_array(&val) => Array::from(&val)
                .iter()
                .filter_map(handle_from_js)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// `path_length(handle) -> number | null` and
/// `region_rect(handle) -> { top, height } | null`.
pub struct JsProbe {
    pub path_length: Function,
    pub region_rect: Function,
}

impl LayoutProbe for JsProbe {
    fn path_length(&mut self, target: &str) -> Option<f32> {
        let val = self
            .path_length
            .call1(&JsValue::UNDEFINED, &JsValue::from_str(target))
            .ok()?;
        val.as_f64().map(|n| n as f32)
    }

    fn region_rect(&mut self, target: &str) -> Option<Rect> {
        let val = self
            .region_rect
            .call1(&JsValue::UNDEFINED, &JsValue::from_str(target))
            .ok()?;
        if is_nullish(&val) {
            return None;
        }
        let top = Reflect::get(&val, &JsValue::from_str("top")).ok()?.as_f64()?;
        let height = Reflect::get(&val, &JsValue::from_str("height"))
            .ok()?
            .as_f64()?;
        Some(Rect { top, height })
    }
}
