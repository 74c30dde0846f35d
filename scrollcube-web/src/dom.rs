/// Canvas lookup, sizing and scroll measurement
use js_sys::{Object, Reflect};
use scrollcube_core::{CanvasConfig, ScrollInput};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext, Window};

use crate::gl::js_err;

pub fn find_canvas(window: &Window, id: &str) -> Result<HtmlCanvasElement, String> {
    let document = window.document().ok_or("No document on window")?;
    document
        .get_element_by_id(id)
        .ok_or_else(|| format!("No element with id '{}'", id))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| format!("Element '{}' is not a canvas", id))
}

/// Fix the CSS size and set the drawing buffer for the current pixel ratio.
/// Returns the buffer side length.
pub fn size_canvas(window: &Window, canvas: &HtmlCanvasElement, config: &CanvasConfig) -> Result<u32, String> {
    let size = config.buffer_size(window.device_pixel_ratio());
    canvas.set_width(size);
    canvas.set_height(size);

    let css = format!("{}px", config.size_px);
    let style = canvas.style();
    style.set_property("width", &css).map_err(js_err)?;
    style.set_property("height", &css).map_err(js_err)?;
    Ok(size)
}

/// Read the two values the scroll mapping needs.
///
/// Missing values come through as NaN, which the mapping treats as
/// "canvas out of range" and "no yaw" respectively.
pub fn measure(window: &Window, canvas: &HtmlCanvasElement) -> ScrollInput {
    let canvas_top = canvas.get_bounding_client_rect().top() as f32;
    let scroll_y = window.scroll_y().map(|y| y as f32).unwrap_or(f32::NAN);
    ScrollInput::new(canvas_top, scroll_y)
}

/// Transparent, antialiased WebGL2 context
pub fn webgl2_context(canvas: &HtmlCanvasElement) -> Result<WebGl2RenderingContext, String> {
    let options = Object::new();
    for (key, value) in [("alpha", true), ("antialias", true), ("premultipliedAlpha", true)] {
        Reflect::set(&options, &JsValue::from_str(key), &JsValue::from_bool(value)).map_err(js_err)?;
    }

    canvas
        .get_context_with_context_options("webgl2", &options)
        .map_err(js_err)?
        .ok_or("WebGL2 is not available")?
        .dyn_into::<WebGl2RenderingContext>()
        .map_err(|_| "Context is not WebGL2".to_string())
}
