/// Async asset loading through fetch and image elements
use js_sys::{Promise, Uint8Array};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlImageElement, Response, Window};

use crate::gl::js_err;

/// GET `url` and return the body bytes
pub async fn fetch_bytes(window: &Window, url: &str) -> Result<Vec<u8>, String> {
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| "fetch did not return a Response".to_string())?;

    if !response.ok() {
        return Err(format!("{} responded {}", url, response.status()));
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// Load an image element and wait for it to decode
pub async fn load_image(url: &str) -> Result<HtmlImageElement, String> {
    let image = HtmlImageElement::new().map_err(js_err)?;

    let loaded = Promise::new(&mut |resolve, reject| {
        let onload = Closure::once_into_js(move || {
            let _ = resolve.call0(&JsValue::NULL);
        });
        let onerror = Closure::once_into_js(move || {
            let _ = reject.call0(&JsValue::NULL);
        });
        image.set_onload(Some(onload.unchecked_ref()));
        image.set_onerror(Some(onerror.unchecked_ref()));
    });

    image.set_src(url);
    JsFuture::from(loaded)
        .await
        .map_err(|_| format!("failed to load image {}", url))?;

    image.set_onload(None);
    image.set_onerror(None);
    Ok(image)
}
