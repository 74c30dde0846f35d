/// scrollcube web front-end
///
/// Wires the page to a `CubeScene`: the scroll listener and the animation
/// frame loop are registered as soon as `start_cube` runs, while the
/// environment map and face images load in the background. Until the
/// environment has settled both callbacks fall through without touching
/// the scene.
mod assets;
mod dom;
mod gl;
mod renderer;
mod shaders;

use std::cell::RefCell;
use std::rc::Rc;

use scrollcube_core::hdr::parse_hdr;
use scrollcube_core::{AssetTracker, CubeConfig, CubeScene, FaceTexture};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlCanvasElement, Window};

use crate::renderer::Renderer;

struct App {
    window: Window,
    canvas: HtmlCanvasElement,
    scene: CubeScene,
    renderer: Renderer,
    assets: AssetTracker,
}

impl App {
    fn on_scroll(&mut self) {
        let input = dom::measure(&self.window, &self.canvas);
        self.scene.on_scroll(input);
    }

    fn on_resize(&mut self) {
        match dom::size_canvas(&self.window, &self.canvas, &self.scene.config().canvas) {
            Ok(size) => self.renderer.resize(size),
            Err(e) => log::error!("resize failed: {}", e),
        }
        self.on_scroll();
    }

    fn on_frame(&mut self, time_ms: f64) {
        if let Some(frame) = self.scene.on_frame(time_ms) {
            self.renderer.render(&frame);
        }
    }
}

/// Handle returned to the page
#[wasm_bindgen]
pub struct CubeCanvas {
    app: Rc<RefCell<App>>,
}

#[wasm_bindgen]
impl CubeCanvas {
    /// Whether the environment has settled and the cube is drawn
    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.app.borrow().scene.is_ready()
    }

    /// Re-read the canvas position, e.g. after the layout changed
    pub fn remeasure(&self) {
        self.app.borrow_mut().on_scroll();
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    // A second init (e.g. hot reload) keeps the existing logger
    let _ = console_log::init_with_level(log::Level::Info);
    Ok(())
}

/// Attach the cube to a canvas.
///
/// `config_json` may override any subset of the page configuration; its
/// `canvas.id` is replaced by `canvas_id` when one is given.
#[wasm_bindgen(js_name = startCube)]
pub fn start_cube(canvas_id: Option<String>, config_json: Option<String>) -> Result<CubeCanvas, JsValue> {
    let mut config = match config_json {
        Some(json) => CubeConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => CubeConfig::default(),
    };
    if let Some(id) = canvas_id {
        config.canvas.id = id;
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let canvas = dom::find_canvas(&window, &config.canvas.id).map_err(|e| JsValue::from_str(&e))?;
    let size = dom::size_canvas(&window, &canvas, &config.canvas).map_err(|e| JsValue::from_str(&e))?;
    let context = dom::webgl2_context(&canvas).map_err(|e| JsValue::from_str(&e))?;
    let renderer = Renderer::new(context, &config.canvas, size).map_err(|e| JsValue::from_str(&e))?;
    log::info!("cube canvas '{}' at {}px", config.canvas.id, size);

    let mut scene = CubeScene::new(config);
    // Remembered until the scene is ready, so a page opened mid-scroll starts in pose
    scene.on_scroll(dom::measure(&window, &canvas));

    let app = Rc::new(RefCell::new(App {
        window: window.clone(),
        canvas,
        scene,
        renderer,
        assets: AssetTracker::new(),
    }));

    listen(&window, "scroll", &app, App::on_scroll)?;
    listen(&window, "resize", &app, App::on_resize)?;
    start_frame_loop(app.clone())?;
    spawn_local(load_assets(window, app.clone()));

    Ok(CubeCanvas { app })
}

fn listen(window: &Window, event: &str, app: &Rc<RefCell<App>>, handler: fn(&mut App)) -> Result<(), JsValue> {
    let app = app.clone();
    let closure = Closure::<dyn FnMut()>::new(move || handler(&mut app.borrow_mut()));
    window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page
    closure.forget();
    Ok(())
}

fn start_frame_loop(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = callback.clone();

    *callback.borrow_mut() = Some(Closure::new(move || {
        app.borrow_mut().on_frame(js_sys::Date::now());
        if let Some(closure) = next.borrow().as_ref() {
            let window = app.borrow().window.clone();
            if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
                log::error!("requestAnimationFrame failed: {:?}", e);
            }
        }
    }));

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    if let Some(closure) = callback.borrow().as_ref() {
        window.request_animation_frame(closure.as_ref().unchecked_ref())?;
    }
    Ok(())
}

async fn load_assets(window: Window, app: Rc<RefCell<App>>) {
    let manifest = app.borrow().scene.config().assets.clone();

    let environment = assets::fetch_bytes(&window, &manifest.environment)
        .await
        .and_then(|bytes| parse_hdr(&bytes).map_err(|e| e.to_string()));
    {
        let mut app = app.borrow_mut();
        let app = &mut *app;
        match environment.and_then(|image| app.renderer.upload_environment(&image)) {
            Ok(()) => app.assets.environment_loaded(),
            Err(e) => app.assets.environment_failed(e),
        }
        app.scene.mark_ready();
    }

    for face in FaceTexture::ALL {
        let url = manifest.face(face).to_string();
        let app = app.clone();
        spawn_local(async move {
            let image = assets::load_image(&url).await;
            let mut app = app.borrow_mut();
            let app = &mut *app;
            match image.and_then(|image| app.renderer.upload_face(face, &image)) {
                Ok(()) => app.assets.face_loaded(face),
                Err(e) => app.assets.face_failed(face, e),
            }
            if app.assets.all_settled() {
                log::info!("all cube assets settled");
            }
        });
    }
}
