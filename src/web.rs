#![cfg(target_arch = "wasm32")]

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlCanvasElement, HtmlElement};
use winit::dpi::LogicalSize;
use winit::event_loop::EventLoop;
use winit::platform::web::{EventLoopExtWebSys, WindowAttributesExtWebSys};
use winit::window::Window;

use crate::app::{App, PageSurface, UserEvent};
use crate::assets::fetch_model;
use crate::config::SceneConfig;
use crate::heading::HeadingState;
use crate::input::wasm::PageListeners;
use crate::stage::Stage;
use crate::viewport::Viewport;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Starts the animation on the page's `canvas.webgl`, loading the cell
/// model from `model_url` (default `models/blood_cell.obj`).
#[wasm_bindgen]
pub async fn run(model_url: Option<String>) -> Result<(), JsValue> {
    start(model_url)
        .await
        .map_err(|err| JsValue::from_str(&format!("{err:#}")))
}

async fn start(model_url: Option<String>) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("window not available"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow!("document not available"))?;
    let canvas: HtmlCanvasElement = document
        .query_selector("canvas.webgl")
        .map_err(|err| anyhow!("invalid canvas selector: {err:?}"))?
        .ok_or_else(|| anyhow!("canvas.webgl not found"))?
        .dyn_into()
        .map_err(|_| anyhow!("canvas.webgl is not a canvas"))?;

    let page = DomPage::from_document(&document)?;
    let mut config = SceneConfig {
        heading: page.heading_text(),
        ..SceneConfig::default()
    };
    if let Some(url) = model_url {
        config.model_path = url;
    }

    let viewport = Viewport::new(
        js_number(window.inner_width()),
        js_number(window.inner_height()),
        window.device_pixel_ratio(),
    );
    let stage = Stage::new(config, viewport).context("failed to build the vessel path")?;

    let event_loop = EventLoop::<UserEvent>::with_user_event()
        .build()
        .context("failed to create event loop")?;
    let proxy = event_loop.create_proxy();

    // the page must keep scrolling natively; the canvas only watches
    #[allow(deprecated)]
    let surface_window = Arc::new(
        event_loop
            .create_window(
                Window::default_attributes()
                    .with_canvas(Some(canvas))
                    .with_prevent_default(false),
            )
            .context("failed to bind canvas")?,
    );
    // the canvas fills the window and follows its resizes
    let _ = surface_window.request_inner_size(LogicalSize::new(
        stage.viewport().width(),
        stage.viewport().height(),
    ));
    let (width, height) = stage.viewport().drawable_size();
    let renderer =
        crate::render::Renderer::new(surface_window, width.max(1), height.max(1)).await?;

    let page = page.listening(PageListeners::attach(proxy.clone())?);

    let model_url = stage.config().model_path.clone();
    let model_proxy = proxy.clone();
    spawn_local(async move {
        let result = fetch_model(&model_url).await;
        if model_proxy.send_event(UserEvent::ModelLoaded(result)).is_err() {
            warn!("event loop closed before the model arrived");
        }
    });
    let initial = std::iter::once(UserEvent::Scroll(PageListeners::current_offset()))
        .chain(PageListeners::current_size());
    for event in initial {
        if proxy.send_event(event).is_err() {
            warn!("event loop closed before start");
        }
    }

    info!("starting animation");
    let app = App::embedded(stage, renderer, Box::new(page));
    event_loop.spawn_app(app);
    Ok(())
}

fn js_number(value: Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|value| value.as_f64()).unwrap_or(1.0)
}

/// Heading and page layout in the host document.
struct DomPage {
    heading: HtmlElement,
    letters: Vec<HtmlElement>,
    body: HtmlElement,
    _listeners: Option<PageListeners>,
}

impl DomPage {
    fn from_document(document: &Document) -> Result<Self> {
        let heading: HtmlElement = document
            .query_selector("h1")
            .map_err(|err| anyhow!("invalid heading selector: {err:?}"))?
            .ok_or_else(|| anyhow!("page has no h1"))?
            .dyn_into()
            .map_err(|_| anyhow!("h1 is not an HTML element"))?;
        let nodes = heading
            .query_selector_all(".letter")
            .map_err(|err| anyhow!("invalid letter selector: {err:?}"))?;
        let letters: Vec<HtmlElement> = (0..nodes.length())
            .filter_map(|index| nodes.get(index))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect();
        let body = document
            .body()
            .ok_or_else(|| anyhow!("document has no body"))?;
        Ok(Self {
            heading,
            letters,
            body,
            _listeners: None,
        })
    }

    fn listening(mut self, listeners: PageListeners) -> Self {
        self._listeners = Some(listeners);
        self
    }

    /// One character per `.letter` element.
    fn heading_text(&self) -> String {
        let text: String = self
            .letters
            .iter()
            .filter_map(|letter| letter.text_content())
            .filter_map(|text| text.trim().chars().next())
            .collect();
        if text.chars().count() != self.letters.len() {
            warn!("some heading letters are blank; reveal indices may drift");
        }
        text
    }

    fn set_style(element: &HtmlElement, property: &str, value: &str) {
        if let Err(err) = element.style().set_property(property, value) {
            warn!("failed to set {property}: {err:?}");
        }
    }
}

impl PageSurface for DomPage {
    fn show_heading(&mut self, _window: &Window, heading: &HeadingState, _revealed: &str) {
        for (letter, offset) in self.letters.iter().zip(&heading.letters) {
            Self::set_style(letter, "transform", &format!("translateY({offset}%)"));
        }
        Self::set_style(&self.heading, "--barWidth", &format!("{}%", heading.bar_width));
        Self::set_style(&self.heading, "opacity", &heading.opacity.to_string());
        let visibility = if heading.is_visible() { "inherit" } else { "hidden" };
        Self::set_style(&self.heading, "visibility", visibility);
    }

    fn pin(&mut self, _window: &Window, distance: f32) {
        Self::set_style(&self.body, "padding-bottom", &format!("{distance}px"));
    }
}
