use std::sync::Arc;

use log::{debug, info};

use crate::error::AssetError;
use crate::mesh::MeshData;
use crate::obj::load_obj_from_str;

/// Outcome of loading the shared cell model.
pub type ModelResult = Result<Arc<MeshData>, AssetError>;

/// Decodes OBJ bytes and keeps the first mesh with faces.
pub fn parse_model(bytes: Vec<u8>) -> ModelResult {
    let text = String::from_utf8(bytes)?;
    let model = load_obj_from_str(&text)?;
    debug!("model declares {} object(s)", model.objects.len());
    let mesh = model.into_first_mesh().ok_or(AssetError::NoMesh)?;
    Ok(Arc::new(mesh))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_model_file(path: impl AsRef<std::path::Path>) -> ModelResult {
    let path = path.as_ref();
    info!("loading model from {}", path.display());
    let bytes = std::fs::read(path)?;
    parse_model(bytes)
}

/// Reads the model on a background thread and hands the result to
/// `deliver` from that thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_model_load<F>(path: std::path::PathBuf, deliver: F) -> std::io::Result<()>
where
    F: FnOnce(ModelResult) + Send + 'static,
{
    std::thread::Builder::new()
        .name("model-loader".into())
        .spawn(move || deliver(load_model_file(&path)))
        .map(|_| ())
}

/// Fetches the model over HTTP relative to the current page.
#[cfg(target_arch = "wasm32")]
pub async fn fetch_model(url: &str) -> ModelResult {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fetch_error = |err: wasm_bindgen::JsValue| AssetError::Fetch(format!("{err:?}"));

    info!("fetching model from {url}");
    let window = web_sys::window().ok_or_else(|| AssetError::Fetch("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fetch_error)?;
    let response: web_sys::Response = response.dyn_into().map_err(fetch_error)?;
    if !response.ok() {
        return Err(AssetError::Fetch(format!(
            "{url} returned HTTP {}",
            response.status()
        )));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(fetch_error)?)
        .await
        .map_err(fetch_error)?;
    parse_model(js_sys::Uint8Array::new(&buffer).to_vec())
}
