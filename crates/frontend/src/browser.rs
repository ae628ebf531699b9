//! Small wrappers around browser APIs the components need.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use dioxus::html::FileData;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlImageElement, Url};

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Read an uploaded image as `(file name, data URL)`. Non-image files are
/// rejected.
pub async fn read_image(file: FileData) -> Result<(String, String), String> {
    let mime = file.content_type().unwrap_or_default();
    if !mime.starts_with("image/") {
        return Err(format!("{} is not an image", file.name()));
    }
    let bytes = file.read_bytes().await.map_err(|e| e.to_string())?;
    Ok((file.name(), data_url(&mime, &bytes)))
}

pub async fn read_text(file: FileData) -> Result<String, String> {
    file.read_string().await.map_err(|e| e.to_string())
}

/// Natural size of a decoded `<img>`, once it has one.
pub fn image_natural_size(element_id: &str) -> Option<(f64, f64)> {
    let image = web_sys::window()?
        .document()?
        .get_element_by_id(element_id)?
        .dyn_into::<HtmlImageElement>()
        .ok()?;
    let (w, h) = (image.natural_width(), image.natural_height());
    (w > 0 && h > 0).then_some((w as f64, h as f64))
}

pub fn today() -> NaiveDate {
    let d = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(d.get_full_year() as i32, d.get_month() + 1, d.get_date())
        .unwrap_or_default()
}

pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Offer `contents` as a JSON file download.
pub fn download_json(file_name: &str, contents: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let options = BlobPropertyBag::new();
    options.set_type("application/json");
    let parts = js_sys::Array::of1(&JsValue::from_str(contents));
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    Url::revoke_object_url(&url)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        assert_eq!(data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
    }
}
