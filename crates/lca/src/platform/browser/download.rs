use js_sys::{Array, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::archive::{ARCHIVE_MIME_TYPE, Archive};

/// Hands `archive` to the browser as a file download.
pub fn offer_download(archive: &Archive) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let bytes = Uint8Array::from(archive.bytes.as_slice());
    let options = BlobPropertyBag::new();
    options.set_type(ARCHIVE_MIME_TYPE);
    let blob = Blob::new_with_u8_array_sequence_and_options(&Array::of1(&bytes), &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(JsValue::from)?;
    anchor.set_href(&url);
    anchor.set_download(archive.file_name);
    anchor.click();

    Url::revoke_object_url(&url)
}
