//! Browser adapters: localStorage store, iframe surface, textarea editors,
//! the `message` listener feeding the relay and the archive download.

mod download;
mod editor;
mod relay;
mod storage;
mod surface;

pub use download::offer_download;
pub use editor::TextAreaEditor;
pub use relay::{MessageListener, decode_message};
pub use storage::LocalStore;
pub use surface::{IframeSurface, SANDBOX_PERMISSIONS};
