//! Native adapters used by the `lca` command line tool.

mod storage;
mod surface;

pub use storage::FileStore;
pub use surface::{FileSurface, PREVIEW_FILE_NAME};
