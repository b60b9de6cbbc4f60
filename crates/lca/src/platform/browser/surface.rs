use zoon::*;

use crate::sandbox::RenderingSurface;

/// `sandbox` attribute of the preview frame: scripts and alerts run, but the
/// document gets an opaque origin and cannot reach the host page.
pub const SANDBOX_PERMISSIONS: &str = "allow-scripts allow-modals";

/// Preview iframe driven through its `srcdoc` attribute. Every assignment
/// makes the browser discard the frame's document and load a new one.
#[derive(Clone, Default)]
pub struct IframeSurface {
    srcdoc: Mutable<String>,
}

impl IframeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to the frame's `srcdoc` attribute.
    pub fn srcdoc_signal(&self) -> impl Signal<Item = String> + use<> {
        self.srcdoc.signal_cloned()
    }

    pub fn srcdoc(&self) -> String {
        self.srcdoc.get_cloned()
    }
}

impl RenderingSurface for IframeSurface {
    fn replace_document(&mut self, document: &str) {
        self.srcdoc.set(document.to_owned());
    }
}
