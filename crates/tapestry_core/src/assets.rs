//! Image asset loading seam
//!
//! Asset loading is the engine's only asynchronous boundary. A pass asks the
//! loader for an image; if it is still loading the pass may leave a one-shot
//! callback that the host runs once the image is ready. Failed loads never run
//! their callbacks.

use rustc_hash::FxHashMap;

use crate::host::Host;

/// Natural size of a loaded image
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageInfo {
    pub width: f32,
    pub height: f32,
}

impl ImageInfo {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Load state of an image asset
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AssetState {
    Ready(ImageInfo),
    Loading,
    Failed,
}

/// Callback run by the host once an asset is ready
pub type AssetCallback = Box<dyn FnOnce(&mut Host<'_>)>;

pub trait AssetLoader {
    /// Current state of `src`, starting a load if none is in flight
    fn image(&mut self, src: &str) -> AssetState;

    /// Register a callback for when `src` becomes ready
    fn on_ready(&mut self, src: &str, callback: AssetCallback);
}

/// Asset loader backed by a table the host fills in by hand.
///
/// Unknown sources are reported as loading. `resolve` marks a source ready
/// and hands back its waiting callbacks for the host to run.
#[derive(Default)]
pub struct StaticAssets {
    states: FxHashMap<String, AssetState>,
    waiting: Vec<(String, AssetCallback)>,
    requests: Vec<String>,
}

impl StaticAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `src` as already loaded
    pub fn insert(&mut self, src: impl Into<String>, info: ImageInfo) {
        self.states.insert(src.into(), AssetState::Ready(info));
    }

    /// Mark `src` ready and take the callbacks waiting on it
    pub fn resolve(&mut self, src: &str, info: ImageInfo) -> Vec<AssetCallback> {
        self.states.insert(src.to_string(), AssetState::Ready(info));
        self.take_waiting(src)
    }

    /// Mark `src` failed and drop the callbacks waiting on it
    pub fn fail(&mut self, src: &str) {
        self.states.insert(src.to_string(), AssetState::Failed);
        let dropped = self.take_waiting(src).len();
        tracing::debug!(src, dropped, "Asset failed, dropping redraw callbacks");
    }

    /// Number of callbacks waiting on `src`
    pub fn pending(&self, src: &str) -> usize {
        self.waiting.iter().filter(|(s, _)| s == src).count()
    }

    /// Every source requested through `image`, in order
    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    fn take_waiting(&mut self, src: &str) -> Vec<AssetCallback> {
        let (ready, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.waiting)
            .into_iter()
            .partition(|(s, _)| s == src);
        self.waiting = rest;
        ready.into_iter().map(|(_, cb)| cb).collect()
    }
}

impl AssetLoader for StaticAssets {
    fn image(&mut self, src: &str) -> AssetState {
        self.requests.push(src.to_string());
        *self
            .states
            .entry(src.to_string())
            .or_insert(AssetState::Loading)
    }

    fn on_ready(&mut self, src: &str, callback: AssetCallback) {
        match self.states.get(src) {
            Some(AssetState::Failed) => {}
            _ => self.waiting.push((src.to_string(), callback)),
        }
    }
}

impl std::fmt::Debug for StaticAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticAssets")
            .field("states", &self.states)
            .field("waiting", &self.waiting.len())
            .finish()
    }
}
