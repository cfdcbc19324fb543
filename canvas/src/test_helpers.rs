//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use crate::media::{LocalFile, MemoryPreviews, PreviewStore};
use crate::model::CanvasModel;

/// Preview store that records every handle it creates and releases.
#[derive(Default)]
pub struct RecordingPreviews {
    inner: MemoryPreviews,
    pub created: Mutex<Vec<String>>,
    pub released: Mutex<Vec<String>>,
}

impl RecordingPreviews {
    pub fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    pub fn live(&self) -> usize {
        self.inner.live()
    }
}

impl PreviewStore for RecordingPreviews {
    fn create(&self, file: &LocalFile) -> String {
        let handle = self.inner.create(file);
        self.created.lock().unwrap().push(handle.clone());
        handle
    }

    fn release(&self, handle: &str) {
        self.released.lock().unwrap().push(handle.to_owned());
        self.inner.release(handle);
    }

    fn fetch(&self, handle: &str) -> Option<Vec<u8>> {
        self.inner.fetch(handle)
    }
}

pub fn png(name: &str) -> LocalFile {
    LocalFile::new(name, vec![0x89, b'P', b'N', b'G'])
}

pub fn mp4(name: &str) -> LocalFile {
    LocalFile::new(name, vec![0, 0, 0, 0x18, b'f', b't', b'y', b'p'])
}

pub fn model_with(previews: &Arc<RecordingPreviews>) -> CanvasModel {
    let store: Arc<dyn PreviewStore> = previews.clone();
    CanvasModel::new(store)
}
