//! Replayable animated artifact.
//!
//! Display surfaces play an animation once per resource handle, at the moment
//! the handle is attached. Re-attaching the same handle does nothing, so a
//! replay has to revoke the current handle, yield long enough for the surface
//! to observe the removal, and mint a fresh handle over the same bytes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use log::{debug, warn};
use parking_lot::Mutex;

use crate::error::Result;

/// Pause between revoking and re-issuing a handle on replay.
pub const DEFAULT_REPLAY_DELAY: Duration = Duration::from_millis(10);

/// A revocable reference to artifact bytes held by a display surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    pub id: u64,
    pub url: String,
    pub mime: &'static str,
}

/// Something that can show an animated resource by handle.
pub trait DisplaySurface {
    fn create_handle(&self, bytes: Arc<[u8]>, mime: &'static str) -> ResourceHandle;
    fn revoke_handle(&self, handle: &ResourceHandle);
}

#[derive(Debug, Default)]
struct RegistryState {
    next_id: u64,
    live: HashMap<u64, Arc<[u8]>>,
}

/// In-memory surface issuing `blob:`-style URLs. Clones share one registry.
#[derive(Debug, Clone, Default)]
pub struct HandleRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles issued and not yet revoked.
    pub fn live_count(&self) -> usize {
        self.state.lock().live.len()
    }

    /// Handles issued over the registry's lifetime.
    pub fn issued_count(&self) -> u64 {
        self.state.lock().next_id
    }

    pub fn is_live(&self, handle: &ResourceHandle) -> bool {
        self.state.lock().live.contains_key(&handle.id)
    }

    /// Resolve a live handle to its bytes.
    pub fn resolve(&self, handle: &ResourceHandle) -> Option<Arc<[u8]>> {
        self.state.lock().live.get(&handle.id).cloned()
    }
}

impl DisplaySurface for HandleRegistry {
    fn create_handle(&self, bytes: Arc<[u8]>, mime: &'static str) -> ResourceHandle {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.live.insert(id, bytes);
        ResourceHandle {
            id,
            url: format!("blob:lp-workbench/{}", id),
            mime,
        }
    }

    fn revoke_handle(&self, handle: &ResourceHandle) {
        if self.state.lock().live.remove(&handle.id).is_none() {
            warn!("revoking unknown handle {}", handle.url);
        }
    }
}

/// Media type from the leading magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else {
        "application/octet-stream"
    }
}

/// Owns the decoded artifact and the single live handle over it.
pub struct ArtifactManager<S: DisplaySurface> {
    surface: S,
    bytes: Option<Arc<[u8]>>,
    current: Option<ResourceHandle>,
    replay_delay: Duration,
}

impl<S: DisplaySurface> ArtifactManager<S> {
    pub fn new(surface: S) -> Self {
        Self::with_replay_delay(surface, DEFAULT_REPLAY_DELAY)
    }

    pub fn with_replay_delay(surface: S, replay_delay: Duration) -> Self {
        ArtifactManager {
            surface,
            bytes: None,
            current: None,
            replay_delay,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn current(&self) -> Option<&ResourceHandle> {
        self.current.as_ref()
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// Decode once and issue the first handle. On a decode error the manager
    /// ends up cleared.
    pub fn load(&mut self, encoded: &str) -> Result<&ResourceHandle> {
        let decoded = match general_purpose::STANDARD.decode(encoded.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.clear();
                return Err(e.into());
            }
        };
        self.release();
        let bytes: Arc<[u8]> = decoded.into();
        debug!("artifact loaded: {} bytes", bytes.len());
        self.bytes = Some(bytes);
        Ok(self.issue())
    }

    /// Restart playback with a brand-new handle over the retained bytes.
    pub async fn replay(&mut self) -> Option<&ResourceHandle> {
        self.bytes.as_ref()?;
        self.release();
        tokio::time::sleep(self.replay_delay).await;
        Some(self.issue())
    }

    /// Release the handle and drop the bytes.
    pub fn clear(&mut self) {
        self.release();
        self.bytes = None;
    }

    fn release(&mut self) {
        if let Some(handle) = self.current.take() {
            debug!("releasing artifact handle {}", handle.url);
            self.surface.revoke_handle(&handle);
        }
    }

    fn issue(&mut self) -> &ResourceHandle {
        let bytes = self.bytes.clone().unwrap_or_else(|| Arc::from(Vec::new()));
        let handle = self.surface.create_handle(bytes.clone(), sniff_mime(&bytes));
        debug!("issued artifact handle {}", handle.url);
        self.current.insert(handle)
    }
}

impl<S: DisplaySurface> Drop for ArtifactManager<S> {
    fn drop(&mut self) {
        self.release();
    }
}
