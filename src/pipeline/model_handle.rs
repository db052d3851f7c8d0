use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::SyncError;

type Loader<M> = Box<dyn Fn() -> Result<Arc<M>, SyncError> + Send + Sync>;

/// Lazily acquired external model. The model is loaded on first use and kept
/// until [`ModelHandle::release`] is called or a [`ModelScope`] guard drops.
pub struct ModelHandle<M: ?Sized> {
    name: &'static str,
    loader: Loader<M>,
    loaded: Option<Arc<M>>,
}

impl<M: ?Sized> ModelHandle<M> {
    pub fn new<F>(name: &'static str, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<M>, SyncError> + Send + Sync + 'static,
    {
        Self {
            name,
            loader: Box::new(loader),
            loaded: None,
        }
    }

    /// Wraps an already constructed model; release only drops this handle's
    /// reference.
    pub fn ready(name: &'static str, model: Arc<M>) -> Self
    where
        M: Send + Sync + 'static,
    {
        Self::new(name, move || Ok(Arc::clone(&model)))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn get(&mut self) -> Result<Arc<M>, SyncError> {
        if let Some(model) = &self.loaded {
            return Ok(Arc::clone(model));
        }
        let model = (self.loader)()?;
        tracing::debug!(model = self.name, "model acquired");
        self.loaded = Some(Arc::clone(&model));
        Ok(model)
    }

    pub fn release(&mut self) {
        if self.loaded.take().is_some() {
            tracing::debug!(model = self.name, "model released");
        }
    }

    /// Guard that releases the model when it goes out of scope.
    pub fn scoped(&mut self) -> ModelScope<'_, M> {
        ModelScope { handle: self }
    }
}

pub struct ModelScope<'a, M: ?Sized> {
    handle: &'a mut ModelHandle<M>,
}

impl<M: ?Sized> Deref for ModelScope<'_, M> {
    type Target = ModelHandle<M>;

    fn deref(&self) -> &Self::Target {
        self.handle
    }
}

impl<M: ?Sized> DerefMut for ModelScope<'_, M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.handle
    }
}

impl<M: ?Sized> Drop for ModelScope<'_, M> {
    fn drop(&mut self) {
        self.handle.release();
    }
}

/// Cooperative cancellation checked between chunks.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), SyncError> {
        if self.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }
}
