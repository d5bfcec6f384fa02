// ── Disposable plumbing ──
//
// Subscription handles vended by the event layer. A disposable releases
// its resource exactly once via `dispose()`. Dropping a handle without
// disposing leaves the resource held -- the caller owns the release point.

/// An owned handle to a resource released via [`dispose`](Disposable::dispose).
///
/// Implementations are expected to tolerate repeated calls; the crate's
/// canonical implementation, [`DisposeGuard`], is idempotent.
pub trait Disposable {
    /// Release the associated resource.
    fn dispose(&mut self);
}

impl<D: Disposable + ?Sized> Disposable for Box<D> {
    fn dispose(&mut self) {
        (**self).dispose();
    }
}

/// Canonical disposable: a release closure run at most once.
///
/// There is deliberately no `Drop` impl. A guard that falls out of scope
/// without `dispose()` keeps its resource registered, and the caller is
/// expected to manage that.
pub struct DisposeGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl DisposeGuard {
    /// An inert guard for default and placeholder slots.
    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl Disposable for DisposeGuard {
    fn dispose(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for DisposeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposeGuard")
            .field("armed", &self.release.is_some())
            .finish()
    }
}

/// Wrap a zero-argument release closure as a disposable.
pub fn to_disposable(release: impl FnOnce() + Send + 'static) -> DisposeGuard {
    DisposeGuard {
        release: Some(Box::new(release)),
    }
}

/// Dispose every handle in order and hand back an empty vector.
///
/// The emptied vector (allocation reused) lets callers reset their own
/// handle list in one assignment: `self.handles = dispose_all(handles);`
pub fn dispose_all<D: Disposable>(mut handles: Vec<D>) -> Vec<D> {
    for handle in &mut handles {
        handle.dispose();
    }
    handles.clear();
    handles
}

/// Fold many disposables into one; disposing it disposes all, in input order.
pub fn combined<D, I>(handles: I) -> DisposeGuard
where
    D: Disposable + Send + 'static,
    I: IntoIterator<Item = D>,
{
    let mut handles: Vec<D> = handles.into_iter().collect();
    to_disposable(move || {
        for handle in &mut handles {
            handle.dispose();
        }
    })
}
