use std::sync::{Mutex, MutexGuard};

pub(crate) fn lock_state<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// State that tracks its latest issued request.
pub(crate) trait Loadable {
    fn generation_mut(&mut self) -> &mut u64;
    fn set_loading(&mut self, loading: bool);
}

/// One issued request. Dropping it clears the loading flag, unless a newer
/// request has been issued since.
///
/// The state mutex must not be held when the guard drops.
pub(crate) struct LoadingGuard<'a, S: Loadable> {
    state: &'a Mutex<S>,
    generation: u64,
}

impl<'a, S: Loadable> LoadingGuard<'a, S> {
    /// Issue a new generation on the already-locked `inner` and mark it loading.
    pub(crate) fn start(state: &'a Mutex<S>, inner: &mut S) -> Self {
        let generation = inner.generation_mut();
        *generation += 1;
        let generation = *generation;
        inner.set_loading(true);
        Self { state, generation }
    }

    pub(crate) fn is_current(&self, inner: &mut S) -> bool {
        *inner.generation_mut() == self.generation
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl<S: Loadable> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        let mut inner = lock_state(self.state);
        if *inner.generation_mut() == self.generation {
            inner.set_loading(false);
        }
    }
}
