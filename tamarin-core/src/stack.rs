//! Stack growth for the recursive parser and evaluator.

/// Remaining stack below which more is allocated.
const RED_ZONE: usize = 100 * 1024;

/// Size of each additional stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first moving to a freshly allocated stack segment when less than
/// the red zone is left on the current one.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
