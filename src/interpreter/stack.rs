//=============================================
// kwenda/interpreter/stack.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Host stack headroom for recursive evaluation
// Objective: Grow the native stack on demand so deep Kwenda recursion reaches
//            the configured call-depth limit instead of aborting the process
//=============================================

/// Remaining stack below which evaluation switches to a fresh segment.
const RED_ZONE: usize = 256 * 1024;

/// Size of each freshly allocated segment.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack when less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(super) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(super) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}


//=============================================
// End of file
//=============================================
