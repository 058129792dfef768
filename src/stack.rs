/// Runs `f`, first moving to a freshly allocated stack segment if fewer
/// than `RED_ZONE` bytes remain on the current one.
///
/// Wrapped around every recursive step of the parser, resolver and
/// evaluator, so nesting depth in a script never exhausts the host thread's
/// stack, whatever size that thread was given.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const RED_ZONE: usize = 100 * 1024;
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
