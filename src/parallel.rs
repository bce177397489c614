//! Order-preserving map over independent work items.
//!
//! With the `threads` feature the items are spread over the rayon pool,
//! otherwise they run one after another. Either way the output is in input
//! order, so reductions over it do not depend on scheduling.

#[cfg(feature = "threads")]
use rayon::prelude::*;

#[cfg(feature = "threads")]
pub(crate) fn map_ordered<T, R>(items: &[T], f: impl Fn(&T) -> R + Send + Sync) -> Vec<R>
where
    T: Sync,
    R: Send,
{
    items.par_iter().map(f).collect()
}

#[cfg(not(feature = "threads"))]
pub(crate) fn map_ordered<T, R>(items: &[T], f: impl Fn(&T) -> R) -> Vec<R> {
    items.iter().map(f).collect()
}
