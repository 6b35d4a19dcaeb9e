use tracing::trace;

use super::GridDataSource;
use crate::{context::ReadContext, error::GribError};

/// A pass-through wrapper that sends every read to the source.
#[derive(Debug, Clone)]
pub struct NoCache<S> {
    source: S,
}

impl<S> NoCache<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: GridDataSource> GridDataSource for NoCache<S> {
    fn read_grid_at(&self, ctx: &ReadContext, n: usize) -> Result<f32, GribError> {
        trace!(index = n, "uncached read");
        self.source.read_grid_at(ctx, n)
    }
}
