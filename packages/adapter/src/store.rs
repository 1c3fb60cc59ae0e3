//! The backing-store collaborator.

use schemashim_mapping::Error;

use crate::{Request, Response};

/// Executes requests written in the backing store's own vocabulary.
///
/// The adapter makes exactly one call per inbound request and never
/// retries. Implementations report their own failures with
/// [`Error::store`] so the cause is kept as the error source.
pub trait BackingStore: Send + Sync {
    fn execute(&self, request: Request) -> Result<Response, Error>;
}

impl<T: BackingStore + ?Sized> BackingStore for &T {
    fn execute(&self, request: Request) -> Result<Response, Error> {
        (**self).execute(request)
    }
}

impl<T: BackingStore + ?Sized> BackingStore for Box<T> {
    fn execute(&self, request: Request) -> Result<Response, Error> {
        self.as_ref().execute(request)
    }
}
