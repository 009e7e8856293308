//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The [`App`](crate::App) keeps handlers of *different* types in one
//! `HashMap<String, BoxedHandler>`, keyed by presenter. Trait objects
//! (`dyn ErasedHandler`) hide each concrete handler type behind a common
//! interface:
//!
//! ```text
//! async fn users(m: RouteMatch) -> Response { … }   ← user writes this
//!        ↓ app.handler("Resources:Users", users)
//! users.into_boxed_handler()                        ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(users))                        ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(matched)  at request time            ← one vtable dispatch
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::RouteMatch;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, matched: RouteMatch) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid handler.
///
/// You never implement this yourself. It is satisfied by any `async fn` with
/// the signature:
///
/// ```text
/// async fn name(matched: RouteMatch) -> impl IntoResponse
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(RouteMatch) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(RouteMatch) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype bridging a concrete handler `F` to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(RouteMatch) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, matched: RouteMatch) -> BoxFuture {
        let fut = (self.0)(matched);
        Box::pin(async move { fut.await.into_response() })
    }
}
