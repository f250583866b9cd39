use std::future::Future;
use std::pin::Pin;
use std::task::{Context as StdContext, Poll};

use crate::ContextRef;

pin_project_lite::pin_project! {
    /// A future wrapped with a context, produced by [`ContextFutExt::with_context`].
    pub struct ContextFut<F> {
        #[pin]
        fut: F,
        #[pin]
        ctx: ContextRef<'static>,
    }
}

impl<F: Future> Future for ContextFut<F> {
    type Output = Option<F::Output>;

    fn poll(self: Pin<&mut Self>, cx: &mut StdContext<'_>) -> Poll<Self::Output> {
        let this = self.project();

        if this.ctx.poll(cx).is_ready() {
            return Poll::Ready(None);
        }

        this.fut.poll(cx).map(Some)
    }
}

/// Extension trait attaching a [`Context`] to any future.
pub trait ContextFutExt: Future + Sized {
    /// Wraps this future so it resolves to `None` as soon as `ctx` is done,
    /// instead of running to completion.
    fn with_context(self, ctx: impl Into<ContextRef<'static>>) -> ContextFut<Self> {
        ContextFut {
            fut: self,
            ctx: ctx.into(),
        }
    }
}

impl<F: Future> ContextFutExt for F {}
