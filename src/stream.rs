//! Message-counting stream decorators
//!
//! These wrappers increment a bound counter as messages flow through a
//! stream, without changing its ordering, backpressure, completion, or
//! error behavior. Nothing is buffered; each element is counted inside
//! `poll_next` at the moment it is handed to the consumer, so elements
//! the consumer never pulls are never counted.

use futures::Stream;
use pin_project::pin_project;
use prometheus::IntCounter;
use std::pin::Pin;
use std::task::{Context, Poll};
use tonic::Status;

/// Counts every element yielded by the inner stream.
///
/// Used for outbound request streams, where every item is a message.
#[pin_project]
pub struct CountedStream<S> {
    #[pin]
    inner: S,
    counter: IntCounter,
}

impl<S> CountedStream<S> {
    pub fn new(inner: S, counter: IntCounter) -> Self {
        Self { inner, counter }
    }
}

impl<S: Stream> Stream for CountedStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        let this = self.project();
        let polled = this.inner.poll_next(cx);
        if let Poll::Ready(Some(_)) = polled {
            this.counter.inc();
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Counts only the `Ok` elements yielded by the inner stream.
///
/// Used for inbound response streams, where an `Err` item is the
/// propagated terminal status of the call, not a message.
#[pin_project]
pub struct CountedResponseStream<S> {
    #[pin]
    inner: S,
    counter: IntCounter,
}

impl<S> CountedResponseStream<S> {
    pub fn new(inner: S, counter: IntCounter) -> Self {
        Self { inner, counter }
    }
}

impl<S, T> Stream for CountedResponseStream<S>
where
    S: Stream<Item = Result<T, Status>>,
{
    type Item = Result<T, Status>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let polled = this.inner.poll_next(cx);
        if let Poll::Ready(Some(Ok(_))) = polled {
            this.counter.inc();
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
