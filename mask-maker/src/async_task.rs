use std::task::{Context, Poll, Waker};

use crate::BoxFuture;

/// Background result which the UI checks once per frame.
///
/// The output is handed out exactly once, later calls to [`AsyncTask::data`]
/// yield `None`.
pub struct AsyncTask<T> {
    future: Option<BoxFuture<'static, T>>,
}

impl<T> AsyncTask<T> {
    pub fn new(future: BoxFuture<'static, T>) -> Self {
        Self {
            future: Some(future),
        }
    }

    pub fn data(&mut self) -> Option<T> {
        let future = self.future.as_mut()?;
        let mut cx = Context::from_waker(Waker::noop());
        let Poll::Ready(output) = future.as_mut().poll(&mut cx) else {
            return None;
        };
        self.future = None;
        Some(output)
    }
}
