use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::{Duration, Instant},
};

pub(super) trait Timeout: Future {
    fn timeout(self, duration: Duration) -> tokio::time::Timeout<Self>
    where
        Self: Sized,
    {
        tokio::time::timeout(duration, self)
    }
}

pub(super) trait Metrics: Future {
    fn metrics(self, name: &'static str) -> MetricsFuture<Self>
    where
        Self: Sized,
    {
        MetricsFuture {
            future: self,
            guard: LatencyGuard {
                name,
                start: Instant::now(),
                complete: false,
            },
        }
    }
}

impl<F> Metrics for F where F: Future {}
impl<F> Timeout for F where F: Future {}

pin_project_lite::pin_project! {
    pub(super) struct MetricsFuture<F> {
        #[pin]
        future: F,

        guard: LatencyGuard,
    }
}

// records on drop, so statements abandoned by a timeout still show up as incomplete
struct LatencyGuard {
    name: &'static str,
    start: Instant,
    complete: bool,
}

impl<F> Future for MetricsFuture<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        let out = std::task::ready!(this.future.poll(cx));

        this.guard.complete = true;

        Poll::Ready(out)
    }
}

impl Drop for LatencyGuard {
    fn drop(&mut self) {
        metrics::histogram!(self.name, "complete" => self.complete.to_string())
            .record(self.start.elapsed().as_secs_f64());
    }
}
