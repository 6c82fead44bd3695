//! Response body of [`GatewayService`](crate::GatewayService).

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::{Body as HttpBody, Frame, SizeHint};
use pin_project::pin_project;

/// Either the inner service's body or a buffered body served by the gateway.
#[pin_project(project = GatewayBodyProj)]
#[derive(Debug)]
pub enum GatewayBody<B> {
    /// Passed through from the inner service.
    Upstream(#[pin] B),
    /// Answered by the gateway.
    Served(#[pin] Full<Bytes>),
}

impl<B> GatewayBody<B> {
    /// A body with the given bytes.
    pub fn served(bytes: Bytes) -> Self {
        GatewayBody::Served(Full::new(bytes))
    }
}

impl<B> HttpBody for GatewayBody<B>
where
    B: HttpBody<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.project() {
            GatewayBodyProj::Upstream(body) => body.poll_frame(cx),
            GatewayBodyProj::Served(body) => body.poll_frame(cx).map_err(|never| match never {}),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            GatewayBody::Upstream(body) => body.is_end_stream(),
            GatewayBody::Served(body) => body.is_end_stream(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            GatewayBody::Upstream(body) => body.size_hint(),
            GatewayBody::Served(body) => body.size_hint(),
        }
    }
}
