//! Directory listing styles
//!
//! Responses to directory requests get a fixed `<style>` block appended
//! after whatever the file server produced. [`StyledBody`] does the append
//! at the body level, so the fragment follows the last frame of the
//! original body on the same response.

use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};

/// Inline stylesheet appended to directory responses.
pub const STYLE: &str = r#"
<style>
  body {
    background: #111;
    color: #def;
  }

  *, *::before, *::after {
    font: 20px JetBrainsMono, mono, Menlo-Regular;
    box-sizing: border-box;

    scrollbar-width: thin;
    scrollbar-color: #aef #0003;
  }
  *::-webkit-scrollbar-thumb {
    background: #aef;
    border-radius: 20rem;
  }
  *::-webkit-scrollbar-track {
    background: #0003;
  }
  *::-webkit-scrollbar {
    width: 3rem;
  }

  pre {
    margin: 0;
    padding: 0.5rem;
  }

  a {
    color: #abf;
    font-weight: bold;
  }

  a:visited {
    color: #fba;
  }

  a:hover {
    color: #aef;
  }
</style>
"#;

/// Body wrapper that yields [`STYLE`] once the inner body is exhausted.
#[derive(Debug)]
pub struct StyledBody<B> {
    inner: B,
    style: Option<Bytes>,
}

impl<B> StyledBody<B> {
    /// Wrap a body
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            style: Some(Bytes::from_static(STYLE.as_bytes())),
        }
    }
}

impl<B> Body for StyledBody<B>
where
    B: Body<Data = Bytes> + Unpin,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.style.is_none() {
            return Poll::Ready(None);
        }

        match ready!(Pin::new(&mut this.inner).poll_frame(cx)) {
            Some(frame) => Poll::Ready(Some(frame)),
            None => Poll::Ready(this.style.take().map(|style| Ok(Frame::data(style)))),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.style.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        let mut hint = self.inner.size_hint();
        if let Some(style) = &self.style {
            let extra = style.len() as u64;
            if let Some(upper) = hint.upper() {
                hint.set_upper(upper + extra);
            }
            hint.set_lower(hint.lower() + extra);
        }
        hint
    }
}
