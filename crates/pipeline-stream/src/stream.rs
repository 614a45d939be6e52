use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use futures::StreamExt as _;
use futures::stream;
use tracing::debug;

use crate::decoder::ChunkDecoder;
use crate::errors::ClientError;
use crate::event::StreamEvent;
use crate::frame::EventFrameParser;

/// Raw response body as delivered by the transport.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, ClientError>> + Send + 'static>>;

/// Turns a byte stream into a stream of protocol events.
///
/// The first framing or transport error is yielded and ends the stream. When
/// the body closes, an unterminated final line is still parsed. With
/// `idle_timeout` set, a gap between chunks longer than the timeout is a
/// transport error.
pub fn event_stream(
    bytes_stream: ByteStream,
    parser: EventFrameParser,
    idle_timeout: Option<Duration>,
) -> impl futures::Stream<Item = Result<StreamEvent, ClientError>> + Send {
    struct State {
        bytes_stream: ByteStream,
        decoder: ChunkDecoder,
        parser: EventFrameParser,
        idle_timeout: Option<Duration>,
        pending: VecDeque<StreamEvent>,
        done: bool,
    }

    impl State {
        fn parse_frames(&mut self, frames: Vec<String>) -> Result<(), ClientError> {
            for frame in frames {
                if let Some(event) = self.parser.parse_frame(&frame)? {
                    self.pending.push_back(event);
                }
            }
            Ok(())
        }

        async fn next_chunk(&mut self) -> Option<Result<bytes::Bytes, ClientError>> {
            match self.idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, self.bytes_stream.next()).await {
                    Ok(next) => next,
                    Err(_) => Some(Err(ClientError::transport(format!(
                        "no data received for {}ms",
                        limit.as_millis()
                    )))),
                },
                None => self.bytes_stream.next().await,
            }
        }
    }

    stream::try_unfold(
        State {
            bytes_stream,
            decoder: ChunkDecoder::new(),
            parser,
            idle_timeout,
            pending: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Ok(Some((event, state)));
                }
                if state.done {
                    return Ok(None);
                }

                match state.next_chunk().await {
                    Some(Ok(chunk)) => {
                        let frames = state.decoder.push_chunk(&chunk);
                        state.parse_frames(frames)?;
                    }
                    Some(Err(e)) => return Err(e),
                    None => {
                        state.done = true;
                        if let Some(tail) = state.decoder.finish() {
                            debug!(bytes = tail.len(), "flushing unterminated final frame");
                            state.parse_frames(vec![tail])?;
                        }
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Stage;

    fn body(chunks: Vec<&'static [u8]>) -> ByteStream {
        Box::pin(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(bytes::Bytes::from_static(c))),
        ))
    }

    async fn collect(bytes: ByteStream) -> Vec<Result<StreamEvent, ClientError>> {
        event_stream(bytes, EventFrameParser::default(), None).collect().await
    }

    #[tokio::test]
    async fn reassembles_events_split_across_chunks() {
        let events = collect(body(vec![
            b"data: {\"event\":\"validate_sql\",\"data\":{\"validated_sql\":\"SEL",
            b"ECT 1\"}}\n\n: keep-alive\n\ndata: {\"event\":\"end\"}\n\n",
        ]))
        .await;
        let stages: Vec<Stage> = events
            .into_iter()
            .map(|e| e.expect("event").stage)
            .collect();
        assert_eq!(stages, vec![Stage::ValidateSql, Stage::End]);
    }

    #[tokio::test]
    async fn flushes_unterminated_final_event() {
        let events = collect(body(vec![b"data: {\"event\":\"end\"}"])).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().expect("event").stage, Stage::End);
    }

    #[tokio::test]
    async fn framing_error_ends_the_stream() {
        let events = collect(body(vec![
            b"data: {broken\n",
            b"data: {\"event\":\"end\"}\n",
        ]))
        .await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(ClientError::Framing { .. })));
    }

    #[tokio::test]
    async fn transport_error_is_yielded() {
        let bytes: ByteStream = Box::pin(stream::iter(vec![
            Ok(bytes::Bytes::from_static(b"data: {\"event\":\"visualizer\",\"data\":{}}\n")),
            Err(ClientError::transport("connection reset")),
        ]));
        let events = collect(bytes).await;
        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        assert!(matches!(events[1], Err(ClientError::Transport { .. })));
    }

    #[tokio::test]
    async fn idle_timeout_reports_stalled_stream() {
        let bytes: ByteStream = Box::pin(
            stream::iter(vec![Ok(bytes::Bytes::from_static(
                b"data: {\"event\":\"visualizer\",\"data\":{}}\n",
            ))])
            .chain(stream::pending()),
        );
        let events: Vec<_> = event_stream(
            bytes,
            EventFrameParser::default(),
            Some(Duration::from_millis(20)),
        )
        .collect()
        .await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Err(ClientError::Transport { .. })));
    }
}
