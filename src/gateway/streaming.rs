use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures_util::stream::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, instrument, warn};

use super::error::GatewayError;
use super::handler::{parse_request, run_pipeline};
use super::state::HandlerState;
use crate::model::QuizQuestion;
use crate::reporting::Tracker;

pub const REPORT_EVENT: &str = "report";
pub const RESULT_EVENT: &str = "result";
pub const ERROR_EVENT: &str = "error";

#[derive(Serialize)]
struct ResultPayload<'a> {
    questions: &'a [QuizQuestion],
}

/// Streams every report snapshot as a `report` event, then one `result` or `error` event.
///
/// Request validation happens before the stream opens, so a bad body is still a plain 400.
#[instrument(skip(state, body))]
pub async fn stream_quiz_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let (slot, request) = parse_request(body)?;

    let (tx, rx) = mpsc::unbounded_channel::<Event>();

    let report_tx = tx.clone();
    let tracker = Tracker::with_subscriber(move |snapshot| {
        match Event::default().event(REPORT_EVENT).json_data(snapshot) {
            Ok(event) => {
                // The client may have gone away; the run still finishes.
                let _ = report_tx.send(event);
            }
            Err(e) => warn!(error = %e, "Failed to encode report snapshot"),
        }
    });

    tokio::spawn(async move {
        let event = match run_pipeline(&state, slot, request, &tracker).await {
            Ok(questions) => Event::default()
                .event(RESULT_EVENT)
                .json_data(ResultPayload {
                    questions: &questions,
                }),
            Err(e) => {
                error!(error = %e, "Streamed quiz pipeline failed");
                Event::default()
                    .event(ERROR_EVENT)
                    .json_data(e.to_error_response())
            }
        };

        match event {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(e) => error!(error = %e, "Failed to encode final event"),
        }
    });

    let stream = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok(Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response())
}
