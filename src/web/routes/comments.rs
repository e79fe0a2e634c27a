use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
    Extension,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::services::comment_service::{self, CommentDto};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubQuery {
    activity_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ServerFrame {
    LoadComments { comments: Vec<CommentDto> },
    ReceiveComment { comment: CommentDto },
    Error { message: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ClientFrame {
    SendComment { body: String },
}

fn frame_text(frame: &ServerFrame) -> Option<Message> {
    match serde_json::to_string(frame) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            warn!(error = %e, "comment frame serialization failed");
            None
        }
    }
}

fn error_message(err: &AppError) -> String {
    match err {
        AppError::Validation(errors) => errors
            .messages()
            .next()
            .unwrap_or("Invalid comment")
            .to_string(),
        AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.clone(),
        _ => "Failed to add comment".to_string(),
    }
}

pub async fn comments_hub_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(query): Query<HubQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let activity_id = query
        .activity_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("No activity with this id"))?;

    Ok(ws.on_upgrade(move |socket| run_connection(socket, state, auth_user, activity_id)))
}

async fn run_connection(
    socket: WebSocket,
    state: AppState,
    auth_user: AuthenticatedUser,
    activity_id: String,
) {
    let mut group = state.hub.join(&activity_id);
    let (mut outgoing, mut incoming) = socket.split();
    info!(activity_id = %activity_id, user_id = %auth_user.id, "joined comment group");

    let initial = match comment_service::list_comments(&state.pool, &activity_id).await {
        Ok(comments) => ServerFrame::LoadComments { comments },
        Err(e) => ServerFrame::Error {
            message: error_message(&e),
        },
    };
    let mut open = match frame_text(&initial) {
        Some(msg) => outgoing.send(msg).await.is_ok(),
        None => true,
    };

    while open {
        tokio::select! {
            received = incoming.next() => {
                let text = match received {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };
                let reply = match serde_json::from_str::<ClientFrame>(&text) {
                    Ok(ClientFrame::SendComment { body }) => {
                        match comment_service::add_comment(&state.pool, &auth_user.id, &activity_id, &body).await {
                            Ok(comment) => {
                                state.hub.publish(&activity_id, comment);
                                None
                            }
                            Err(e) => Some(ServerFrame::Error { message: error_message(&e) }),
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "unrecognised comment frame");
                        Some(ServerFrame::Error { message: "Unrecognised message".to_string() })
                    }
                };
                if let Some(msg) = reply.as_ref().and_then(frame_text) {
                    open = outgoing.send(msg).await.is_ok();
                }
            }
            published = group.recv() => {
                match published {
                    Ok(comment) => {
                        if let Some(msg) = frame_text(&ServerFrame::ReceiveComment { comment }) {
                            open = outgoing.send(msg).await.is_ok();
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(activity_id = %activity_id, skipped, "comment subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    drop(group);
    state.hub.leave(&activity_id);
    info!(activity_id = %activity_id, user_id = %auth_user.id, "left comment group");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn server_frames_are_tagged_by_type() {
        let comment = CommentDto {
            id: "c1".into(),
            body: "hello".into(),
            created_at: Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap(),
            user_id: "u1".into(),
            display_name: "Bob".into(),
            image_url: None,
        };
        let value = serde_json::to_value(ServerFrame::ReceiveComment { comment }).unwrap();

        assert_eq!(value["type"], "ReceiveComment");
        assert_eq!(value["comment"]["displayName"], "Bob");
        assert_eq!(value["comment"]["createdAt"], "2030-01-01T12:00:00Z");
    }

    #[test]
    fn client_frames_parse_send_comment() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"type":"SendComment","body":"hi"}"#).unwrap();
        let ClientFrame::SendComment { body } = frame;
        assert_eq!(body, "hi");
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"Other"}"#).is_err());
    }

    #[test]
    fn validation_errors_surface_their_first_message() {
        let err = AppError::invalid("Body", "Comment body is required");
        assert_eq!(error_message(&err), "Comment body is required");
        assert_eq!(
            error_message(&AppError::not_found("Could not find activity")),
            "Could not find activity"
        );
    }
}
