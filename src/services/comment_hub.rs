use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::debug;

use crate::services::comment_service::CommentDto;

const GROUP_CAPACITY: usize = 64;

/// Per-activity broadcast groups for live comments.
#[derive(Default)]
pub struct CommentHub {
    groups: Mutex<HashMap<String, broadcast::Sender<CommentDto>>>,
}

impl CommentHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to an activity's group, creating it on first use.
    pub fn join(&self, activity_id: &str) -> broadcast::Receiver<CommentDto> {
        let mut groups = self.groups.lock().unwrap_or_else(|e| e.into_inner());
        groups
            .entry(activity_id.to_string())
            .or_insert_with(|| broadcast::channel(GROUP_CAPACITY).0)
            .subscribe()
    }

    /// Drops the group once its last member is gone. The caller's receiver
    /// must already be dropped.
    pub fn leave(&self, activity_id: &str) {
        let mut groups = self.groups.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = groups.get(activity_id) {
            if sender.receiver_count() == 0 {
                groups.remove(activity_id);
                debug!(activity_id, "comment group closed");
            }
        }
    }

    /// Returns how many members received the comment.
    pub fn publish(&self, activity_id: &str, comment: CommentDto) -> usize {
        let groups = self.groups.lock().unwrap_or_else(|e| e.into_inner());
        groups
            .get(activity_id)
            .and_then(|sender| sender.send(comment).ok())
            .unwrap_or(0)
    }

    #[cfg(test)]
    fn group_count(&self) -> usize {
        self.groups.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment(body: &str) -> CommentDto {
        CommentDto {
            id: "c1".into(),
            body: body.into(),
            created_at: Utc::now(),
            user_id: "u1".into(),
            display_name: "Bob".into(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn publish_reaches_only_the_activity_group() {
        let hub = CommentHub::new();
        let mut first = hub.join("a1");
        let mut second = hub.join("a1");
        let mut other = hub.join("a2");

        assert_eq!(hub.publish("a1", comment("hello")), 2);

        assert_eq!(first.recv().await.unwrap().body, "hello");
        assert_eq!(second.recv().await.unwrap().body, "hello");
        assert!(other.try_recv().is_err());
    }

    #[test]
    fn publish_to_unknown_group_is_a_no_op() {
        let hub = CommentHub::new();
        assert_eq!(hub.publish("nobody", comment("hi")), 0);
        assert_eq!(hub.group_count(), 0);
    }

    #[test]
    fn group_is_removed_after_last_member_leaves() {
        let hub = CommentHub::new();
        let first = hub.join("a1");
        let second = hub.join("a1");

        drop(first);
        hub.leave("a1");
        assert_eq!(hub.group_count(), 1);

        drop(second);
        hub.leave("a1");
        assert_eq!(hub.group_count(), 0);
    }
}
