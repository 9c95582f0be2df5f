#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use base64::engine::general_purpose::URL_SAFE;
    use base64::Engine as _;
    use clinicflow_common::models::SentMessage;
    use clinicflow_common::services::{BoxFuture, MailBackend};
    use thiserror::Error;

    use crate::notifier::{Notifier, DEFAULT_USER_ID};

    #[derive(Debug, Error, PartialEq)]
    #[error("mailbox rejected the message")]
    struct Rejected;

    /// Records every submitted message and answers with sequential ids.
    #[derive(Default)]
    struct RecordingMailBackend {
        sent: Mutex<Vec<(String, String)>>,
        reject: bool,
    }

    impl RecordingMailBackend {
        fn rejecting() -> Self {
            Self {
                reject: true,
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }

        fn decoded(&self, index: usize) -> String {
            let raw = &self.sent()[index].1;
            String::from_utf8(URL_SAFE.decode(raw).unwrap()).unwrap()
        }
    }

    impl MailBackend for RecordingMailBackend {
        type Error = Rejected;

        fn send_raw_message(
            &self,
            user_id: &str,
            raw: &str,
        ) -> BoxFuture<'_, SentMessage, Self::Error> {
            let user_id = user_id.to_string();
            let raw = raw.to_string();
            Box::pin(async move {
                if self.reject {
                    return Err(Rejected);
                }
                let mut sent = self.sent.lock().unwrap();
                sent.push((user_id, raw));
                Ok(SentMessage {
                    id: format!("msg-{}", sent.len()),
                    thread_id: None,
                })
            })
        }
    }

    #[tokio::test]
    async fn test_successful_send_returns_message_id() {
        let backend = Arc::new(RecordingMailBackend::default());
        let notifier = Notifier::new(backend.clone(), "clinic@example.com").unwrap();

        let result = notifier
            .send_email("ana@example.com", "Your appointment", "See you Monday at 10:00.")
            .await
            .unwrap();

        assert!(result.ok);
        assert_eq!(result.message_id, "msg-1");
        assert!(!result.message_id.is_empty());
        assert_eq!(backend.sent().len(), 1);
        assert_eq!(backend.sent()[0].0, DEFAULT_USER_ID);
    }

    #[tokio::test]
    async fn test_message_headers_come_from_notifier_and_arguments() {
        let backend = Arc::new(RecordingMailBackend::default());
        let notifier = Notifier::new(backend.clone(), " clinic@example.com ").unwrap();
        assert_eq!(notifier.from_email(), "clinic@example.com");

        notifier
            .send_email(" ana@example.com ", "Reminder", "Tomorrow at 10:00")
            .await
            .unwrap();

        let mime = backend.decoded(0);
        let (headers, body) = mime.split_once("\r\n\r\n").unwrap();
        let headers: Vec<&str> = headers.split("\r\n").collect();
        assert!(headers.contains(&"To: ana@example.com"));
        assert!(headers.contains(&"From: clinic@example.com"));
        assert!(headers.contains(&"Subject: Reminder"));
        assert!(body.starts_with("Tomorrow at 10:00"));
    }

    #[tokio::test]
    async fn test_each_send_is_a_separate_message() {
        let backend = Arc::new(RecordingMailBackend::default());
        let notifier = Notifier::new(backend.clone(), "clinic@example.com").unwrap();

        let first = notifier.send_email("a@example.com", "One", "1").await.unwrap();
        let second = notifier.send_email("b@example.com", "Two", "2").await.unwrap();

        assert_ne!(first.message_id, second.message_id);
        assert_eq!(backend.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_is_wrapped() {
        let notifier = Notifier::new(Arc::new(RecordingMailBackend::rejecting()), "clinic@example.com").unwrap();

        let err = notifier
            .send_email("ana@example.com", "Hi", "x")
            .await
            .unwrap_err();

        assert!(!err.is_invalid_argument());
        assert_eq!(err.backend_source::<Rejected>(), Some(&Rejected));
        assert!(err.to_string().starts_with("mail backend error"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_never_reaches_backend() {
        let backend = Arc::new(RecordingMailBackend::default());
        let notifier = Notifier::new(backend.clone(), "clinic@example.com").unwrap();

        let err = notifier.send_email("", "Hi", "x").await.unwrap_err();
        assert!(err.is_invalid_argument());

        let err = notifier
            .send_email("ana@example.com", "Hi\nBcc: x@example.com", "x")
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(backend.sent().is_empty());
    }

    #[test]
    fn test_sender_is_required() {
        let backend = Arc::new(RecordingMailBackend::default());
        assert!(Notifier::new(backend.clone(), "  ").is_err());
        assert!(Notifier::new(backend.clone(), "clinic@example.com\r\nBcc: x").is_err());
        assert!(Notifier::new(backend, "front desk").is_err());
    }
}
