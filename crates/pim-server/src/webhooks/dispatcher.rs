//! Webhook delivery
//!
//! `dispatch` is fire-and-forget: it spawns a task that snapshots the active
//! subscriptions for the event type and posts to each of them concurrently.
//! A subscriber failure is recorded in the delivery log and never propagates
//! to the caller or to the other subscribers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::models::{EventType, Webhook};
use crate::store::{DeliveryLog, NewDeliveryLog, SubscriptionStore};

/// Fans out events to webhook subscriptions.
#[derive(Clone)]
pub struct Dispatcher {
    subscriptions: Arc<dyn SubscriptionStore>,
    log: Arc<dyn DeliveryLog>,
    client: reqwest::Client,
    error_max_len: usize,
}

impl Dispatcher {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        log: Arc<dyn DeliveryLog>,
        timeout: Duration,
        error_max_len: usize,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            subscriptions,
            log,
            client,
            error_max_len,
        })
    }

    /// Deliver `payload` to every active subscription for `event_type`,
    /// on a background task. Never blocks and never fails the caller.
    pub fn dispatch(&self, event_type: EventType, payload: Value) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.deliver_all(event_type, payload).await;
        });
    }

    async fn deliver_all(&self, event_type: EventType, payload: Value) {
        let subscriptions = match self.subscriptions.list_active_matching(event_type).await {
            Ok(subs) => subs,
            Err(e) => {
                error!(event_type = %event_type, error = %e, "failed to load webhook subscriptions");
                return;
            }
        };

        if subscriptions.is_empty() {
            debug!(event_type = %event_type, "no active subscriptions for event");
            return;
        }

        let deliveries = subscriptions
            .iter()
            .map(|webhook| self.deliver_to(webhook, event_type, &payload));
        futures::future::join_all(deliveries).await;
    }

    /// Deliver one event to one subscription and log the attempt.
    ///
    /// Also the entry point for operator-triggered test deliveries, which
    /// target a single subscription regardless of its event filter.
    pub async fn deliver_to(&self, webhook: &Webhook, event_type: EventType, payload: &Value) {
        let body = json!({
            "event_type": event_type.as_str(),
            "data": payload,
        });

        let start = Instant::now();
        let result = self.client.post(&webhook.url).json(&body).send().await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let entry = match result {
            Ok(response) => {
                let status = response.status();
                let error_message = if status.is_client_error() || status.is_server_error() {
                    let text = response.text().await.unwrap_or_default();
                    warn!(
                        webhook_id = %webhook.id,
                        status = status.as_u16(),
                        "webhook delivery rejected by subscriber"
                    );
                    Some(truncate(&text, self.error_max_len))
                } else {
                    None
                };
                NewDeliveryLog {
                    webhook_id: webhook.id,
                    event_type: event_type.to_string(),
                    status_code: Some(i32::from(status.as_u16())),
                    response_time_ms: Some(elapsed_ms),
                    error_message,
                }
            }
            Err(e) => {
                warn!(webhook_id = %webhook.id, error = %e, "webhook delivery failed");
                NewDeliveryLog {
                    webhook_id: webhook.id,
                    event_type: event_type.to_string(),
                    status_code: None,
                    response_time_ms: Some(elapsed_ms),
                    error_message: Some(truncate(&e.to_string(), self.error_max_len)),
                }
            }
        };

        if let Err(e) = self.log.append(entry).await {
            error!(webhook_id = %webhook.id, error = %e, "failed to record webhook delivery");
        }
    }
}

/// Truncate to at most `max` characters, on a char boundary.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::memory::MemStore;
    use chrono::Utc;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn webhook(url: String, event_type: EventType) -> Webhook {
        let now = Utc::now();
        Webhook {
            id: Uuid::new_v4(),
            url,
            event_type,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn dispatcher(store: Arc<MemStore>, timeout: Duration) -> Dispatcher {
        Dispatcher::new(store.clone(), store, timeout, 500).unwrap()
    }

    #[tokio::test]
    async fn test_delivers_to_all_matching_subscriptions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(json!({"event_type": "product_created"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let store = Arc::new(MemStore::with_webhooks(vec![
            webhook(format!("{}/hook", server.uri()), EventType::ProductCreated),
            webhook(format!("{}/hook", server.uri()), EventType::ProductCreated),
            webhook(format!("{}/hook", server.uri()), EventType::ProductDeleted),
        ]));
        let dispatcher = dispatcher(store.clone(), Duration::from_secs(5));

        dispatcher
            .deliver_all(EventType::ProductCreated, json!({"sku": "A1"}))
            .await;

        let logs = store.log_entries();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l.status_code == Some(200)));
        assert!(logs.iter().all(|l| l.response_time_ms.is_some()));
        assert!(logs.iter().all(|l| l.error_message.is_none()));
    }

    #[tokio::test]
    async fn test_no_subscriptions_is_a_noop() {
        let store = Arc::new(MemStore::new());
        let dispatcher = dispatcher(store.clone(), Duration::from_secs(1));

        dispatcher
            .deliver_all(EventType::ProductUpdated, json!({}))
            .await;

        assert!(store.log_entries().is_empty());
    }

    #[tokio::test]
    async fn test_error_response_records_truncated_body() {
        let server = MockServer::start().await;
        let long_body = "x".repeat(2000);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string(long_body))
            .mount(&server)
            .await;

        let store = Arc::new(MemStore::with_webhooks(vec![webhook(
            server.uri(),
            EventType::ProductCreated,
        )]));
        let dispatcher = dispatcher(store.clone(), Duration::from_secs(5));

        dispatcher
            .deliver_all(EventType::ProductCreated, json!({}))
            .await;

        let logs = store.log_entries();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status_code, Some(500));
        assert_eq!(logs[0].error_message.as_ref().unwrap().len(), 500);
    }

    #[tokio::test]
    async fn test_one_slow_subscriber_does_not_block_the_others() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/fast"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = Arc::new(MemStore::with_webhooks(vec![
            webhook(format!("{}/slow", server.uri()), EventType::ProductCreated),
            webhook(format!("{}/fast", server.uri()), EventType::ProductCreated),
            webhook(format!("{}/fast", server.uri()), EventType::ProductCreated),
        ]));
        let dispatcher = dispatcher(store.clone(), Duration::from_millis(250));

        dispatcher
            .deliver_all(EventType::ProductCreated, json!({}))
            .await;

        // The slow subscriber times out; every attempt is still logged.
        let logs = store.log_entries();
        assert_eq!(logs.len(), 3);
        let timeouts: Vec<_> = logs.iter().filter(|l| l.status_code.is_none()).collect();
        assert_eq!(timeouts.len(), 1);
        assert!(timeouts[0].error_message.is_some());
        assert_eq!(
            logs.iter().filter(|l| l.status_code == Some(200)).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_transport_failure_records_no_status() {
        // Nothing listens on this port.
        let store = Arc::new(MemStore::with_webhooks(vec![webhook(
            "http://127.0.0.1:1/hook".to_string(),
            EventType::Test,
        )]));
        let dispatcher = dispatcher(store.clone(), Duration::from_secs(1));

        dispatcher.deliver_all(EventType::Test, json!({})).await;

        let logs = store.log_entries();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status_code, None);
        assert!(logs[0].error_message.is_some());
        assert!(logs[0].response_time_ms.is_some());
    }

    #[test]
    fn test_truncate_char_safe() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        // Multi-byte chars count as one.
        assert_eq!(truncate("ééééé", 3), "ééé");
    }
}
