use crate::db::webhook_event_log_repository::WebhookEventLogRepository;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockWebhookEventLogRepository {
    events: Arc<Mutex<HashSet<String>>>,
    pub checks: Arc<Mutex<usize>>,
    pub inserts: Arc<Mutex<usize>>,
    pub fail_checks: bool,
    pub fail_inserts: bool,
}

impl MockWebhookEventLogRepository {
    #[allow(dead_code)]
    pub fn recorded_events(&self) -> Vec<String> {
        self.events.lock().unwrap().iter().cloned().collect()
    }

    #[allow(dead_code)]
    pub fn with_processed_event(self, event_id: &str) -> Self {
        self.events.lock().unwrap().insert(event_id.to_string());
        self
    }
}

#[async_trait]
impl WebhookEventLogRepository for MockWebhookEventLogRepository {
    async fn has_processed_event(&self, event_id: &str) -> Result<bool, sqlx::Error> {
        let mut guard = self.checks.lock().unwrap();
        *guard += 1;
        if self.fail_checks {
            return Err(sqlx::Error::Protocol("Mock event log failure".into()));
        }
        Ok(self.events.lock().unwrap().contains(event_id))
    }

    async fn record_event(&self, event_id: &str) -> Result<(), sqlx::Error> {
        let mut guard = self.inserts.lock().unwrap();
        *guard += 1;
        if self.fail_inserts {
            return Err(sqlx::Error::Protocol("Mock event log failure".into()));
        }
        self.events.lock().unwrap().insert(event_id.to_string());
        Ok(())
    }
}
