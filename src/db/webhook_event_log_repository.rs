use async_trait::async_trait;

/// Idempotency fast path for redelivered processor events. The transitions
/// the reconciler applies are themselves idempotent, so this log is an
/// optimization and a duplicate-receipt guard, not the sole safety net.
#[async_trait]
pub trait WebhookEventLogRepository: Send + Sync {
    async fn has_processed_event(&self, event_id: &str) -> Result<bool, sqlx::Error>;

    async fn record_event(&self, event_id: &str) -> Result<(), sqlx::Error>;
}
