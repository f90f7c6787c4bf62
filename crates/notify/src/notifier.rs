use std::sync::{Arc, Mutex};

use thiserror::Error;

use stockbook_core::{AggregateId, UserId};

/// Failure inside a notifier implementation.
///
/// Callers log these and move on; a failed notification must not fail the
/// stock or order mutation that triggered it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound hook invoked when stock crosses a reorder threshold or an
/// order/purchase-order changes status.
///
/// The core never decides who to notify; callers supply the target user.
pub trait ThresholdNotifier: Send + Sync {
    fn notify_low_stock(
        &self,
        user_id: UserId,
        item_name: &str,
        current_stock: i64,
        threshold: i64,
    ) -> Result<(), NotifyError>;

    fn notify_order_status(
        &self,
        user_id: UserId,
        order_id: AggregateId,
        status: &str,
    ) -> Result<(), NotifyError>;
}

impl<N> ThresholdNotifier for Arc<N>
where
    N: ThresholdNotifier + ?Sized,
{
    fn notify_low_stock(
        &self,
        user_id: UserId,
        item_name: &str,
        current_stock: i64,
        threshold: i64,
    ) -> Result<(), NotifyError> {
        (**self).notify_low_stock(user_id, item_name, current_stock, threshold)
    }

    fn notify_order_status(
        &self,
        user_id: UserId,
        order_id: AggregateId,
        status: &str,
    ) -> Result<(), NotifyError> {
        (**self).notify_order_status(user_id, order_id, status)
    }
}

/// Notifier that emits structured tracing events instead of delivering
/// anything. Suitable default until a real delivery channel is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl ThresholdNotifier for TracingNotifier {
    fn notify_low_stock(
        &self,
        user_id: UserId,
        item_name: &str,
        current_stock: i64,
        threshold: i64,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            %user_id,
            item_name,
            current_stock,
            threshold,
            "low stock alert"
        );
        Ok(())
    }

    fn notify_order_status(
        &self,
        user_id: UserId,
        order_id: AggregateId,
        status: &str,
    ) -> Result<(), NotifyError> {
        tracing::info!(%user_id, %order_id, status, "order status changed");
        Ok(())
    }
}

/// A recorded hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    LowStock {
        user_id: UserId,
        item_name: String,
        current_stock: i64,
        threshold: i64,
    },
    OrderStatus {
        user_id: UserId,
        order_id: AggregateId,
        status: String,
    },
}

/// Test double: records every call, optionally failing each one.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<NotifierCall>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails, for exercising the
    /// swallow-and-log policy.
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: NotifierCall) -> Result<(), NotifyError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if self.fail {
            Err(NotifyError("simulated delivery failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl ThresholdNotifier for RecordingNotifier {
    fn notify_low_stock(
        &self,
        user_id: UserId,
        item_name: &str,
        current_stock: i64,
        threshold: i64,
    ) -> Result<(), NotifyError> {
        self.record(NotifierCall::LowStock {
            user_id,
            item_name: item_name.to_string(),
            current_stock,
            threshold,
        })
    }

    fn notify_order_status(
        &self,
        user_id: UserId,
        order_id: AggregateId,
        status: &str,
    ) -> Result<(), NotifyError> {
        self.record(NotifierCall::OrderStatus {
            user_id,
            order_id,
            status: status.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_captures_calls() {
        let notifier = RecordingNotifier::new();
        let user = UserId::new();
        notifier.notify_low_stock(user, "Widget", 3, 10).unwrap();
        let calls = notifier.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            NotifierCall::LowStock {
                user_id: user,
                item_name: "Widget".to_string(),
                current_stock: 3,
                threshold: 10,
            }
        );
    }

    #[test]
    fn failing_notifier_still_records() {
        let notifier = RecordingNotifier::failing();
        let user = UserId::new();
        let err = notifier
            .notify_order_status(user, AggregateId::new(), "Completed")
            .unwrap_err();
        assert!(err.0.contains("simulated"));
        assert_eq!(notifier.calls().len(), 1);
    }
}
