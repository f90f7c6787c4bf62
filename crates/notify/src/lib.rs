//! `stockbook-notify` — the threshold notifier hook.
//!
//! A narrow call-out contract, not a component: the core decides *when* a
//! threshold is crossed or a status changed, the caller supplies *who* to
//! tell, and delivery mechanics live behind the trait. Fire-and-forget:
//! hook failures never roll back the mutation that triggered them.

pub mod notifier;

pub use notifier::{
    NotifierCall, NotifyError, RecordingNotifier, ThresholdNotifier, TracingNotifier,
};
