//! Application layer orchestrating the subscription flow.
//!
//! `FlowController` drives the state machine over the injected gateway and
//! token source; `StatusPoller` owns the single recurring status-check task
//! and its cancellation signal.

pub mod controller;
pub mod poller;
