//! State module for tracking page attempts
//!
//! `PageState` is the per-attempt state machine driven by the page processor.

mod page_state;

pub use page_state::PageState;
