//! mailflow — polls a mailbox and evaluates each new message through a
//! three-stage pipeline: categorize, summarize, rate importance.

pub mod config;
pub mod error;
pub mod llm;
pub mod monitor;
pub mod pipeline;
