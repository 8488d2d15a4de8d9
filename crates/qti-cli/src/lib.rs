//! Library components of the exam-to-QTI converter CLI.

pub mod logging;
pub mod pipeline;
