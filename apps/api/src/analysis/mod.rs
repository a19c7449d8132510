// Upload screen: resume selection, the analysis workflow and its statuses.

pub mod handlers;
pub mod sample;
pub mod status;
pub mod workflow;
