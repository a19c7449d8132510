// Review screen: record loading, blob references and the presentation
// models for the summary, ATS and details panels.

pub mod handlers;
pub mod loader;
pub mod view;
