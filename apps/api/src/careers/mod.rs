//! Resume uploads in, skills and career suggestions out.

pub mod documents;
pub mod handlers;
pub mod pipeline;
