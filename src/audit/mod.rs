//! Fleet audit core: the data model, the recommendation catalog, code-rule
//! evaluation and the precedence rules used when sources disagree.

pub mod domain;
pub mod policies;
pub mod services;
