//! Client sessions and what they remember between statements.

pub mod session;
