//! Request/response bodies

pub mod invoke;
