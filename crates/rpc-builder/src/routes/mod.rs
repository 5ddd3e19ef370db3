//! One module per resource family (§6.1's route table), each a set of
//! generic `axum` handlers mounted by [`crate::build_router`].

pub mod accounts;
pub mod admin;
pub mod blocks;
pub mod fees;
pub mod logs;
pub mod subscriptions;
pub mod transactions;
