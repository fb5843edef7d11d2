pub mod group_ctx;
pub mod group_flow;

pub use group_ctx::{partition_groups, GroupCtx};
pub use group_flow::{apply_items, GroupAttempts, GroupFlow, GroupResult};
