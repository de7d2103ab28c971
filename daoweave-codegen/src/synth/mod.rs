//! SQL synthesis: statement plans per contract method, rendered into provider
//! functions or evaluated directly for previews.

mod plan;
mod preview;
pub(crate) mod render;

pub use plan::{
    Assignment, Condition, OrderTerm, StatementPlan, ValueExpr, plan_methods, plan_statement,
};
pub use preview::{FieldValues, preview, preview_update};
