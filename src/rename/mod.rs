mod plan;
mod queue;
mod working_set;

pub use plan::{
    NameChange, RenameOperation, RenameRules, apply_rules, diff_names, plan_renames, preview,
};
pub use queue::{
    DEFAULT_THROTTLE, RenameEvent, RenameOutcome, RenameQueue, RenameReport, RenameStatus,
    RenameTask,
};
pub use working_set::WorkingSet;
