pub mod add;
pub mod r#do;
pub mod lists;
pub mod log;
pub mod ls;
pub mod next;
pub mod recur;
pub mod rm;
pub mod undo;
