//! Command implementations for pdt

pub mod add;
pub mod del;
pub mod list;
pub mod report;
pub mod sync;

pub use add::{run_add_mod, run_add_urls};
pub use del::{run_del_mod, run_del_urls};
pub use list::run_list;
pub use sync::run_sync;
