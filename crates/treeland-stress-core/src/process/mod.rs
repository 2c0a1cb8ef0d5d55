pub mod errors;
pub mod operations;
pub mod types;

pub use errors::ProcessError;
pub use operations::{
    find_process_by_name, force_kill_process, is_process_running, terminate_process,
};
pub use types::{Pid, ProcessInfo, ProcessStatus};
