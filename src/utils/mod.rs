//! Console output helpers: styled status lines and progress bars

pub mod progress;
pub mod styling;

pub use progress::{abandon, create_progress_bar, create_spinner, finish_with_success};
pub use styling::{
    format_duration, print_banner, print_completion, print_config, print_info, print_step_header,
    print_step_time, print_success, print_warning,
};
