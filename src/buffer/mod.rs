pub mod rec_buffer;
pub mod send_buffer;

pub use rec_buffer::{RecBuffer, RecEntry};
pub use send_buffer::{SendBuffer, SendEntry};
