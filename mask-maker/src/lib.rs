mod async_task;
mod error;
mod geometry;
mod keymap;
mod pixel_buffer;
mod session;
mod viewer;

pub use async_task::*;
pub use error::*;
pub use geometry::*;
pub use keymap::*;
pub use pixel_buffer::*;
pub use session::*;
pub use viewer::*;

pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn Future<Output = T> + Send + 'a>>;
