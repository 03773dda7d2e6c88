pub mod attr;
pub mod buffer;
pub mod color;
pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod handler;
pub mod logger;
pub mod record;
pub mod render;
pub mod sink;

pub mod layer;
pub mod init;

pub use attr::{Attr, Value};
pub use config::{HandlerOptions, TimeFormat};
pub use handler::Handler;
pub use logger::{Logger, ScopeMerge};
pub use record::{Level, Record, Source};
