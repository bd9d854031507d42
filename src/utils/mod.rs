//! 工具模块

mod text;

pub use text::truncate_chars;
