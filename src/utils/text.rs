//! 文本截断工具

/// 保留前 `max_chars` 个字符（按 Unicode 标量计数，不会截断在字符中间）
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &content[..byte_idx],
        None => content,
    }
}
