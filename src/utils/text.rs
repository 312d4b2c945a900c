/// 截断标记
pub const ELLIPSIS: &str = "...";

/// 按字符数截断文本，超出部分以 `...` 代替
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 不超过 `max_len` 时原样返回；否则返回前 `max_len` 个字符加 `...`
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + ELLIPSIS
    } else {
        text.to_string()
    }
}
