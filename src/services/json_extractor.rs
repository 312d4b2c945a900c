//! 从 LLM 原始回复中提取 JSON
//!
//! 模型经常不听"只返回 JSON"的指令：前后带说明文字、包在代码块里，
//! 或者尾部被截断。所有生成能力都通过 [`extract`] 解析回复。
//!
//! 依次尝试：
//! 1. 整段直接解析
//! 2. 按 ``` 切分，去掉语言标记行后解析被括号包围的片段
//! 3. 截取第一个 `{` 到最后一个 `}`，解析失败再试 `[` 到 `]`
//! 4. 全部失败返回 None，由调用方走兜底

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

const FENCE: &str = "```";

static LANGUAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*[A-Za-z][A-Za-z0-9_+\-]*[ \t]*\r?\n").unwrap());

/// 提取结构化数据，失败返回 None
pub fn extract(raw_text: &str) -> Option<Value> {
    if let Some(value) = try_parse(raw_text) {
        return Some(value);
    }

    if raw_text.contains(FENCE) {
        if let Some(value) = raw_text.split(FENCE).find_map(parse_fenced_segment) {
            debug!("从代码块中提取到 JSON");
            return Some(value);
        }
    }

    // 先按对象截取，失败再按数组截取，说明文字里的 `[...]` 不会挡住后面的对象
    let value = bracket_span(raw_text, '{', '}')
        .and_then(try_parse)
        .or_else(|| bracket_span(raw_text, '[', ']').and_then(try_parse));
    if value.is_some() {
        debug!("从括号区间中提取到 JSON");
    }
    value
}

fn try_parse(text: &str) -> Option<Value> {
    serde_json::from_str(text.trim()).ok()
}

/// 代码块片段：去掉首行语言标记（如 `json`），只解析被括号完整包围的内容
fn parse_fenced_segment(segment: &str) -> Option<Value> {
    let candidate = LANGUAGE_TAG.replace(segment, "");
    let candidate = candidate.trim();
    if is_bracket_delimited(candidate) {
        try_parse(candidate)
    } else {
        None
    }
}

fn is_bracket_delimited(text: &str) -> bool {
    (text.starts_with('{') && text.ends_with('}')) || (text.starts_with('[') && text.ends_with(']'))
}

/// 第一个 `open` 到最后一个 `close`（含）
fn bracket_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_json() {
        assert_eq!(extract(r#"{"0": "def"}"#), Some(json!({"0": "def"})));
        assert_eq!(extract(" [1, 2] \n"), Some(json!([1, 2])));
    }

    #[test]
    fn test_fenced_json_with_language_tag() {
        let raw = "Here is the result:\n```json\n{\"0\":\"def\"}\n```";
        assert_eq!(extract(raw), Some(json!({"0": "def"})));
    }

    #[test]
    fn test_fenced_json_without_language_tag() {
        let raw = "Voici :\n```\n{\"steps\": [\"a\", \"b\"]}\n```\nBonne chance !";
        assert_eq!(extract(raw), Some(json!({"steps": ["a", "b"]})));
    }

    #[test]
    fn test_fenced_array() {
        let raw = "```json\n[{\"question\": \"Q\"}]\n```";
        assert_eq!(extract(raw), Some(json!([{"question": "Q"}])));
    }

    #[test]
    fn test_surrounding_prose() {
        let raw = "Bien sûr ! Voici le JSON demandé : {\"3\": \"simple\", \"7\": \"facile\"} J'espère que cela aide.";
        assert_eq!(extract(raw), Some(json!({"3": "simple", "7": "facile"})));
    }

    #[test]
    fn test_array_in_prose_is_not_cut_to_first_object() {
        let raw = "Quiz : [{\"a\": 1}, {\"a\": 2}] fin";
        assert_eq!(extract(raw), Some(json!([{"a": 1}, {"a": 2}])));
    }

    #[test]
    fn test_bracketed_prose_before_object() {
        assert_eq!(
            extract("Voici les mots [niveau CM2] : {\"0\": \"def\"}"),
            Some(json!({"0": "def"}))
        );
        assert_eq!(
            extract("Réponse [JSON] : {\"questions\": [1, 2]}"),
            Some(json!({"questions": [1, 2]}))
        );
    }

    #[test]
    fn test_object_containing_array_in_prose() {
        let raw = "Résultat {\"items\": [1, 2, 3]} voilà";
        assert_eq!(extract(raw), Some(json!({"items": [1, 2, 3]})));
    }

    #[test]
    fn test_unbalanced_or_missing() {
        assert_eq!(extract("pas de JSON ici"), None);
        assert_eq!(extract("} inversé {"), None);
        assert_eq!(extract("{\"a\": tronqué"), None);
        assert_eq!(extract(""), None);
    }

    #[test]
    fn test_embedded_value_equals_direct_parse() {
        let payload = r#"{"processed_text": "Exercice 1 : calcule 2+2.", "detected_type": "exercice"}"#;
        let direct: Value = serde_json::from_str(payload).unwrap();

        for wrapped in [
            format!("Voici la réponse : {}", payload),
            format!("{}\nMerci.", payload),
            format!("```json\n{}\n```", payload),
            format!("Résultat :\n```\n{}\n```\nfin", payload),
        ] {
            assert_eq!(extract(&wrapped), Some(direct.clone()), "输入: {}", wrapped);
        }
    }
}
