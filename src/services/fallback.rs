//! 启发式兜底 - 业务能力层
//!
//! LLM 未启用、调用失败或回复无法解析时使用。
//! 全部为确定性的纯函数，不依赖任何外部服务。

use std::collections::HashSet;

use crate::models::{DocumentType, GlossaryResult, LearnerContext, StepsResult};
use crate::utils::text::truncate_text;

/// 难词：首选最短长度
pub const GLOSSARY_MIN_LEN: usize = 9;
/// 难词：首选最多条数
pub const GLOSSARY_MAX_ENTRIES: usize = 5;
/// 难词：放宽后的最短长度
pub const GLOSSARY_RELAXED_MIN_LEN: usize = 7;
/// 难词：放宽后的最多条数
pub const GLOSSARY_RELAXED_MAX_ENTRIES: usize = 3;

/// 讲解兜底的最大字符数（不含 `...`）
pub const EXPLANATION_MAX_CHARS: usize = 600;
const EXPLANATION_MAX_SENTENCES: usize = 5;

const EXERCISE_KEYWORDS: &[&str] = &["exercice", "exercise"];
const COURSE_KEYWORDS: &[&str] = &["résumé", "resume", "chapitre", "leçon", "lecon"];

const WORD_PUNCTUATION: &[char] = &[
    ',', '.', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'', '«', '»', '“', '”',
    '–', '-', '_',
];

const BULLET_MARKERS: &[char] = &['-', '•', '*', '\t', ' '];

const GENERIC_STEPS: [&str; 4] = [
    "Lire attentivement l'énoncé",
    "Identifier les données connues et la question posée",
    "Choisir la méthode adaptée",
    "Appliquer la méthode étape par étape et vérifier sa démarche, sans donner la réponse finale",
];

// ========== 分类 ==========

/// 离线"清洗"：只做长度截断
///
/// 不超过 `max_chars` 时与输入完全一致
pub fn pseudo_clean_text(raw_text: &str, max_chars: usize) -> String {
    truncate_text(raw_text, max_chars)
}

/// 基于关键词的类型判断（不区分大小写）
pub fn detect_type(text: &str) -> DocumentType {
    let lower = text.to_lowercase();
    if EXERCISE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        DocumentType::Exercise
    } else if COURSE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        DocumentType::Text
    } else {
        DocumentType::Unknown
    }
}

// ========== 难词 ==========

/// 难词表兜底
///
/// 首选：去掉首尾标点后全为字母、长度 ≥ 9 的词，取前 5 个（同一个词只取第一次出现）。
/// 一个都没有时：取长度 ≥ 7 的最长 3 个词（等长按出现顺序）。
pub fn glossary(text: &str, learner: &LearnerContext) -> GlossaryResult {
    let words: Vec<(usize, &str)> = text
        .split_whitespace()
        .enumerate()
        .map(|(index, token)| (index, token.trim_matches(WORD_PUNCTUATION)))
        .filter(|(_, word)| is_alphabetic_word(word))
        .collect();

    let mut picked = pick_unique(
        words.iter().filter(|entry| char_len(entry.1) >= GLOSSARY_MIN_LEN),
        GLOSSARY_MAX_ENTRIES,
    );

    if picked.is_empty() {
        let mut relaxed: Vec<(usize, &str)> = words
            .iter()
            .filter(|entry| char_len(entry.1) >= GLOSSARY_RELAXED_MIN_LEN)
            .copied()
            .collect();
        // 稳定排序，等长保持出现顺序
        relaxed.sort_by_key(|entry| std::cmp::Reverse(char_len(entry.1)));
        picked = pick_unique(relaxed.iter(), GLOSSARY_RELAXED_MAX_ENTRIES);
    }

    picked
        .into_iter()
        .map(|(index, word)| (index, glossary_definition(word, learner)))
        .collect()
}

fn pick_unique<'w, 't: 'w, I>(candidates: I, limit: usize) -> Vec<(usize, &'t str)>
where
    I: Iterator<Item = &'w (usize, &'t str)>,
{
    let mut seen = HashSet::new();
    candidates
        .filter(|entry| seen.insert(entry.1.to_lowercase()))
        .take(limit)
        .copied()
        .collect()
}

fn glossary_definition(word: &str, learner: &LearnerContext) -> String {
    format!(
        "Définition simplifiée du mot « {} » adaptée à {} ans (classe {}).",
        word,
        learner.age(),
        learner.grade()
    )
}

fn is_alphabetic_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_alphabetic)
}

fn char_len(word: &str) -> usize {
    word.chars().count()
}

// ========== 讲解 ==========

/// 讲解兜底：取前 2~5 个句子，用 ". " 连接，最多 600 字符
pub fn explanation(text: &str) -> String {
    let normalized = text.replace('\r', " ");
    let snippet = normalized
        .split('.')
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .take(EXPLANATION_MAX_SENTENCES)
        .collect::<Vec<_>>()
        .join(". ");

    let snippet = if snippet.is_empty() {
        text.trim().to_string()
    } else {
        snippet
    };

    truncate_text(&snippet, EXPLANATION_MAX_CHARS)
}

// ========== 解题步骤 ==========

/// 通用解题步骤（不含答案），键为 0..n
pub fn generic_steps() -> StepsResult {
    GENERIC_STEPS
        .iter()
        .enumerate()
        .map(|(index, step)| (index, step.to_string()))
        .collect()
}

/// 把纯文本回复按行拆成步骤，去掉行首的列表符号
pub fn steps_from_lines(raw: &str) -> StepsResult {
    raw.lines()
        .map(|line| line.trim_start_matches(BULLET_MARKERS).trim_end())
        .filter(|line| !line.is_empty() && !line.starts_with("```"))
        .enumerate()
        .map(|(index, line)| (index, line.to_string()))
        .collect()
}
