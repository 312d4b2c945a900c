//! 内容生成结果
//!
//! 每次调用现算现返回，不落库

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// 难词表：词位置（按空白切分，从 0 开始）→ 简化释义
///
/// 序列化时键为字符串（"3"、"7"），不要求连续
pub type GlossaryResult = BTreeMap<usize, String>;

/// 解题步骤：序号 → 步骤描述，键连续 0..n
pub type StepsResult = BTreeMap<usize, String>;

/// 全文讲解
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationResult {
    pub explanation: String,
    /// 未调用 LLM 或 LLM 未返回用量时为 0
    pub tokens_used: u32,
}

/// 单道选择题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    pub const MIN_OPTIONS: usize = 3;
    pub const MAX_OPTIONS: usize = 5;

    /// 题干非空、3~5 个选项、答案恰好等于其中一个选项（区分大小写）
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
            && (Self::MIN_OPTIONS..=Self::MAX_OPTIONS).contains(&self.options.len())
            && self.options.iter().filter(|o| **o == self.answer).count() == 1
    }
}

/// 测验
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub questions: Vec<QuizQuestion>,
}

impl QuizResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// 内容生成类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentKind {
    Glossary,
    Explanation,
    Steps,
    Quiz,
}

impl EnrichmentKind {
    pub const ALL: [EnrichmentKind; 4] = [
        EnrichmentKind::Glossary,
        EnrichmentKind::Explanation,
        EnrichmentKind::Steps,
        EnrichmentKind::Quiz,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnrichmentKind::Glossary => "glossary",
            EnrichmentKind::Explanation => "explanation",
            EnrichmentKind::Steps => "steps",
            EnrichmentKind::Quiz => "quiz",
        }
    }
}

impl Display for EnrichmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 任意一种内容生成的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum Enrichment {
    Glossary(GlossaryResult),
    Explanation(ExplanationResult),
    Steps(StepsResult),
    Quiz(QuizResult),
}

impl Enrichment {
    pub fn kind(&self) -> EnrichmentKind {
        match self {
            Enrichment::Glossary(_) => EnrichmentKind::Glossary,
            Enrichment::Explanation(_) => EnrichmentKind::Explanation,
            Enrichment::Steps(_) => EnrichmentKind::Steps,
            Enrichment::Quiz(_) => EnrichmentKind::Quiz,
        }
    }
}
