//! 测验生成 - 业务能力层
//!
//! 没有启发式兜底：LLM 不可用或回复无法解析时返回空测验

use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{LearnerContext, QuizQuestion, QuizResult};
use crate::services::json_extractor;
use crate::services::llm_service::{CallOptions, LlmService};

const QUIZ_OPTIONS: CallOptions = CallOptions::new(900, Some(0.3));

const SYSTEM_PROMPT: &str = "Tu es un assistant pédagogique qui crée des quiz adaptés à l'âge et au niveau scolaire de l'élève. \
Tu dois générer un quiz à partir du texte fourni. Chaque question doit avoir : \
le texte de la question, une liste d'options (3 à 5), la bonne réponse, et une explication. \
La réponse doit être exactement l'un des éléments dans options.";

/// 测验生成服务
pub struct QuizService {
    llm_service: LlmService,
}

impl QuizService {
    pub fn new(llm_service: LlmService) -> Self {
        Self { llm_service }
    }

    pub async fn generate(&self, processed_text: &str, learner: &LearnerContext) -> QuizResult {
        if !self.llm_service.is_enabled() {
            debug!("LLM 未启用，测验为空");
            return QuizResult::empty();
        }

        let user_message = build_user_message(processed_text, learner);
        match self
            .llm_service
            .send_to_llm(&user_message, SYSTEM_PROMPT, QUIZ_OPTIONS)
            .await
        {
            Ok(completion) => parse_quiz(&completion.content),
            Err(e) => {
                warn!("⚠️ 测验调用失败: {}", e);
                QuizResult::empty()
            }
        }
    }
}

/// 解析测验：接受题目数组，或带 `questions` 数组的对象
///
/// 不符合要求的题目（选项数不对、答案不在选项里）直接丢弃
fn parse_quiz(response: &str) -> QuizResult {
    let items = match json_extractor::extract(response) {
        Some(Value::Array(items)) => items,
        Some(Value::Object(mut map)) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            // 只有一道题时，截取到的是题目对象本身
            None if map.contains_key("question") => vec![Value::Object(map)],
            _ => {
                warn!("⚠️ 测验结果缺少 questions 数组");
                return QuizResult::empty();
            }
        },
        _ => {
            warn!("⚠️ 无法解析测验结果");
            return QuizResult::empty();
        }
    };

    let total = items.len();
    let questions: Vec<QuizQuestion> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<QuizQuestion>(item).ok())
        .filter(QuizQuestion::is_valid)
        .collect();

    if questions.len() < total {
        warn!("丢弃了 {} 道不合格的题目", total - questions.len());
    }

    QuizResult { questions }
}

fn build_user_message(processed_text: &str, learner: &LearnerContext) -> String {
    format!(
        r#"Texte à analyser :
{}

Âge de l'élève : {}
Classe : {}

Génère une liste JSON de quiz au format suivant :
[
  {{
    "question": "Quel est le sujet principal du texte ?",
    "options": ["A", "B", "C", "D"],
    "answer": "A",
    "explanation": "Parce que le texte parle de cela."
  }},
  ...
]
Retourne uniquement du JSON sans texte autour."#,
        processed_text,
        learner.age(),
        learner.grade()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockProvider;
    use std::sync::Arc;

    const TEXT: &str = "La Loire est le plus long fleuve de France.";

    const QUIZ_JSON: &str = r#"[
        {
            "question": "Quel est le plus long fleuve de France ?",
            "options": ["La Seine", "La Loire", "Le Rhône"],
            "answer": "La Loire",
            "explanation": "Le texte le dit."
        },
        {
            "question": "Question sans bonne réponse",
            "options": ["A", "B", "C"],
            "answer": "D",
            "explanation": ""
        },
        {
            "question": "Trop peu d'options",
            "options": ["A", "B"],
            "answer": "A",
            "explanation": ""
        }
    ]"#;

    fn learner() -> LearnerContext {
        LearnerContext::new(10, "CM2").unwrap()
    }

    fn service_with(provider: MockProvider) -> QuizService {
        QuizService::new(LlmService::with_provider(Arc::new(provider), "test-model"))
    }

    #[tokio::test]
    async fn test_valid_questions_are_kept() {
        let service = service_with(MockProvider::replying(QUIZ_JSON));

        let quiz = service.generate(TEXT, &learner()).await;
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].answer, "La Loire");
    }

    #[tokio::test]
    async fn test_fenced_questions_object() {
        let raw = format!("```json\n{{\"questions\": {}}}\n```", QUIZ_JSON);
        let service = service_with(MockProvider::replying(raw));

        let quiz = service.generate(TEXT, &learner()).await;
        assert_eq!(quiz.questions.len(), 1);
    }

    #[tokio::test]
    async fn test_parse_failure_yields_empty_quiz() {
        let service = service_with(MockProvider::replying(
            "Voici un quiz : Quel est le plus long fleuve ? La Loire.",
        ));
        let quiz = service.generate(TEXT, &learner()).await;
        assert!(quiz.is_empty());
    }

    #[tokio::test]
    async fn test_failure_and_disabled_yield_empty_quiz() {
        let failing = service_with(MockProvider::failing());
        assert!(failing.generate(TEXT, &learner()).await.is_empty());

        let disabled = QuizService::new(LlmService::disabled());
        assert!(disabled.generate(TEXT, &learner()).await.is_empty());
    }

    #[tokio::test]
    async fn test_single_question_in_prose() {
        let raw = "Voici le quiz [niveau CM2] : [{\"question\": \"Quel fleuve ?\", \"options\": [\"La Seine\", \"La Loire\", \"Le Rhône\"], \"answer\": \"La Loire\"}]";
        let service = service_with(MockProvider::replying(raw));

        let quiz = service.generate(TEXT, &learner()).await;
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].answer, "La Loire");
        assert!(quiz.questions[0].explanation.is_empty());
    }

    #[test]
    fn test_object_without_questions_is_empty() {
        assert!(parse_quiz(r#"{"error": "oops"}"#).is_empty());
    }
}
