use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// 学生档案（注册信息中与内容生成相关的部分）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerProfile {
    #[serde(default)]
    pub name: Option<String>,
    pub age: u32,
    /// 年级 / 班级，自由文本（如 "CM2"、"6ème"）
    pub grade: String,
}

impl LearnerProfile {
    /// 转换为内容生成上下文
    pub fn context(&self) -> Result<LearnerContext, ValidationError> {
        LearnerContext::new(self.age, self.grade.clone())
    }
}

/// 学生上下文
///
/// 只读输入，贯穿每一次内容生成调用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerContext {
    age: u32,
    grade: String,
}

impl LearnerContext {
    pub fn new(age: u32, grade: impl Into<String>) -> Result<Self, ValidationError> {
        if age == 0 {
            return Err(ValidationError::InvalidAge { age });
        }
        Ok(Self {
            age,
            grade: grade.into(),
        })
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn grade(&self) -> &str {
        &self.grade
    }
}

impl Display for LearnerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} ans | classe {}]", self.age, self.grade)
    }
}
