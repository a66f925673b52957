use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTimeErrorKind {
    Input,
    Unit,
    Solution,
}

impl RankTimeErrorKind {
    pub(crate) fn from_code(code: &'static str) -> Self {
        match code {
            // Input
            "E1001" | "E1002" => Self::Input,

            // Unit
            "E2001" | "E2002" | "E2003" => Self::Unit,

            // Solution
            "E3001" | "E3002" => Self::Solution,

            _ => Self::Input,
        }
    }
}

#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct RankTimeError {
    pub code: &'static str,
    pub kind: RankTimeErrorKind,
    pub message: String,

    pub user_id: Option<String>,
    pub problem_index: Option<usize>,
    pub context: Option<String>,
}

impl RankTimeError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: RankTimeErrorKind::from_code(code),
            message: message.into(),

            user_id: None,
            problem_index: None,
            context: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_problem(mut self, problem_index: usize) -> Self {
        self.problem_index = Some(problem_index);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
