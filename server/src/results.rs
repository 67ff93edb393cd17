use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use system::serde_json;
use system::{AnswerValue, Block, BlockId, BlockKind, GradingDetails, LessonId};
use tokio::fs;

/// One graded (or ungraded) submission for a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockResult {
    pub block_id: BlockId,
    pub answer: AnswerValue,
    pub is_correct: Option<bool>,
    pub details: Option<GradingDetails>,
}

/// Grades an answer against the block's answer key. Kinds without server
/// grading produce `is_correct: None` and the submission is stored as-is.
pub fn grade(block: &Block, answer: AnswerValue) -> BlockResult {
    let is_correct = match (&block.kind, &block.answer_key) {
        (BlockKind::FillInGap, Some(key)) => Some(answer_matches(key, &answer)),
        (BlockKind::MultipleChoice, Some(key)) => Some(key == &answer),
        _ => None,
    };
    let details = is_correct.map(|is_correct| GradingDetails {
        is_correct: Some(is_correct),
        // The right answer is revealed only once the check failed.
        expected: if is_correct {
            None
        } else {
            block.answer_key.clone()
        },
    });
    BlockResult {
        block_id: block.id,
        answer,
        is_correct,
        details,
    }
}

fn answer_matches(key: &AnswerValue, answer: &AnswerValue) -> bool {
    match (key.as_text(), answer.as_text()) {
        (Some(key), Some(answer)) => key.trim().eq_ignore_ascii_case(answer.trim()),
        _ => key == answer,
    }
}

pub async fn read_results_file(lesson_id: &LessonId) -> HashMap<BlockId, BlockResult> {
    let file_name = create_file_name(lesson_id);
    if let Ok(content) = fs::read(file_name).await {
        serde_json::from_slice(&content).unwrap_or_else(|err| {
            log::error!("corrupt results file {}: {}", lesson_id, err);
            HashMap::new()
        })
    } else {
        HashMap::new()
    }
}

/// One student submits per lesson, so writes to a lesson's results file
/// never race each other.
pub async fn record_result(lesson_id: &LessonId, result: BlockResult) -> Result<(), ()> {
    let mut results = read_results_file(lesson_id).await;
    results.insert(result.block_id, result);
    let file_name = create_file_name(lesson_id);
    let content = serde_json::to_vec(&results).expect("must succeed");
    fs::write(file_name, content).await.map_err(|err| {
        log::error!("failed to write results file {}: {}", lesson_id, err);
    })
}

fn create_file_name(lesson_id: &LessonId) -> String {
    format!("{}.results", lesson_id.to_string())
}
