use crate::message::AnswerValue;
use crate::{BlockId, LessonId, PageIndex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum BlockKind {
    Text,
    Video,
    Audio,
    FillInGap,
    MultipleChoice,
}

impl BlockKind {
    /// Whether the server can grade an answer for this kind of block.
    pub fn is_gradable(&self) -> bool {
        match self {
            BlockKind::FillInGap | BlockKind::MultipleChoice => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub prompt: String,
    /// Media source URL for Video/Audio blocks.
    pub source: Option<String>,
    pub choices: Vec<String>,
    /// Expected answer for gradable blocks.
    pub answer_key: Option<AnswerValue>,
}

impl Block {
    pub fn new(kind: BlockKind, prompt: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            kind,
            prompt,
            source: None,
            choices: Vec::new(),
            answer_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LessonPage {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub pages: Vec<LessonPage>,
}

impl Lesson {
    pub fn new(title: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            title,
            pages: Vec::new(),
        }
    }

    pub fn total_pages(&self) -> PageIndex {
        self.pages.len() as PageIndex
    }

    pub fn find_block(&self, block_id: &BlockId) -> Option<&Block> {
        self.pages
            .iter()
            .flat_map(|page| page.blocks.iter())
            .find(|block| &block.id == block_id)
    }

    pub fn contains_block(&self, block_id: &BlockId) -> bool {
        self.find_block(block_id).is_some()
    }

    pub fn contains_page(&self, page: PageIndex) -> bool {
        page < self.total_pages()
    }

    /// Client-facing copy. Answer keys never leave the server.
    pub fn without_answer_keys(&self) -> Lesson {
        let mut lesson = self.clone();
        for page in &mut lesson.pages {
            for block in &mut page.blocks {
                block.answer_key = None;
            }
        }
        lesson
    }
}
