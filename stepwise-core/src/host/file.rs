//! File-backed state store
//!
//! One JSON document per question (`questions/<id>.json`) and per student
//! (`students/<question id>/<student id>.json`) under a root directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use super::{StateKey, StateStore};
use crate::error::StoreError;
use crate::question::QuestionRecord;
use crate::state::StudentState;

const QUESTIONS_DIR: &str = "questions";
const STUDENTS_DIR: &str = "students";

/// [`StateStore`] persisting JSON documents on disk
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn question_path(&self, question_id: &str) -> PathBuf {
        self.root
            .join(QUESTIONS_DIR)
            .join(format!("{}.json", file_stem(question_id)))
    }

    fn student_path(&self, key: &StateKey) -> PathBuf {
        self.root
            .join(STUDENTS_DIR)
            .join(file_stem(&key.question_id))
            .join(format!("{}.json", file_stem(&key.student_id)))
    }
}

/// Escape an id into a safe file name: ASCII alphanumerics, `-` and `_` pass
/// through, every other byte becomes `~xx`.
fn file_stem(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("~{:02x}", byte));
        }
    }
    out
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(Some(serde_json::from_str(&content)?))
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl StateStore for FileStore {
    async fn load_question(&self, question_id: &str) -> Result<Option<QuestionRecord>, StoreError> {
        read_json(&self.question_path(question_id)).await
    }

    async fn save_question(&self, record: &QuestionRecord) -> Result<(), StoreError> {
        write_json(&self.question_path(&record.question_id), record).await
    }

    async fn load_student(&self, key: &StateKey) -> Result<Option<StudentState>, StoreError> {
        read_json(&self.student_path(key)).await
    }

    async fn save_student(&self, key: &StateKey, state: &StudentState) -> Result<(), StoreError> {
        write_json(&self.student_path(key), state).await
    }
}
