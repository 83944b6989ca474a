//! Writer: conversation turns → JSON-lines file.
//!
//! Each line is the compact serde_json encoding of one
//! [`ConversationTurn`]: `role` then `content`, no spaces, non-ASCII left as
//! is, one `\n` after every record. The file is replaced atomically (temp
//! file + rename), so rerunning a document overwrites rather than appends and
//! an interrupted write never leaves a half-written file behind.

use crate::error::DatagenError;
use crate::types::ConversationTurn;
use std::path::Path;

/// Render turns as JSON lines.
pub fn render_records(turns: &[ConversationTurn]) -> Result<String, DatagenError> {
    let mut out = String::new();
    for turn in turns {
        let line = serde_json::to_string(turn)
            .map_err(|e| DatagenError::Internal(format!("serialise record: {e}")))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Write turns to `path`, replacing any existing file.
pub async fn write_records(turns: &[ConversationTurn], path: &Path) -> Result<(), DatagenError> {
    let body = render_records(turns)?;
    let write_err = |source| DatagenError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, body.as_bytes())
        .await
        .map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_compact_and_unescaped() {
        let turns = vec![
            ConversationTurn::user("什么是 Rust？"),
            ConversationTurn::assistant("A \"systems\" language.\nFast."),
        ];
        let out = render_records(&turns).unwrap();
        assert_eq!(
            out,
            "{\"role\":\"user\",\"content\":\"什么是 Rust？\"}\n\
             {\"role\":\"assistant\",\"content\":\"A \\\"systems\\\" language.\\nFast.\"}\n"
        );
    }

    #[tokio::test]
    async fn rewrite_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");

        let many: Vec<_> = (0..10)
            .map(|i| ConversationTurn::user(format!("question {i}")))
            .collect();
        write_records(&many, &path).await.unwrap();

        let few = vec![ConversationTurn::user("Q"), ConversationTurn::assistant("A")];
        write_records(&few, &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!dir.path().join("doc.txt.tmp").exists());
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory where the file should go makes the rename fail.
        let path = dir.path().join("doc.txt");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), b"x").unwrap();

        let err = write_records(&[ConversationTurn::user("Q")], &path)
            .await
            .unwrap_err();
        assert!(matches!(err, DatagenError::OutputWriteFailed { .. }));
        assert!(!dir.path().join("doc.txt.tmp").exists());
    }

    #[tokio::test]
    async fn creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/doc.txt");
        write_records(&[ConversationTurn::user("Q")], &path)
            .await
            .unwrap();
        assert!(path.exists());
    }
}
