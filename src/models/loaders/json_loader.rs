use crate::error::CorpusError;
use crate::models::question::QuestionRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读取题库文件并解析为题目列表
///
/// 顶层必须是数组，否则返回 `InvalidJson`。
pub async fn load_corpus_file(path: &Path) -> Result<Vec<QuestionRecord>, CorpusError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| CorpusError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| CorpusError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// 把整个题库写回原路径
///
/// 先写同目录下的临时文件再重命名，中途中断不会留下半个文件。
pub async fn save_corpus_file(path: &Path, records: &[QuestionRecord]) -> Result<(), CorpusError> {
    let write_failed = |source: std::io::Error| CorpusError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let content = to_pretty_json(records).map_err(|e| write_failed(std::io::Error::other(e)))?;

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, content).await.map_err(write_failed)?;
    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(write_failed(e));
    }

    Ok(())
}

/// 2 空格缩进，非 ASCII 字符不转义
fn to_pretty_json(records: &[QuestionRecord]) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    buf.push(b'\n');
    // serde_json 只输出合法 UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
