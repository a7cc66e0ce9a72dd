use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// 一個待寫出的產出檔
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub path: String,
    pub data: Vec<u8>,
}

impl Artifact {
    pub fn new(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }

    /// 壓縮檔內只保留檔名
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// 將多個產出檔打包成 ZIP
pub fn bundle(artifacts: &[Artifact]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for artifact in artifacts {
        zip.start_file::<_, ()>(artifact.file_name(), FileOptions::default())?;
        zip.write_all(&artifact.data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
