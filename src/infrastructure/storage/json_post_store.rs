use crate::application::ports::post_store::PostStore;
use crate::domain::entities::Post;
use crate::shared::{AppError, ExclusiveSection};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// 投稿コレクションを1つの JSON ドキュメントとして保存するストア
pub struct JsonFilePostStore {
    path: PathBuf,
    writes: ExclusiveSection,
}

impl JsonFilePostStore {
    /// ストアを開く。ファイルが無ければ空のコレクションで初期化する
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|err| {
                AppError::Storage(format!("Failed to create data dir {}: {err}", parent.display()))
            })?;
        }

        let store = Self {
            path,
            writes: ExclusiveSection::new(),
        };
        store.initialize().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn initialize(&self) -> Result<(), AppError> {
        let path = self.path.clone();
        self.writes
            .run(async move {
                if fs::try_exists(&path).await.map_err(|err| {
                    AppError::Storage(format!("Failed to stat {}: {err}", path.display()))
                })? {
                    return Ok(());
                }
                debug!(path = %path.display(), "initializing empty post store");
                persist(&path, &[]).await
            })
            .await?
    }
}

async fn persist(path: &Path, posts: &[Post]) -> Result<(), AppError> {
    let json = serde_json::to_vec_pretty(posts).map_err(|err| {
        AppError::SerializationError(format!("Failed to serialize posts: {err}"))
    })?;

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, json)
        .await
        .map_err(|err| AppError::Storage(format!("Failed to write {}: {err}", tmp_path.display())))?;
    fs::rename(&tmp_path, path)
        .await
        .map_err(|err| AppError::Storage(format!("Failed to replace {}: {err}", path.display())))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[async_trait]
impl PostStore for JsonFilePostStore {
    async fn read_all(&self) -> Result<Vec<Post>, AppError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {err}",
                    self.path.display()
                )));
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|err| {
            AppError::CorruptData(format!("Failed to parse {}: {err}", self.path.display()))
        })
    }

    async fn write_all(&self, posts: Vec<Post>) -> Result<(), AppError> {
        let path = self.path.clone();
        self.writes
            .run(async move { persist(&path, &posts).await })
            .await?
    }
}
