use std::path::{Path, PathBuf};
use std::fs;
use std::io;
use std::sync::Arc;
use std::env;
use tokio::sync::Mutex;
use sha2::{Sha256, Digest};

use crate::models::{BuiltinModel, ModelInfo};

/// Environment variable overriding the cache root
pub const CACHE_ENV_VAR: &str = "SILENTAID_CACHE";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("Download of {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Model verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// The three files that make up a downloaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelFile {
    Model,
    Tokenizer,
    Config,
}

impl ModelFile {
    const ALL: [ModelFile; 3] = [ModelFile::Model, ModelFile::Tokenizer, ModelFile::Config];

    fn file_name(self) -> &'static str {
        match self {
            ModelFile::Model => "model.onnx",
            ModelFile::Tokenizer => "tokenizer.json",
            ModelFile::Config => "config.json",
        }
    }

    fn kind(self) -> &'static str {
        match self {
            ModelFile::Model => "model",
            ModelFile::Tokenizer => "tokenizer",
            ModelFile::Config => "config",
        }
    }

    fn url(self, info: &ModelInfo) -> &str {
        match self {
            ModelFile::Model => &info.model_url,
            ModelFile::Tokenizer => &info.tokenizer_url,
            ModelFile::Config => &info.config_url,
        }
    }

    fn hash(self, info: &ModelInfo) -> Option<&str> {
        match self {
            ModelFile::Model => info.model_hash.as_deref(),
            ModelFile::Tokenizer => info.tokenizer_hash.as_deref(),
            ModelFile::Config => info.config_hash.as_deref(),
        }
    }
}

/// Downloads built-in models into a local cache and verifies them.
#[derive(Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        if let Ok(path) = env::var(CACHE_ENV_VAR) {
            return PathBuf::from(path).join("models");
        }

        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("silentaid").join("models");
        }

        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("silentaid").join("models");
        }

        env::temp_dir().join("silentaid").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Directory holding all files of `model`
    pub fn get_model_dir(&self, model: BuiltinModel) -> PathBuf {
        self.models_dir.join(model.get_model_info().name)
    }

    pub fn get_model_path(&self, model: BuiltinModel) -> PathBuf {
        self.file_path(model, ModelFile::Model)
    }

    pub fn get_tokenizer_path(&self, model: BuiltinModel) -> PathBuf {
        self.file_path(model, ModelFile::Tokenizer)
    }

    pub fn get_config_path(&self, model: BuiltinModel) -> PathBuf {
        self.file_path(model, ModelFile::Config)
    }

    fn file_path(&self, model: BuiltinModel, file: ModelFile) -> PathBuf {
        self.get_model_dir(model).join(file.file_name())
    }

    pub fn is_model_downloaded(&self, model: BuiltinModel) -> bool {
        ModelFile::ALL.iter().all(|&file| {
            let path = self.file_path(model, file);
            let exists = path.exists();
            log::debug!("  {} path: {:?} (exists: {})", file.kind(), path, exists);
            exists
        })
    }

    /// Downloads every missing or corrupt file of `model`.
    ///
    /// On failure all files of the model are removed so a half-downloaded
    /// model is never picked up by the loader.
    pub async fn download_model(&self, model: BuiltinModel) -> Result<(), ModelError> {
        let info = model.get_model_info();
        let _lock = self.download_lock.lock().await;

        let model_dir = self.get_model_dir(model);
        log::info!("Preparing model directory at {:?}", model_dir);
        fs::create_dir_all(&model_dir)?;

        for file in ModelFile::ALL {
            let path = self.file_path(model, file);
            let result = if path.exists() && self.verify_file(&path, file.hash(&info))? {
                log::info!("Existing {} file verified at {:?}", file.kind(), path);
                Ok(())
            } else {
                self.download_and_verify_file(file.url(&info), &path, file.hash(&info), file.kind()).await
            };

            if let Err(e) = result {
                log::error!("Failed to set up {} file: {}", file.kind(), e);
                let _ = self.remove_download(model);
                return Err(e);
            }
        }

        log::info!("Model {} ready to use", info.name);
        Ok(())
    }

    fn verify_file(&self, path: &Path, expected_hash: Option<&str>) -> Result<bool, ModelError> {
        let Some(expected_hash) = expected_hash else {
            return Ok(path.exists());
        };
        let bytes = fs::read(path)?;
        let hash = sha256_hex(&bytes);
        log::debug!("Verifying {:?}: calculated {}, expected {}", path, hash, expected_hash);
        Ok(hash == expected_hash)
    }

    pub fn verify_model(&self, model: BuiltinModel) -> Result<bool, ModelError> {
        let info = model.get_model_info();
        for file in ModelFile::ALL {
            let path = self.file_path(model, file);
            if !path.exists() {
                log::info!("{} file missing at {:?}", file.kind(), path);
                return Ok(false);
            }
            if !self.verify_file(&path, file.hash(&info))? {
                log::warn!("{} file failed hash verification", file.kind());
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: Option<&str>,
        file_type: &str,
    ) -> Result<(), ModelError> {
        log::info!("Downloading {} file from {} to {:?}", file_type, url, path);
        let response = reqwest::get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected_hash) = expected_hash {
            let hash = sha256_hex(&bytes);
            if hash != expected_hash {
                log::error!("{} hash mismatch: expected {}, got {}", file_type, expected_hash, hash);
                return Err(ModelError::HashMismatch {
                    file_type: file_type.to_string(),
                    expected: expected_hash.to_string(),
                    actual: hash,
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;

        if !self.verify_file(path, expected_hash)? {
            return Err(ModelError::VerificationFailed);
        }

        log::info!("{} file downloaded and verified successfully", file_type);
        Ok(())
    }

    pub fn remove_download(&self, model: BuiltinModel) -> Result<(), ModelError> {
        for file in ModelFile::ALL {
            let path = self.file_path(model, file);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Ensures that a model is downloaded and verified.
    /// If the model doesn't exist, it will be downloaded.
    /// If verification fails, it will be re-downloaded.
    pub async fn ensure_model_downloaded(&self, model: BuiltinModel) -> Result<(), ModelError> {
        if !self.is_model_downloaded(model) {
            log::info!("Model {:?} not found, downloading...", model);
            self.download_model(model).await?;
        } else if !self.verify_model(model)? {
            log::info!("Model {:?} verification failed, re-downloading...", model);
            self.remove_download(model)?;
            self.download_model(model).await?;
        } else {
            log::info!("Model {:?} verification successful", model);
        }
        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
