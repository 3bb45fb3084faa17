// src/images.rs
//
// Armazenamento de imagens: colaborador externo com a interface
// upload(bytes, pasta) -> {url, public_id} / delete(public_id).
// A implementação de disco serve os ficheiros via /uploads.
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StoredImage {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, folder: &str) -> AppResult<StoredImage>;
    async fn delete(&self, public_id: &str) -> AppResult<()>;
}

pub struct DiskImageStore {
    root: PathBuf,
}

impl DiskImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskImageStore { root: root.into() }
    }

    fn path_for(&self, public_id: &str) -> AppResult<PathBuf> {
        // public_id é sempre "pasta/uuid" gerado por nós; recusa qualquer
        // coisa que tente sair da raiz de uploads
        if public_id.contains("..") || public_id.starts_with('/') {
            return Err(AppError::Dependency(format!(
                "Invalid image id: {public_id}"
            )));
        }
        Ok(self.root.join(public_id))
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn upload(&self, bytes: Vec<u8>, folder: &str) -> AppResult<StoredImage> {
        let public_id = format!("{}/{}.img", folder, Uuid::new_v4());
        let path = self.path_for(&public_id)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                tracing::error!("Falha ao criar diretório de uploads: {:?}", e);
                AppError::Dependency("Failed to upload image".to_string())
            })?;
        }

        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            tracing::error!("Falha ao gravar imagem em {:?}: {:?}", path, e);
            AppError::Dependency("Failed to upload image".to_string())
        })?;

        tracing::debug!("Imagem gravada: {} ({} bytes)", public_id, bytes.len());
        Ok(StoredImage {
            url: format!("/uploads/{public_id}"),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> AppResult<()> {
        let path = self.path_for(public_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Já não existir não é um erro para quem chama
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                tracing::error!("Falha ao apagar imagem {}: {:?}", public_id, e);
                Err(AppError::Dependency("Failed to delete image".to_string()))
            }
        }
    }
}
