use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::tmdb::{MediaType, SearchResult};

/// Body text used when a result has no overview.
pub const NO_OVERVIEW: &str = "Nenhuma descrição disponível.";

/// Fallback label for genre ids missing from the catalog.
pub const UNKNOWN_GENRE: &str = "Desconhecido";

// ── Genre catalog ──────────────────────────────────────────────────────────

/// TMDB movie genre ids mapped to their pt-BR display names.
pub fn genre_name(id: i64) -> Option<&'static str> {
    match id {
        28 => Some("Ação"),
        12 => Some("Aventura"),
        16 => Some("Animação"),
        35 => Some("Comédia"),
        80 => Some("Crime"),
        99 => Some("Documentário"),
        18 => Some("Drama"),
        10751 => Some("Família"),
        14 => Some("Fantasia"),
        36 => Some("História"),
        27 => Some("Terror"),
        10402 => Some("Música"),
        9648 => Some("Mistério"),
        10749 => Some("Romance"),
        878 => Some("Ficção Científica"),
        10770 => Some("Filme de TV"),
        53 => Some("Thriller"),
        10752 => Some("Guerra"),
        37 => Some("Ocidental"),
        _ => None,
    }
}

/// Catalog lookup with the fixed fallback for unmapped ids.
pub fn genre_label(id: i64) -> &'static str {
    genre_name(id).unwrap_or(UNKNOWN_GENRE)
}

// ── Filename ───────────────────────────────────────────────────────────────

/// Strip the characters that break vault paths: / : * ? " < > |
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect()
}

// ── Note document ──────────────────────────────────────────────────────────

/// YAML front matter consumed by the vault for indexing. Field order is the
/// serialization order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteFrontMatter {
    pub titulo: String,
    pub tipo: String,
    pub ano: String,
    #[serde(rename = "gênero")]
    pub genero: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "lançado", skip_serializing_if = "Option::is_none")]
    pub lancado: Option<String>,
    pub assistido: bool,
    pub tags: Vec<String>,
}

/// A complete note, derived from exactly one search result snapshot.
/// Never mutated after creation; written once or discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteDocument {
    pub file_name: String,
    pub front_matter: NoteFrontMatter,
    pub body: String,
}

impl NoteDocument {
    pub fn from_result(item: &SearchResult, media_type: MediaType) -> Self {
        let title = item.display_title();
        let year = item.display_year();
        let file_name = format!("{} ({}).md", sanitize_title(title), year);

        let front_matter = NoteFrontMatter {
            titulo: title.to_string(),
            tipo: media_type.label().to_string(),
            ano: year,
            genero: item
                .genre_ids
                .iter()
                .map(|&id| genre_label(id).to_string())
                .collect(),
            image: item.poster_url(),
            lancado: item.date().map(String::from),
            assistido: false,
            tags: vec![media_type.tag().to_string()],
        };

        let body = item
            .overview
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .unwrap_or(NO_OVERVIEW)
            .to_string();

        NoteDocument {
            file_name,
            front_matter,
            body,
        }
    }

    /// Full file content: front matter block followed by the summary body.
    pub fn render(&self) -> String {
        let yaml = serde_yaml::to_string(&self.front_matter)
            .unwrap_or_else(|_| String::from("{}\n"));
        format!("---\n{}---\n\n# Resumo\n{}\n", yaml, self.body)
    }
}

// ── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum NoteError {
    /// No vault folder configured yet.
    #[error("configure a pasta do vault nas configurações")]
    VaultNotSet,
    /// A note with the same file name already exists at the destination.
    #[error("a nota \"{0}\" já existe")]
    AlreadyExists(String),
    /// Destination folder missing or any other I/O failure.
    #[error("erro ao criar a nota; verifique se a pasta existe")]
    Write(String),
}

// ── Write ──────────────────────────────────────────────────────────────────

/// Resolve the destination path: vault/folder/file_name, with an empty
/// folder meaning the vault root.
pub fn destination_path(vault: &Path, folder: &str, file_name: &str) -> PathBuf {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        vault.join(file_name)
    } else {
        vault.join(folder).join(file_name)
    }
}

/// Write the note as a single create-if-absent operation. The destination
/// folder is not created; a missing folder is a write failure the user has
/// to resolve, same as a name collision.
pub async fn write_note(
    vault: &Path,
    folder: &str,
    doc: &NoteDocument,
) -> Result<PathBuf, NoteError> {
    let path = destination_path(vault, folder, &doc.file_name);

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "note create failed");
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                NoteError::AlreadyExists(doc.file_name.clone())
            } else {
                NoteError::Write(e.to_string())
            }
        })?;

    file.write_all(doc.render().as_bytes()).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "note write failed");
        NoteError::Write(e.to_string())
    })?;

    Ok(path)
}
