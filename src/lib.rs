pub mod note;
pub mod session;
pub mod tmdb;

use std::path::Path;
use std::sync::{Mutex, RwLock};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Emitter, Manager, State};

use crate::note::{NoteDocument, NoteError};
use crate::session::SearchSession;
use crate::tmdb::{MediaType, SearchError, SearchResult};

// ── Settings ───────────────────────────────────────────────────────────────

/// App settings. Missing fields in the persisted file fall back to the
/// defaults field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// TMDB API key.
    pub api_key: String,
    /// Locale tag sent as the `language` query parameter.
    pub language: String,
    /// Absolute path of the markdown vault. Empty = not configured.
    pub vault_path: String,
    /// Vault-relative folder the notes go into. Empty = vault root.
    pub notes_folder: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: "pt-BR".to_string(),
            vault_path: String::new(),
            notes_folder: String::new(),
        }
    }
}

// App state
pub struct AppState {
    pub settings: RwLock<Settings>,
    pub session: Mutex<SearchSession>,
}

// Get settings file path
fn get_settings_path(app: &AppHandle) -> Result<std::path::PathBuf> {
    let app_data = app.path().app_data_dir()?;
    std::fs::create_dir_all(&app_data)?;
    Ok(app_data.join("settings.json"))
}

// Load settings from disk; absence of the file is normal
fn load_settings(app: &AppHandle) -> Settings {
    let path = match get_settings_path(app) {
        Ok(p) => p,
        Err(_) => return Settings::default(),
    };

    if path.exists() {
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    } else {
        Settings::default()
    }
}

// Save settings to disk
fn save_settings(app: &AppHandle, settings: &Settings) -> Result<()> {
    let path = get_settings_path(app)?;
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

// Mirror a session phase change to the frontend
fn emit_phase(app: &AppHandle, session: &SearchSession) {
    let _ = app.emit("search-state", session.phase().clone());
}

// TAURI COMMANDS

#[tauri::command]
fn get_settings(state: State<AppState>) -> Settings {
    state.settings.read().expect("settings read lock").clone()
}

/// Overwrite the whole settings snapshot and persist it immediately.
/// The settings form calls this after every field edit.
#[tauri::command]
fn update_settings(
    app: AppHandle,
    new_settings: Settings,
    state: State<AppState>,
) -> Result<(), String> {
    {
        let mut settings = state.settings.write().expect("settings write lock");
        *settings = new_settings;
    }

    let settings = state.settings.read().expect("settings read lock");
    save_settings(&app, &settings).map_err(|e| e.to_string())?;

    Ok(())
}

/// One search request against TMDB. Empty queries are rejected before any
/// I/O; a completion superseded by a newer search is discarded.
#[tauri::command]
async fn search_media(
    app: AppHandle,
    query: String,
    media_type: MediaType,
    state: State<'_, AppState>,
) -> Result<Vec<SearchResult>, SearchError> {
    let query = query.trim().to_string();
    if query.is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    let settings = state.settings.read().expect("settings read lock").clone();

    let seq = {
        let mut session = state.session.lock().expect("search session mutex");
        let seq = session.begin_search();
        emit_phase(&app, &session);
        seq
    };

    let outcome = tmdb::search(&settings, &query, media_type).await;

    let mut session = state.session.lock().expect("search session mutex");
    if !session.is_current(seq) {
        tracing::debug!(seq, "discarding stale search completion");
        return Err(SearchError::Superseded);
    }

    match outcome {
        Ok(items) => {
            session.finish_search(seq, items.len());
            emit_phase(&app, &session);
            Ok(items)
        }
        Err(SearchError::NoResults) => {
            session.finish_search(seq, 0);
            emit_phase(&app, &session);
            Err(SearchError::NoResults)
        }
        Err(e) => {
            session.fail_search(seq);
            emit_phase(&app, &session);
            Err(e)
        }
    }
}

/// Materialize one selected result into a note and write it to the vault.
/// Returns the written path for the confirmation notice.
#[tauri::command]
async fn create_media_note(
    app: AppHandle,
    item: SearchResult,
    media_type: MediaType,
    state: State<'_, AppState>,
) -> Result<String, NoteError> {
    let settings = state.settings.read().expect("settings read lock").clone();
    if settings.vault_path.trim().is_empty() {
        return Err(NoteError::VaultNotSet);
    }

    // A write arriving outside ResultsShown/WriteError (e.g. after a reload)
    // is still performed; the session just does not track it.
    let seq = {
        let mut session = state.session.lock().expect("search session mutex");
        let seq = session.begin_write();
        if seq.is_some() {
            emit_phase(&app, &session);
        }
        seq
    };

    let doc = NoteDocument::from_result(&item, media_type);
    let outcome =
        note::write_note(Path::new(&settings.vault_path), &settings.notes_folder, &doc).await;

    let mut session = state.session.lock().expect("search session mutex");
    match outcome {
        Ok(path) => {
            tracing::info!(path = %path.display(), "note created");
            if let Some(seq) = seq {
                session.finish_write(seq);
                emit_phase(&app, &session);
            }
            Ok(path.to_string_lossy().into_owned())
        }
        Err(e) => {
            if let Some(seq) = seq {
                session.fail_write(seq);
                emit_phase(&app, &session);
            }
            Err(e)
        }
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt::init();

    tauri::Builder::default()
        .setup(|app| {
            let settings = load_settings(app.handle());
            app.manage(AppState {
                settings: RwLock::new(settings),
                session: Mutex::new(SearchSession::default()),
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_settings,
            update_settings,
            search_media,
            create_media_note,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
