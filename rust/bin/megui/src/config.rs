//! The CLI's own settings: named backends ("contexts") and the session
//! stored for each, kept in `~/.megui/config.toml`.
//!
//! ```toml
//! current-context = "produccion"
//!
//! [[contexts]]
//! name = "produccion"
//! server = "https://erp.example/api"
//!
//! [contexts.session]
//! token = "..."
//! user = "ana"
//! admin = true
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use megui_core::{ApiConfig, StaticSession, Usuario};

/// Overrides the config file location (same as `--config`).
pub const CONFIG_ENV: &str = "MEGUI_CONFIG";

/// Token and user flags issued by the ERP's auth layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(default, rename = "super-user")]
    pub super_user: bool,
    #[serde(default)]
    pub admin: bool,
}

/// One ERP backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    /// Base URL. `None` falls back to `VITE_API_URL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<StoredSession>,
}

impl Context {
    pub fn new(name: &str, server: Option<&str>) -> Result<Self> {
        if let Some(url) = server {
            ApiConfig::new(url)?;
        }
        Ok(Self {
            name: name.to_string(),
            server: server.map(str::to_string),
            session: None,
        })
    }

    pub fn api_config(&self) -> Result<ApiConfig> {
        let config = match &self.server {
            Some(url) => ApiConfig::new(url)?,
            None => ApiConfig::from_env()?,
        };
        Ok(config)
    }

    /// The session the engine sees. No stored session means anonymous.
    pub fn session(&self) -> StaticSession {
        match &self.session {
            Some(s) => StaticSession::new(
                s.token.clone(),
                Usuario {
                    id: None,
                    username: s.user.clone(),
                    es_super_usuario: s.super_user,
                    es_admin: s.admin,
                },
            ),
            None => StaticSession::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "current-context", default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl ConfigFile {
    /// `--config` / `MEGUI_CONFIG` when given, `~/.megui/config.toml`
    /// otherwise.
    pub fn locate(explicit: Option<&str>) -> PathBuf {
        if let Some(path) = explicit {
            return PathBuf::from(path);
        }
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_default();
        home.join(".megui").join("config.toml")
    }

    /// A missing file is an empty config.
    pub fn read(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).with_context(|| format!("parsing {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }

    pub fn find(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Result<&mut Context> {
        self.contexts
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| anyhow!("Context \"{}\" not found. See `megui context list`.", name))
    }

    pub fn active(&self) -> Result<&Context> {
        self.current
            .as_deref()
            .and_then(|name| self.find(name))
            .ok_or_else(|| anyhow!("No current context. Run `megui use context <name>`."))
    }

    pub fn active_mut(&mut self) -> Result<&mut Context> {
        let name = self.active()?.name.clone();
        self.find_mut(&name)
    }

    /// Add a new context. The first one becomes current.
    pub fn insert(&mut self, ctx: Context) -> Result<()> {
        if self.find(&ctx.name).is_some() {
            bail!("Context \"{}\" already exists. Use `megui context set`.", ctx.name);
        }
        if self.current.is_none() {
            self.current = Some(ctx.name.clone());
        }
        self.contexts.push(ctx);
        Ok(())
    }

    pub fn switch(&mut self, name: &str) -> Result<()> {
        self.find_mut(name)?;
        self.current = Some(name.to_string());
        Ok(())
    }

    /// Drop a context; dropping the current one leaves none selected.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.find_mut(name)?;
        self.contexts.retain(|c| c.name != name);
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megui_core::{SessionSource, can_delete};

    fn local(name: &str) -> Context {
        Context::new(name, Some("http://localhost:3000/api")).unwrap()
    }

    #[test]
    fn absent_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = ConfigFile::read(&dir.path().join("absent.toml")).unwrap();
        assert!(file.current.is_none());
        assert!(file.contexts.is_empty());
        assert!(file.active().is_err());
    }

    #[test]
    fn written_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("config.toml");

        let mut file = ConfigFile::default();
        let mut ctx = local("produccion");
        ctx.session = Some(StoredSession {
            token: "jwt".into(),
            user: "ana".into(),
            admin: true,
            ..Default::default()
        });
        file.insert(ctx.clone()).unwrap();
        file.write(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("current-context = \"produccion\""));
        assert!(text.contains("[contexts.session]"));
        assert_eq!(ConfigFile::read(&path).unwrap().active().unwrap(), &ctx);
    }

    #[test]
    fn garbage_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "current-context = [").unwrap();
        let err = ConfigFile::read(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn insert_switch_remove() {
        let mut file = ConfigFile::default();
        file.insert(local("dev")).unwrap();
        file.insert(local("qa")).unwrap();
        assert!(file.insert(local("dev")).is_err());
        assert_eq!(file.active().unwrap().name, "dev");

        file.switch("qa").unwrap();
        assert!(file.switch("nope").is_err());
        file.remove("qa").unwrap();
        assert!(file.current.is_none());
        assert!(file.remove("qa").is_err());
        assert_eq!(file.contexts.len(), 1);
    }

    #[test]
    fn bad_server_url_is_rejected() {
        assert!(Context::new("x", Some("localhost:3000")).is_err());
        assert!(Context::new("x", None).unwrap().server.is_none());
    }

    #[test]
    fn stored_session_drives_delete_permission() {
        let mut ctx = local("dev");
        assert!(ctx.session().token().is_none());
        assert!(!can_delete(ctx.session().usuario().as_ref()));

        ctx.session = Some(StoredSession {
            token: "t".into(),
            super_user: true,
            ..Default::default()
        });
        let s = ctx.session();
        assert_eq!(s.token().as_deref(), Some("t"));
        assert!(can_delete(s.usuario().as_ref()));
    }

    #[test]
    fn own_server_beats_environment() {
        assert_eq!(local("dev").api_config().unwrap().base_url, "http://localhost:3000/api");
    }
}
