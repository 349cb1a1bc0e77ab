//! `megui session set` and `megui logout`.
//!
//! There is no login flow here: the token comes from the ERP's auth
//! layer and is stored as-is, with the user flags that gate deletes.

use std::path::Path;

use anyhow::{Result, bail};

use crate::config::{ConfigFile, StoredSession};

pub fn set(token: &str, user: Option<&str>, super_user: bool, admin: bool, path: &Path) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        bail!("Token cannot be empty.");
    }

    let mut file = ConfigFile::read(path)?;
    let ctx = file.active_mut()?;
    ctx.session = Some(StoredSession {
        token: token.to_string(),
        user: user.unwrap_or_default().to_string(),
        super_user,
        admin,
    });
    let name = ctx.name.clone();
    file.write(path)?;

    println!("Session stored in \"{}\".", name);
    Ok(())
}

pub fn logout(path: &Path) -> Result<()> {
    let mut file = ConfigFile::read(path)?;
    let ctx = file.active_mut()?;
    let name = ctx.name.clone();
    if ctx.session.take().is_none() {
        println!("\"{}\" had no session.", name);
        return Ok(());
    }
    file.write(path)?;
    println!("Logged out of \"{}\".", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use megui_core::SessionSource;

    #[test]
    fn set_then_logout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(set("t", None, false, false, &path).is_err(), "no context yet");

        crate::commands::context::create("dev", Some("http://localhost:3000"), &path).unwrap();
        assert!(set("  ", None, false, false, &path).is_err());
        set("jwt-1", Some("ana"), false, true, &path).unwrap();

        let file = ConfigFile::read(&path).unwrap();
        let usuario = file.active().unwrap().session().usuario().unwrap();
        assert_eq!(usuario.username, "ana");
        assert!(usuario.es_admin);
        assert!(!usuario.es_super_usuario);

        logout(&path).unwrap();
        logout(&path).unwrap();
        let file = ConfigFile::read(&path).unwrap();
        assert!(file.active().unwrap().session().token().is_none());
    }
}
