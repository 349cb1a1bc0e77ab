//! `megui context ...` and `megui use context`.

use std::path::Path;

use anyhow::Result;

use megui_core::API_URL_ENV;

use crate::config::{ConfigFile, Context};

pub fn create(name: &str, server: Option<&str>, path: &Path) -> Result<()> {
    let mut file = ConfigFile::read(path)?;
    file.insert(Context::new(name, server)?)?;
    file.write(path)?;

    match server {
        Some(url) => println!("Context \"{}\" -> {}", name, url),
        None => println!("Context \"{}\" -> ${}", name, API_URL_ENV),
    }
    Ok(())
}

pub fn list(path: &Path) -> Result<()> {
    let file = ConfigFile::read(path)?;
    if file.contexts.is_empty() {
        println!("No contexts yet: megui context create <name> --server <url>");
        return Ok(());
    }

    println!("  {:20} {:40} {}", "NAME", "SERVER", "SESSION");
    for ctx in &file.contexts {
        let active = file.current.as_deref() == Some(ctx.name.as_str());
        let server = ctx.server.clone().unwrap_or_else(|| format!("${}", API_URL_ENV));
        let session = match &ctx.session {
            None => "-".to_string(),
            Some(s) if s.user.is_empty() => "(token)".to_string(),
            Some(s) => s.user.clone(),
        };
        println!("{} {:20} {:40} {}", if active { "*" } else { " " }, ctx.name, server, session);
    }
    Ok(())
}

pub fn use_context(name: &str, path: &Path) -> Result<()> {
    let mut file = ConfigFile::read(path)?;
    file.switch(name)?;
    file.write(path)?;
    println!("Now using \"{}\".", name);
    Ok(())
}

/// Change the server of an existing context. Its session is kept.
pub fn set(name: &str, server: Option<&str>, path: &Path) -> Result<()> {
    let mut file = ConfigFile::read(path)?;
    let ctx = file.find_mut(name)?;
    if server.is_some() {
        ctx.server = Context::new(name, server)?.server;
    }
    file.write(path)?;
    println!("Context \"{}\" saved.", name);
    Ok(())
}

pub fn delete(name: &str, path: &Path) -> Result<()> {
    let mut file = ConfigFile::read(path)?;
    file.remove(name)?;
    file.write(path)?;
    println!("Context \"{}\" removed.", name);
    Ok(())
}
