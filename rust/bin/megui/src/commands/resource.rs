//! Generic entity commands.
//!
//! `megui list cargos`, `megui create equipo --json '{...}'`, etc. Every
//! write goes through the same form engine and list page the UI uses, so
//! normalization, validation, uniqueness checks and the delete gate
//! behave identically.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use megui_catalog::Catalog;
use megui_client::{Backend, ResourceApi};
use megui_core::{ApiConfig, CrudError, Notifier, Record, SessionSource, coerce_id};
use megui_crud::{CategoryState, FormDialog, ListPage, PAGE_SIZES, SortDir};
use megui_schema::EntitySchema;

use crate::commands::output::{ConsoleNotifier, render_record, render_table};
use crate::config::{ConfigFile, Context};

/// Everything a command needs to talk to one entity.
struct Session {
    schema: Arc<EntitySchema>,
    backend: Backend,
    session: Arc<dyn SessionSource>,
    notifier: Arc<dyn Notifier>,
}

impl Session {
    fn open(resource: &str, path: &Path) -> Result<Self> {
        let config = ConfigFile::read(path)?;
        let ctx = config.active()?;
        let schema = Catalog::megui().resolve(resource)?;
        debug!(context = %ctx.name, entity = %schema.name, "session");
        Self::with_context(schema, ctx)
    }

    fn with_context(schema: Arc<EntitySchema>, ctx: &Context) -> Result<Self> {
        let session: Arc<dyn SessionSource> = Arc::new(ctx.session());
        let backend = Backend::new(ctx.api_config()?, session.clone());
        Ok(Self {
            schema,
            backend,
            session,
            notifier: Arc::new(ConsoleNotifier),
        })
    }

    fn api(&self) -> Arc<dyn ResourceApi> {
        Arc::new(self.backend.resource(self.schema.clone()))
    }

    fn page(&self) -> ListPage {
        ListPage::new(
            self.schema.clone(),
            self.api(),
            Arc::new(self.backend.clone()),
            self.session.clone(),
            self.notifier.clone(),
        )
    }
}

/// Options of `megui list`.
#[derive(Debug, Default)]
pub struct ListOptions {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub desc: bool,
    pub category: Option<String>,
    /// One-based.
    pub page: usize,
    pub page_size: usize,
}

/// ENTITIES: the catalog, without touching the network.
pub fn entities() {
    println!("{:32} {:32} {}", "NAME", "PATH", "ALIASES");
    for e in Catalog::megui().entities() {
        println!("{:32} {:32} {}", e.name, e.path, e.aliases.join(", "));
    }
}

/// LIST: load, filter, sort and page a collection.
pub async fn list(resource: &str, opts: &ListOptions, json: bool, path: &Path) -> Result<()> {
    let s = Session::open(resource, path)?;
    let mut page = s.page();
    page.load().await?;

    if let Some(f) = &opts.filter {
        page.table.set_filter(f);
    }
    if let Some(field) = &opts.sort {
        if s.schema.field_def(field).is_none() {
            anyhow::bail!("Unknown field \"{}\" for {}.", field, s.schema.name);
        }
        page.table.sort = Some((field.clone(), if opts.desc { SortDir::Desc } else { SortDir::Asc }));
    }
    if let Some(c) = &opts.category {
        page.table.category = category_state(&s.schema, c)?;
    }
    if opts.page_size != 0 {
        if !PAGE_SIZES.contains(&opts.page_size) {
            anyhow::bail!("Page size must be one of {:?}.", PAGE_SIZES);
        }
        page.table.set_page_size(opts.page_size);
    }
    page.table.set_page(opts.page.saturating_sub(1));

    let view = page.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view.rows)?);
    } else {
        println!("{}", render_table(page.schema(), page.references(), &view.rows));
        println!(
            "\n{} de {} registros, página {}/{}",
            view.rows.len(),
            view.total,
            view.page + 1,
            view.pages
        );
    }
    Ok(())
}

/// GET one record by id.
pub async fn get(resource: &str, id: &str, json: bool, path: &Path) -> Result<()> {
    let s = Session::open(resource, path)?;
    let id = parse_id(id)?;
    let record = s.api().get(id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        let mut page = s.page();
        page.load().await?;
        println!("{}", render_record(page.schema(), page.references(), &record));
    }
    Ok(())
}

/// CREATE through the form engine.
pub async fn create(resource: &str, body: &str, path: &Path) -> Result<()> {
    let s = Session::open(resource, path)?;
    let values = parse_body(body)?;
    let mut page = s.page();
    page.load().await?;

    fill(page.open_new(), &values)?;
    let saved = page.save().await?;
    println!("{}", serde_json::to_string_pretty(&saved)?);
    Ok(())
}

/// UPDATE through the form engine: the loaded row is edited with the
/// given fields, everything else keeps its current value.
pub async fn update(resource: &str, id: &str, body: &str, path: &Path) -> Result<()> {
    let s = Session::open(resource, path)?;
    let id = parse_id(id)?;
    let values = parse_body(body)?;
    let mut page = s.page();
    page.load().await?;

    fill(page.edit(id)?, &values)?;
    let saved = page.save().await?;
    println!("{}", serde_json::to_string_pretty(&saved)?);
    Ok(())
}

/// DELETE through the list page gate.
pub async fn delete(resource: &str, id: &str, yes: bool, path: &Path) -> Result<()> {
    let s = Session::open(resource, path)?;
    let id = parse_id(id)?;
    let mut page = s.page();
    page.load().await?;

    let confirm = |message: &str| yes || prompt_yes(message);
    if page.delete(id, &confirm).await? {
        println!("{} {} deleted.", s.schema.name, id);
    } else {
        println!("Cancelled.");
    }
    Ok(())
}

/// STATUS: current context, server and reachability.
pub async fn status(path: &Path) -> Result<()> {
    let config = ConfigFile::read(path)?;
    let ctx = config.active()?;

    println!("Context:   {}", ctx.name);
    let api = match ctx.api_config() {
        Ok(api) => api,
        Err(e) => {
            println!("Server:    -");
            println!("Status:    {}", e);
            return Ok(());
        }
    };
    println!("Server:    {}", api.base_url);
    let session = ctx.session();
    println!(
        "Session:   {}",
        match session.usuario() {
            Some(u) if !u.username.is_empty() => u.username,
            Some(_) => "(token)".to_string(),
            None => "anonymous".to_string(),
        }
    );

    println!("Status:    {}", reachability(api, Arc::new(session)).await?);
    Ok(())
}

/// List a small collection with the session's token, the way every
/// other command would.
async fn reachability(api: ApiConfig, session: Arc<dyn SessionSource>) -> Result<String> {
    let backend = Backend::new(api, session);
    let empresas = backend.resource(Catalog::megui().resolve("empresas")?);
    Ok(match empresas.list().await {
        Ok(_) => "connected".to_string(),
        Err(CrudError::Network(e)) => format!("disconnected ({})", e),
        Err(e) => format!("error ({})", e),
    })
}

// ── Helpers ──

fn parse_id(raw: &str) -> Result<i64> {
    coerce_id(&Value::String(raw.to_string()))
        .filter(|id| *id > 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid id: {}", raw))
}

fn parse_body(body: &str) -> Result<Record> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => anyhow::bail!("JSON body must be an object."),
        Err(e) => anyhow::bail!("Invalid JSON: {}", e),
    }
}

/// Feed JSON values into an open form, as if typed.
fn fill(dialog: &mut FormDialog, values: &Record) -> Result<()> {
    for (field, value) in values {
        dialog.input_json(field, value)?;
    }
    Ok(())
}

/// Map a category value given on the command line to the table state.
fn category_state(schema: &EntitySchema, value: &str) -> Result<CategoryState> {
    let Some(cat) = &schema.category else {
        anyhow::bail!("{} has no category filter.", schema.name);
    };
    if value.eq_ignore_ascii_case(&cat.first) {
        Ok(CategoryState::First)
    } else if value.eq_ignore_ascii_case(&cat.second) {
        Ok(CategoryState::Second)
    } else if value.eq_ignore_ascii_case("all") || value.eq_ignore_ascii_case("todos") {
        Ok(CategoryState::All)
    } else {
        anyhow::bail!("Category must be {} or {}.", cat.first, cat.second)
    }
}

fn prompt_yes(message: &str) -> bool {
    eprint!("{} [y/N]: ", message);
    let _ = std::io::stderr().flush();
    let mut s = String::new();
    if std::io::stdin().lock().read_line(&mut s).is_err() {
        return false;
    }
    let answer = s.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("s")
}
