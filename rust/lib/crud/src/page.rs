//! Generic list page: one collection, its reference data, a table and at
//! most one open form dialog.
//!
//! The page never patches its local copy of the collection. After every
//! successful mutation it refetches everything ([`RefreshPolicy`]).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use megui_client::{ReferenceApi, ResourceApi};
use megui_core::{CrudError, Notification, Notifier, Record, SessionSource, can_delete, record_id};
use megui_schema::EntitySchema;

use crate::form::EntityForm;
use crate::table::{ReferenceData, TableState, TableView, cell_text};
use crate::unique::{UniqueState, UniquenessWatcher};

/// What the page does with its local data after a create, update or
/// delete succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Reload the collection and every reference from the server.
    #[default]
    InvalidateAndRefetch,
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

// ── Form dialog ──

/// An open form plus one debounced watcher per uniqueness check.
pub struct FormDialog {
    form: EntityForm,
    watchers: BTreeMap<String, UniquenessWatcher>,
}

impl FormDialog {
    pub fn new(
        schema: Arc<EntitySchema>,
        api: Arc<dyn ResourceApi>,
        entity: Option<&Record>,
        now: DateTime<Utc>,
    ) -> Self {
        let watchers = schema
            .unique_checks
            .iter()
            .map(|c| (c.field.clone(), UniquenessWatcher::new(Arc::clone(&api), c.clone())))
            .collect();
        Self {
            form: EntityForm::open(schema, entity, now),
            watchers,
        }
    }

    pub fn form(&self) -> &EntityForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EntityForm {
        &mut self.form
    }

    pub fn watcher(&self, field: &str) -> Option<&UniquenessWatcher> {
        self.watchers.get(field)
    }

    /// Raw user input. Restarts the uniqueness timers the field feeds.
    pub fn input(&mut self, field: &str, raw: &str) -> Result<(), CrudError> {
        let checks = self.form.set(field, raw)?;
        for check in &checks {
            self.restart(&check.field);
        }
        Ok(())
    }

    /// Dropdown selection or other structured input.
    pub fn input_json(&mut self, field: &str, value: &Value) -> Result<(), CrudError> {
        let checks = self.form.set_json(field, value)?;
        for check in &checks {
            self.restart(&check.field);
        }
        Ok(())
    }

    fn restart(&mut self, field: &str) {
        let Some(watcher) = self.watchers.get_mut(field) else {
            return;
        };
        if self.form.unique_ready(watcher.check()) {
            let params = self.form.unique_params(watcher.check());
            watcher.changed(params);
        } else {
            watcher.cancel();
        }
    }

    /// Fold watcher answers into the form. Checks still waiting on their
    /// timer are cancelled and run immediately. A check that cannot reach
    /// the server leaves the field unflagged; the server has the last word.
    pub async fn verify_unique(&mut self, api: &dyn ResourceApi) {
        for watcher in self.watchers.values_mut() {
            let check = watcher.check().clone();
            match watcher.state() {
                UniqueState::Pending => {
                    watcher.cancel();
                    if !self.form.unique_ready(&check) {
                        continue;
                    }
                    let params = self.form.unique_params(&check);
                    match api.check_unique(&check, &params).await {
                        Ok(true) => self.form.mark_conflict(&check),
                        Ok(false) => self.form.clear_conflict(&check.field),
                        Err(e) => {
                            warn!(field = %check.field, error = %e, "uniqueness check failed, not blocking");
                            self.form.clear_conflict(&check.field);
                        }
                    }
                }
                UniqueState::Conflict => self.form.mark_conflict(&check),
                UniqueState::Clear | UniqueState::Idle => self.form.clear_conflict(&check.field),
                UniqueState::Failed(reason) => {
                    debug!(field = %check.field, %reason, "uniqueness unknown, not blocking");
                }
            }
        }
    }
}

// ── List page ──

pub struct ListPage {
    schema: Arc<EntitySchema>,
    api: Arc<dyn ResourceApi>,
    refs: Arc<dyn ReferenceApi>,
    session: Arc<dyn SessionSource>,
    notifier: Arc<dyn Notifier>,
    policy: RefreshPolicy,
    records: Vec<Record>,
    references: ReferenceData,
    loaded: bool,
    pub table: TableState,
    dialog: Option<FormDialog>,
}

impl ListPage {
    pub fn new(
        schema: Arc<EntitySchema>,
        api: Arc<dyn ResourceApi>,
        refs: Arc<dyn ReferenceApi>,
        session: Arc<dyn SessionSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            schema,
            api,
            refs,
            session,
            notifier,
            policy: RefreshPolicy::default(),
            records: Vec::new(),
            references: ReferenceData::default(),
            loaded: false,
            table: TableState::default(),
            dialog: None,
        }
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Load the collection and every reference concurrently.
    ///
    /// All or nothing: when any request fails the previous data is kept,
    /// an error toast is shown and the first error is returned.
    pub async fn load(&mut self) -> Result<(), CrudError> {
        let refs = self.refs.as_ref();
        let reference_loads = self
            .schema
            .references
            .iter()
            .map(move |r| async move { (r.name.clone(), refs.list_reference(r).await) });
        let (main, loaded_refs) = futures::join!(self.api.list(), join_all(reference_loads));

        let outcome = main.and_then(|rows| {
            let mut data = ReferenceData::default();
            for (name, result) in loaded_refs {
                data.insert(&name, result?);
            }
            Ok((rows, data))
        });

        match outcome {
            Ok((rows, data)) => {
                info!(entity = %self.schema.name, rows = rows.len(), "loaded");
                self.records = rows;
                self.references = data;
                self.loaded = true;
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error(format!("Error al cargar {}", self.schema.label), e.user_message()));
                Err(e)
            }
        }
    }

    async fn refresh(&mut self) {
        match self.policy {
            RefreshPolicy::InvalidateAndRefetch => {
                // Failures are already reported by `load`.
                let _ = self.load().await;
            }
        }
    }

    // ── Table ──

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn references(&self) -> &ReferenceData {
        &self.references
    }

    pub fn view(&self) -> TableView {
        self.table.view(&self.schema, &self.references, &self.records)
    }

    /// Reference label of a foreign-key value, the raw id when unknown.
    pub fn label_for(&self, field: &str, id: i64) -> String {
        self.references
            .label(&self.schema, field, id)
            .unwrap_or_else(|| id.to_string())
    }

    pub fn reference_options(&self, field: &str) -> Vec<(i64, String)> {
        self.references.options(&self.schema, field)
    }

    // ── Dialog ──

    pub fn dialog(&self) -> Option<&FormDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut FormDialog> {
        self.dialog.as_mut()
    }

    /// Open an empty create form. Replaces any open dialog.
    pub fn open_new(&mut self) -> &mut FormDialog {
        self.open_new_at(Utc::now())
    }

    pub fn open_new_at(&mut self, now: DateTime<Utc>) -> &mut FormDialog {
        let dialog = FormDialog::new(Arc::clone(&self.schema), Arc::clone(&self.api), None, now);
        self.dialog.insert(dialog)
    }

    /// Open the edit form of a loaded row.
    pub fn edit(&mut self, id: i64) -> Result<&mut FormDialog, CrudError> {
        let record = self
            .records
            .iter()
            .find(|r| record_id(r) == Some(id))
            .cloned()
            .ok_or_else(|| CrudError::Server {
                status: 404,
                message: format!("{} #{} no está cargado", self.schema.label, id),
            })?;
        let dialog = FormDialog::new(Arc::clone(&self.schema), Arc::clone(&self.api), Some(&record), Utc::now());
        Ok(self.dialog.insert(dialog))
    }

    /// Row click. Pages without row editing ignore it.
    pub fn row_click(&mut self, id: i64) -> Option<&mut FormDialog> {
        if !self.schema.row_edit {
            return None;
        }
        self.edit(id).ok()
    }

    /// Close the dialog without saving. Pending checks are aborted.
    pub fn cancel(&mut self) {
        self.dialog = None;
    }

    /// Submit the open dialog. On success the dialog closes and the page
    /// refetches; on failure it stays open with its values.
    pub async fn save(&mut self) -> Result<Record, CrudError> {
        let api = Arc::clone(&self.api);
        let notifier = Arc::clone(&self.notifier);
        let Some(dialog) = self.dialog.as_mut() else {
            return Err(CrudError::Config("no hay un formulario abierto".to_string()));
        };

        dialog.verify_unique(api.as_ref()).await;
        let saved = dialog.form_mut().submit(api.as_ref(), notifier.as_ref()).await?;

        self.dialog = None;
        self.refresh().await;
        Ok(saved)
    }

    // ── Delete ──

    /// Whether the delete action is offered at all.
    pub fn can_delete(&self) -> bool {
        self.schema.deletable && can_delete(self.session.usuario().as_ref())
    }

    /// Actions shown on a row.
    pub fn row_actions(&self) -> Vec<&'static str> {
        let mut actions = Vec::new();
        if self.schema.row_edit {
            actions.push("editar");
        }
        if self.can_delete() {
            actions.push("eliminar");
        }
        actions
    }

    /// Display text of a loaded row, from the entity's display field.
    fn display_name(&self, id: i64) -> Option<String> {
        let record = self.records.iter().find(|r| record_id(r) == Some(id))?;
        let text = cell_text(&self.schema, &self.references, &self.schema.display_field, record);
        (!text.is_empty()).then_some(text)
    }

    /// Delete a row after confirmation.
    ///
    /// Returns `Ok(false)` when the user declines. Unauthorized sessions
    /// get a warning and no request is sent.
    pub async fn delete(&mut self, id: i64, confirm: &dyn Confirm) -> Result<bool, CrudError> {
        if !self.can_delete() {
            warn!(entity = %self.schema.name, id, "delete denied for current session");
            let err = CrudError::Forbidden("No tiene permisos para eliminar registros".to_string());
            self.notifier
                .notify(Notification::warning("Acceso denegado", err.user_message()));
            return Err(err);
        }

        let message = match self.display_name(id) {
            Some(name) => format!("¿Eliminar {} #{} \"{}\"?", self.schema.label, id, name),
            None => format!("¿Eliminar {} #{}?", self.schema.label, id),
        };
        if !confirm.confirm(&message) {
            debug!(entity = %self.schema.name, id, "delete declined");
            return Ok(false);
        }

        match self.api.delete(id).await {
            Ok(()) => {
                self.notifier
                    .notify(Notification::success("Registro eliminado", format!("{} #{}", self.schema.label, id)));
                self.refresh().await;
                Ok(true)
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Error al eliminar", e.user_message()));
                Err(e)
            }
        }
    }
}
