//! List view state for one resource.
//!
//! `ListController` owns the fetched collection and everything derived
//! from it: search and field filters, the current page, column
//! visibility, the inline edit workflow and the notification queue.
//!
//! Gateway failures never escape as errors from the data operations
//! (`load`, `confirm_edit`, `delete_record`, `save_form`). They restore the
//! pre-operation state and push one error notification instead. Only
//! caller mistakes, such as editing a record that is not loaded, are
//! returned as `Err`.

use serde_json::Value;

use crate::columns::{ColumnDef, ColumnVisibility, VisibleRow};
use crate::edit::{EditOutcome, EditWorkflow, PendingEdit};
use crate::error::{DeskError, Result};
use crate::events::{DeskEvent, EventBus};
use crate::filter::{FieldFilter, FilterState, page_count, paginate};
use crate::form::FormModal;
use crate::gateway::{ListFilters, ListPage, ResourceGateway};
use crate::notify::{Notification, Notifications};
use crate::record::{Record, RecordId};
use crate::render::RendererRegistry;
use crate::resources::ResourceSpec;

/// Load lifecycle of the collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// Identifies one list request; only the newest ticket may apply its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

pub struct ListController<G: ResourceGateway> {
    gateway: G,
    spec: ResourceSpec,
    registry: RendererRegistry,
    records: Vec<Record>,
    available_years: Vec<i32>,
    state: LoadState,
    filter: FilterState,
    remote: ListFilters,
    columns: ColumnVisibility,
    edits: EditWorkflow,
    notifications: Notifications,
    events: Option<EventBus>,
    generation: u64,
}

impl<G: ResourceGateway> ListController<G> {
    pub fn new(gateway: G) -> Self {
        let spec = gateway.resource().clone();
        Self {
            gateway,
            spec,
            registry: RendererRegistry::default(),
            records: Vec::new(),
            available_years: Vec::new(),
            state: LoadState::Idle,
            filter: FilterState::new(),
            remote: ListFilters::new(),
            columns: ColumnVisibility::new(),
            edits: EditWorkflow::new(),
            notifications: Notifications::new(),
            events: None,
            generation: 0,
        }
    }

    pub fn with_registry(mut self, registry: RendererRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Result<Self> {
        self.filter.set_page_size(page_size)?;
        Ok(self)
    }

    /// Publish `DataChanged` on this bus after every successful mutation
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Backend this view reads from and writes to
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Resource shown by this view
    pub fn spec(&self) -> &ResourceSpec {
        &self.spec
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// Where the collection is in its load lifecycle
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Every loaded record, before search and field filters
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Years the backend reported alongside the list
    pub fn available_years(&self) -> &[i32] {
        &self.available_years
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn remote_filters(&self) -> &ListFilters {
        &self.remote
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn edit_workflow(&self) -> &EditWorkflow {
        &self.edits
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Start a list request; results from older tickets are discarded
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        tracing::debug!(resource = %self.spec.name, generation = self.generation, "loading");
        LoadTicket(self.generation)
    }

    /// Apply a list result. Returns false if a newer load has started since
    /// `ticket` was issued, in which case nothing changes.
    pub fn apply_list(&mut self, ticket: LoadTicket, result: Result<ListPage>) -> bool {
        let name = self.spec.name.clone();
        self.settle_list(ticket, result, |e| {
            Notification::error(format!("Failed to load {name}: {e}"))
        })
    }

    fn settle_list(
        &mut self,
        ticket: LoadTicket,
        result: Result<ListPage>,
        on_error: impl FnOnce(&DeskError) -> Notification,
    ) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(
                resource = %self.spec.name,
                stale = ticket.0,
                current = self.generation,
                "discarding stale list response"
            );
            return false;
        }

        match result {
            Ok(page) => {
                self.records = page.records;
                self.available_years = page.available_years;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                self.records.clear();
                self.available_years.clear();
                self.state = LoadState::Error(e.to_string());
                self.notifications.push(on_error(&e));
            }
        }
        true
    }

    /// Fetch the collection with the current remote filters
    pub async fn load(&mut self) -> bool {
        let ticket = self.begin_load();
        let result = self.gateway.list(&self.remote).await;
        self.apply_list(ticket, result)
    }

    /// Re-fetch after a change the backend has already stored; a failed
    /// refresh is a warning, not a failure of the change
    async fn refresh_after_save(&mut self) {
        let ticket = self.begin_load();
        let result = self.gateway.list(&self.remote).await;
        let name = self.spec.name.clone();
        self.settle_list(ticket, result, |e| {
            Notification::warning(format!("Saved, but failed to reload {name}: {e}"))
        });
    }

    /// Replace the backend query parameters and re-fetch from page 0
    pub async fn set_remote_filters(&mut self, filters: ListFilters) -> bool {
        self.remote = filters;
        self.filter.set_page(0);
        self.load().await
    }

    /// Re-fetch if the event concerns this resource
    pub async fn handle_event(&mut self, event: &DeskEvent) -> bool {
        if event.resource() != self.spec.name {
            return false;
        }
        self.load().await
    }

    // ------------------------------------------------------------------
    // Filtering and paging
    // ------------------------------------------------------------------

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.set_query(query);
    }

    pub fn set_page(&mut self, page: usize) {
        self.filter.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        self.filter.set_page_size(page_size)
    }

    pub fn set_field_filter(&mut self, filter: FieldFilter) {
        self.filter.set_field_filter(filter);
    }

    pub fn clear_field_filter(&mut self, field: &str) {
        self.filter.clear_field_filter(field);
    }

    /// Records passing the search and field filters, in collection order
    pub fn filtered(&self) -> Vec<&Record> {
        self.filter.apply(&self.records, self.registry.timezone())
    }

    pub fn total_matching(&self) -> usize {
        self.filtered().len()
    }

    pub fn page_count(&self) -> usize {
        page_count(self.total_matching(), self.filter.page_size())
    }

    /// Records on the current page; empty past the last page
    pub fn visible_slice(&self) -> Vec<&Record> {
        let filtered = self.filtered();
        paginate(&filtered, self.filter.page(), self.filter.page_size()).to_vec()
    }

    /// Rendered rows for the current page
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let columns = self.visible_columns();
        self.visible_slice()
            .into_iter()
            .map(|record| {
                let id = self.spec.identity.resolve(record).ok();
                VisibleRow::project(
                    id.as_ref(),
                    record,
                    &columns,
                    &self.registry,
                    &self.spec.actions,
                )
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    pub fn visible_columns(&self) -> Vec<&ColumnDef> {
        self.columns.visible(&self.spec.columns)
    }

    pub fn hide_column(&mut self, key: &str) -> Result<()> {
        self.require_column(key)?;
        self.columns.hide(key);
        Ok(())
    }

    pub fn show_column(&mut self, key: &str) -> Result<()> {
        self.require_column(key)?;
        self.columns.show(key);
        Ok(())
    }

    /// Flip a column's visibility; returns whether it is now visible
    pub fn toggle_column(&mut self, key: &str) -> Result<bool> {
        self.require_column(key)?;
        Ok(self.columns.toggle(key))
    }

    pub fn reset_columns(&mut self) {
        self.columns.reset();
    }

    fn require_column(&self, key: &str) -> Result<()> {
        match self.spec.find_column(key) {
            Some(_) => Ok(()),
            None => Err(DeskError::InvalidFilter(format!(
                "{} has no column '{key}'",
                self.spec.name
            ))),
        }
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    fn index_of(&self, id: &RecordId) -> Option<usize> {
        self.records
            .iter()
            .position(|r| self.spec.identity.resolve(r).ok().as_ref() == Some(id))
    }

    pub fn record(&self, id: &RecordId) -> Option<&Record> {
        self.index_of(id).map(|i| &self.records[i])
    }

    fn not_found(&self, id: &RecordId) -> DeskError {
        DeskError::RecordNotFound(format!("{} {}", self.spec.title, id))
    }

    fn publish_change(&self) {
        if let Some(bus) = &self.events {
            bus.publish(DeskEvent::data_changed(self.spec.name.clone()));
        }
    }

    fn write_field(&mut self, id: &RecordId, field: &str, value: Value) {
        if let Some(index) = self.index_of(id) {
            self.records[index].set(field, value);
        }
    }

    // ------------------------------------------------------------------
    // Inline edits
    // ------------------------------------------------------------------

    /// Propose a new value for one cell.
    ///
    /// Shows the value tentatively and returns the confirmation prompt, or
    /// `None` if the value is unchanged. Fails if another edit is open.
    pub fn begin_edit(&mut self, id: &RecordId, field: &str, value: Value) -> Result<Option<String>> {
        if let Some(current) = self.edits.pending() {
            return Err(DeskError::EditPending(current.field.clone()));
        }
        let index = self.index_of(id).ok_or_else(|| self.not_found(id))?;
        let old = self.records[index].value(field).clone();

        let Some(edit) = self.edits.propose(id.clone(), field, old, value)? else {
            return Ok(None);
        };
        let prompt = edit.prompt(&self.spec, &self.registry);
        let new = edit.new.clone();
        self.records[index].set(field, new);
        Ok(Some(prompt))
    }

    pub fn pending_edit(&self) -> Option<&PendingEdit> {
        self.edits.pending()
    }

    pub fn edit_prompt(&self) -> Option<String> {
        self.edits
            .pending()
            .map(|edit| edit.prompt(&self.spec, &self.registry))
    }

    /// Abandon the pending edit and restore the old value
    pub fn cancel_edit(&mut self) -> Result<()> {
        let edit = self.edits.cancel()?;
        tracing::debug!(id = %edit.id, field = %edit.field, "edit cancelled");
        self.write_field(&edit.id, &edit.field, edit.old);
        Ok(())
    }

    /// Send the pending edit to the backend.
    ///
    /// On failure the old value is restored and one error notification is
    /// raised; the outcome is `Reverted` rather than an error.
    pub async fn confirm_edit(&mut self) -> Result<EditOutcome> {
        let edit = self.edits.confirm()?;
        let mut changes = Record::new();
        changes.set(edit.field.clone(), edit.new.clone());

        let result = self.gateway.update(&edit.id, &changes).await;
        self.edits.finish();

        match result {
            Ok(saved) => {
                if let Some(index) = self.index_of(&edit.id) {
                    self.records[index].merge(&saved);
                }
                self.notifications.push(Notification::success(format!(
                    "Updated {} of {} {}",
                    self.spec.column_title(&edit.field),
                    self.spec.title,
                    edit.id
                )));
                self.publish_change();
                Ok(EditOutcome::Saved)
            }
            Err(e) => {
                self.write_field(&edit.id, &edit.field, edit.old);
                self.notifications.push(Notification::error(format!(
                    "Failed to update {} {}: {e}",
                    self.spec.title, edit.id
                )));
                Ok(EditOutcome::Reverted)
            }
        }
    }

    // ------------------------------------------------------------------
    // Delete and forms
    // ------------------------------------------------------------------

    /// Remove a record, restoring it at its old position if the backend
    /// refuses. Returns whether the delete went through.
    pub async fn delete_record(&mut self, id: &RecordId) -> Result<bool> {
        let index = self.index_of(id).ok_or_else(|| self.not_found(id))?;
        let removed = self.records.remove(index);

        match self.gateway.delete(id).await {
            Ok(()) => {
                self.notifications.push(Notification::success(format!(
                    "Deleted {} {id}",
                    self.spec.title
                )));
                self.publish_change();
                Ok(true)
            }
            Err(e) => {
                let index = index.min(self.records.len());
                self.records.insert(index, removed);
                self.notifications.push(Notification::error(format!(
                    "Failed to delete {} {id}: {e}",
                    self.spec.title
                )));
                Ok(false)
            }
        }
    }

    /// Submit a form and re-fetch on success, returning the saved record.
    /// A failed submit leaves the form open and raises an error
    /// notification.
    pub async fn save_form(&mut self, form: &mut FormModal) -> Option<Record> {
        match form.submit(&self.gateway).await {
            Ok(saved) => {
                self.notifications
                    .push(Notification::success(format!("Saved {}", self.spec.title)));
                self.publish_change();
                self.refresh_after_save().await;
                Some(saved)
            }
            Err(e) => {
                self.notifications.push(Notification::error(format!(
                    "Failed to save {}: {e}",
                    self.spec.title
                )));
                None
            }
        }
    }
}
