pub mod cli;
pub mod columns;
pub mod commands;
pub mod config;
pub mod controller;
pub mod display;
pub mod edit;
pub mod error;
pub mod events;
pub mod filter;
pub mod form;
pub mod gateway;
pub mod notify;
pub mod record;
pub mod render;
pub mod resources;

pub use config::Config;
pub use controller::{ListController, LoadState, LoadTicket};
pub use edit::{EditOutcome, EditPhase, EditWorkflow, PendingEdit};
pub use error::{DeskError, Result};
pub use events::{DeskEvent, EventBus, Subscription};
pub use filter::{FieldFilter, FilterState, matches_query, page_count, paginate};
pub use form::{FormMode, FormModal};
pub use gateway::{
    AnyGateway, ApiError, Fixture, HttpGateway, ListFilters, ListPage, MemoryGateway, Operation,
    ResourceGateway,
};
pub use notify::{Level, Notification, Notifications};
pub use record::{IdentityKey, Record, RecordId};
pub use render::{Rendered, RendererRegistry, RenderOptions, Tone, ValueKind};
pub use resources::ResourceSpec;
