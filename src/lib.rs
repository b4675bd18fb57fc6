//! Banking API: owners and accounts over SQLite, with a tracked repository layer and REST routes.

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod model;
pub mod repo;
pub mod response;
pub mod routes;
pub mod seed;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{AppConfig, DataSource, DatabaseKind};
pub use context::{DataContext, EntryState, Record};
pub use error::{AppError, AppResult, ConfigError, DomainError};
pub use model::{Account, AccountDto, Entity, EntityId, Owner, OwnerDto};
pub use repo::{AccountColumn, AccountsRepository, GenericRepository, OwnerColumn, OwnersRepository};
pub use response::{success_created, success_many, success_one};
pub use routes::{app, banking_routes, common_routes_with_ready};
pub use sql::Filter;
pub use state::AppState;
pub use store::{connect, connect_in_memory, drop_schema, ensure_schema};
