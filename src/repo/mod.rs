//! Repositories: the generic CRUD trait and one repository per aggregate.

mod accounts;
mod generic;
mod owners;

pub use accounts::{AccountColumn, AccountsRepository};
pub use generic::GenericRepository;
pub use owners::{OwnerColumn, OwnersRepository};
