//! Domain entities and their wire shapes.

pub mod account;
pub mod dto;
pub mod entity;
pub mod owner;

pub use account::Account;
pub use dto::{AccountDto, OwnerDto};
pub use entity::{Entity, EntityId};
pub use owner::Owner;
