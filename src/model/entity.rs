//! Identity shared by every persisted entity.

use crate::error::DomainError;
use uuid::Uuid;

/// Primary key of owners and accounts.
pub type EntityId = Uuid;

/// An entity with a stable id and a set of scalar (non-relation) fields.
pub trait Entity: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Used in logs and error messages.
    const KIND: &'static str;

    fn id(&self) -> EntityId;

    /// Rejects an incoming state that the tracked instance may not take over.
    fn check_update(&self, _incoming: &Self) -> Result<(), DomainError> {
        Ok(())
    }

    /// Overwrites every scalar field with the one from `other`. Relations are left alone.
    fn assign_scalars(&mut self, other: &Self);

    /// Equality over scalar fields only; drives dirty checking at save time.
    fn scalars_eq(&self, other: &Self) -> bool;
}
