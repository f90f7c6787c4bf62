use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stockbook_core::{DomainError, DomainResult};
use stockbook_parties::{Party, PartyId, PartyKind};

/// Lookup store for customers and suppliers.
///
/// The order builders only need existence checks and reference attachment;
/// full party management lives outside the core.
pub trait PartyStore: Send + Sync {
    fn insert(&self, party: Party) -> DomainResult<Party>;

    fn get(&self, id: PartyId) -> DomainResult<Party>;

    /// Resolve a party that must be a customer.
    fn get_customer(&self, id: PartyId) -> DomainResult<Party> {
        let party = self
            .get(id)
            .map_err(|_| DomainError::not_found(format!("Customer {id} not found")))?;
        if party.kind != PartyKind::Customer {
            return Err(DomainError::not_found(format!("Customer {id} not found")));
        }
        Ok(party)
    }

    /// Resolve a party that must be a supplier.
    fn get_supplier(&self, id: PartyId) -> DomainResult<Party> {
        let party = self
            .get(id)
            .map_err(|_| DomainError::not_found(format!("Supplier {id} not found")))?;
        if party.kind != PartyKind::Supplier {
            return Err(DomainError::not_found(format!("Supplier {id} not found")));
        }
        Ok(party)
    }

    fn list(&self) -> DomainResult<Vec<Party>>;
}

impl<S> PartyStore for Arc<S>
where
    S: PartyStore + ?Sized,
{
    fn insert(&self, party: Party) -> DomainResult<Party> {
        (**self).insert(party)
    }

    fn get(&self, id: PartyId) -> DomainResult<Party> {
        (**self).get(id)
    }

    fn list(&self) -> DomainResult<Vec<Party>> {
        (**self).list()
    }
}

/// In-memory party store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPartyStore {
    inner: RwLock<HashMap<PartyId, Party>>,
}

impl InMemoryPartyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PartyStore for InMemoryPartyStore {
    fn insert(&self, party: Party) -> DomainResult<Party> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("party store lock poisoned"))?;
        if map.contains_key(&party.id) {
            return Err(DomainError::conflict(format!(
                "party {} already exists",
                party.id
            )));
        }
        map.insert(party.id, party.clone());
        Ok(party)
    }

    fn get(&self, id: PartyId) -> DomainResult<Party> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::conflict("party store lock poisoned"))?;
        map.get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("Party {id} not found")))
    }

    fn list(&self) -> DomainResult<Vec<Party>> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::conflict("party store lock poisoned"))?;
        let mut parties: Vec<_> = map.values().cloned().collect();
        parties.sort_by_key(|p| p.id.0);
        Ok(parties)
    }
}
