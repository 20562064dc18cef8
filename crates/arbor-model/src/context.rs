/// Request-scoped transaction state handed to the driver.
///
/// Inside an open write transaction uncommitted writes are not reflected in
/// version tokens probed from outside it, so every object must be treated
/// as stale.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxContext {
    transaction: Option<String>,
}

impl TxContext {
    /// No transaction open.
    pub fn none() -> Self {
        Self::default()
    }

    /// Inside the write transaction identified by `id`.
    pub fn write_transaction(id: impl Into<String>) -> Self {
        Self {
            transaction: Some(id.into()),
        }
    }

    pub fn in_write_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction.as_deref()
    }
}
