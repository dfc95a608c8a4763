use sqlx::PgConnection;

/// A borrowed database connection, either checked out of the pool or belonging to an
/// open transaction
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Gives driven adapters access to external systems without the domain knowing which
/// concrete clients sit behind it
pub trait ExternalConnectivity {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// External connectivity bound to an open database transaction. Dropping it without
/// calling [commit][TransactionHandle::commit] rolls the transaction back.
pub trait TransactionHandle: ExternalConnectivity + Send {
    async fn commit(self) -> Result<(), anyhow::Error>;
}

/// Something which can open a database transaction
pub trait Transactable {
    type Handle: TransactionHandle;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

pub trait TransactableExternalConnectivity: ExternalConnectivity + Transactable {}

impl<T> TransactableExternalConnectivity for T where T: ExternalConnectivity + Transactable {}
