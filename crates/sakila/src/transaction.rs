//! Transaction helper.
//!
//! Repositories accept any [`GenericClient`](crate::GenericClient), so running
//! several operations atomically is a matter of handing them a transaction:
//!
//! ```ignore
//! sakila::transaction!(&mut client, tx, {
//!     let actors = sakila::ActorRepository::new(&tx);
//!     let id = actors.save_with_returning_pk_only(&NewActor::new("ED", "CHASE")).await?;
//!     actors.update_with_request(id, &ActorUpdateRequest::default().last_name("WOOD")).await?;
//!     Ok(id)
//! })?;
//! ```

/// Runs the given block inside a database transaction.
///
/// - Begins a transaction via `$client.transaction().await`.
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)`.
///
/// The block must evaluate to `sakila::StoreResult<T>`.
#[macro_export]
macro_rules! transaction {
    ($client:expr, $tx:ident, $body:block) => {{
        let $tx = ($client)
            .transaction()
            .await
            .map_err($crate::StoreError::from_db_error)?;

        let __sakila_tx_result: $crate::StoreResult<_> = async { $body }.await;
        match __sakila_tx_result {
            Ok(value) => {
                $tx.commit()
                    .await
                    .map_err($crate::StoreError::from_db_error)?;
                Ok(value)
            }
            Err(error) => match $tx.rollback().await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err($crate::StoreError::Other(format!(
                    "{error} (rollback failed: {rollback_err})"
                ))),
            },
        }
    }};
}
