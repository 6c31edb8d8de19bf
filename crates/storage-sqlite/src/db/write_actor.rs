use super::DbPool;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use log::{debug, error};
use pricesync_core::errors::{DatabaseError, Error, Result};
use std::any::Any;
use tokio::sync::{mpsc, oneshot};

// A write job runs against the writer's dedicated connection.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type ErasedReply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, ErasedReply)>,
}

impl WriteHandle {
    /// Runs `job` on the writer connection inside an immediate transaction.
    ///
    /// Jobs run one at a time in submission order. The transaction commits
    /// when the job returns `Ok` and rolls back otherwise.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_gone("Writer actor is not running"))?;

        let boxed = ret_rx
            .await
            .map_err(|_| writer_gone("Writer actor dropped the job without replying"))??;

        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| writer_gone("Writer actor returned an unexpected result type"))
    }
}

/// Spawns the single writer task.
///
/// The writer takes one connection out of `pool` and keeps it until every
/// [`WriteHandle`] is dropped. Must be called from within a Tokio runtime.
pub fn spawn_writer(pool: DbPool) -> Result<WriteHandle> {
    let mut conn = pool.get().map_err(StorageError::from)?;
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, ErasedReply)>(1024);

    tokio::spawn(async move {
        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(|e: StorageError| {
                    error!("Write job failed: {}", e);
                    e.into()
                });

            // The caller may have given up waiting.
            let _ = reply_tx.send(result);
        }
        debug!("Writer actor stopped");
    });

    Ok(WriteHandle { tx })
}

fn writer_gone(message: &str) -> Error {
    Error::Database(DatabaseError::Internal(message.to_string()))
}
