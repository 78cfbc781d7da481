//! Work performed over a resolved session.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::connection::Session;
use crate::error::PgResult;

/// A unit of work run over an open session.
#[async_trait]
pub trait Routine: Send + Sync {
    /// What the routine produces.
    type Output: Send;

    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Run against the session. The session is closed by the caller.
    async fn run(&self, session: &mut dyn Session) -> PgResult<Self::Output>;
}

/// Run `routine` over `session`, then close the session whatever the outcome.
///
/// The session is consumed, so it is closed exactly once. A failure to close
/// is logged and does not mask the routine's own result.
pub async fn run_scoped<S, R>(mut session: S, routine: &R) -> PgResult<R::Output>
where
    S: Session,
    R: Routine + ?Sized,
{
    debug!(routine = routine.name(), "Running routine");
    let result = routine.run(&mut session).await;

    if let Err(e) = session.close().await {
        warn!(routine = routine.name(), error = %e, "Failed to close session cleanly");
    }

    if let Err(ref e) = result {
        warn!(routine = routine.name(), error = %e, "Routine failed");
    }
    result
}
