//! Shared request context.
//!
//! One [`AppContext`] is built at start-up and cloned into every REST handler
//! and GraphQL resolver. Cloning is cheap: every field is reference-counted.
use std::sync::Arc;

use argon2::Argon2;
use diesel_async::pooled_connection::bb8::PooledConnection;

use crate::{
    chatbot::ChatCompletion,
    db::{DbConnection, DbPool},
    mail::Mailer,
    operations::OperationError,
};

/// Handles to every resource an operation may touch.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub pool: DbPool,
    /// Password hasher configured from the runtime settings.
    pub argon2: Arc<Argon2<'static>>,
    /// Outbound mail for verification codes.
    pub mailer: Arc<dyn Mailer>,
    /// Chat-completion proxy for the help bot.
    pub chatbot: Arc<dyn ChatCompletion>,
}

impl AppContext {
    /// Bundle the start-up resources into a context for the handlers.
    #[must_use]
    pub fn new(
        pool: DbPool,
        argon2: Arc<Argon2<'static>>,
        mailer: Arc<dyn Mailer>,
        chatbot: Arc<dyn ChatCompletion>,
    ) -> Self {
        Self {
            pool,
            argon2,
            mailer,
            chatbot,
        }
    }

    /// Check out a pooled connection.
    ///
    /// # Errors
    /// Returns [`OperationError::Unavailable`] when the pool cannot supply a
    /// connection.
    pub async fn conn(&self) -> Result<PooledConnection<'_, DbConnection>, OperationError> {
        self.pool.get().await.map_err(OperationError::from)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use diesel_async::pooled_connection::{AsyncDieselConnectionManager, bb8::Pool};
    use rstest::rstest;

    use super::*;
    use crate::{
        chatbot::{ChatCompletion, ChatbotError},
        mail::LogMailer,
    };

    struct SilentBot;

    #[async_trait::async_trait]
    impl ChatCompletion for SilentBot {
        async fn reply(&self, _message: &str) -> Result<serde_json::Value, ChatbotError> {
            Err(ChatbotError::NotConfigured)
        }
    }

    fn dummy_pool() -> DbPool {
        let manager =
            AsyncDieselConnectionManager::<DbConnection>::new("/nonexistent/dir/healthhub.db");
        Pool::builder()
            .max_size(1)
            .min_idle(Some(0))
            .connection_timeout(Duration::from_millis(200))
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .test_on_check_out(false)
            .build_unchecked(manager)
    }

    fn context(argon2: &Arc<Argon2<'static>>) -> AppContext {
        AppContext::new(
            dummy_pool(),
            Arc::clone(argon2),
            Arc::new(LogMailer),
            Arc::new(SilentBot),
        )
    }

    /// A context whose store can never hand out a connection.
    pub(crate) fn unreachable_context() -> AppContext { context(&Arc::new(Argon2::default())) }

    #[rstest]
    #[tokio::test]
    async fn clones_share_single_argon2_instance() {
        let argon2 = Arc::new(Argon2::default());
        let ctx_a = context(&argon2);
        let ctx_b = ctx_a.clone();

        assert!(Arc::ptr_eq(&ctx_a.argon2, &argon2));
        assert!(Arc::ptr_eq(&ctx_b.argon2, &argon2));
        assert_eq!(Arc::strong_count(&argon2), 3);

        drop(ctx_a);
        assert_eq!(Arc::strong_count(&argon2), 2);
        drop(ctx_b);
        assert_eq!(Arc::strong_count(&argon2), 1);
    }

    #[cfg(feature = "sqlite")]
    #[rstest]
    #[tokio::test]
    async fn unreachable_store_maps_to_unavailable() {
        let ctx = context(&Arc::new(Argon2::default()));
        let err = ctx.conn().await.err().expect("checkout must fail");
        assert!(matches!(err, OperationError::Unavailable(_)));
    }
}
