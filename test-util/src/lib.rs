//! Utilities for integration tests.
//!
//! The `test-util` crate provides a scratch database, recording doubles for
//! the mail and chatbot seams, and a [`TestApp`] that wires them into a
//! router exactly as the daemon does. It is used by integration tests in the
//! main crate.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::Router;
use healthhub::{
    chatbot::{ChatCompletion, ChatbotError},
    context::AppContext,
    db::{DbPool, create_hospital},
    mail::{MailError, Mailer, Message},
    models::NewHospital,
    server::{build_router, setup_database},
};
use serde_json::Value;
#[cfg(feature = "sqlite")]
use tempfile::TempDir;

#[cfg(all(feature = "sqlite", feature = "postgres"))]
compile_error!("Choose either sqlite or postgres, not both");

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
compile_error!("Either feature 'sqlite' or 'postgres' must be enabled");

/// Boxed error used by helpers that mix failure sources.
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// Origin the test router allows through CORS.
pub const TEST_ORIGIN: &str = "http://localhost:3000";

/// A migrated database that lives as long as this value.
pub struct TestDb {
    pool: DbPool,
    url: String,
    /// Keep the temporary directory alive for the lifetime of the pool.
    #[cfg(feature = "sqlite")]
    _dir: TempDir,
}

impl TestDb {
    /// Create a fresh `SQLite` database file in a temporary directory.
    ///
    /// # Errors
    /// Returns an error if the directory, pool or migrations fail.
    #[cfg(feature = "sqlite")]
    pub async fn new() -> Result<Self, AnyError> {
        let dir = TempDir::new()?;
        let url = dir.path().join("healthhub.db").to_string_lossy().into_owned();
        let pool = setup_database(&url).await.map_err(AnyError::from)?;
        Ok(Self {
            pool,
            url,
            _dir: dir,
        })
    }

    /// Connect to the database named by `POSTGRES_TEST_URL`.
    ///
    /// The database is expected to be empty; every table is truncated before
    /// the handle is returned.
    ///
    /// # Errors
    /// Returns an error if the variable is unset or the database is
    /// unreachable.
    #[cfg(feature = "postgres")]
    pub async fn new() -> Result<Self, AnyError> {
        use diesel_async::RunQueryDsl;

        let url = std::env::var("POSTGRES_TEST_URL")
            .map_err(|_| "POSTGRES_TEST_URL must name a scratch database")?;
        let pool = setup_database(&url).await.map_err(AnyError::from)?;
        {
            let mut conn = pool.get().await?;
            diesel::sql_query(
                "TRUNCATE users, blogs, records, hospitals, appointments RESTART IDENTITY",
            )
            .execute(&mut conn)
            .await?;
        }
        Ok(Self { pool, url })
    }

    /// Connection pool for the database.
    #[must_use]
    pub fn pool(&self) -> DbPool { self.pool.clone() }

    /// Connection string for the database.
    #[must_use]
    pub fn url(&self) -> &str { &self.url }
}

/// Mailer that keeps every message instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Message>>,
    fail: bool,
}

impl RecordingMailer {
    /// A mailer that rejects every message.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Message> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &Message) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError {
                to: message.to.clone(),
                reason: "relay refused".to_owned(),
            });
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        Ok(())
    }
}

/// Chatbot double returning a canned reply, or failing when none is set.
#[derive(Default)]
pub struct StubChatbot {
    reply: Option<Value>,
    seen: Mutex<Vec<String>>,
}

impl StubChatbot {
    /// A chatbot that answers every message with `reply`.
    #[must_use]
    pub fn replying(reply: Value) -> Self {
        Self {
            reply: Some(reply),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Messages received so far.
    #[must_use]
    pub fn seen(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ChatCompletion for StubChatbot {
    async fn reply(&self, message: &str) -> Result<Value, ChatbotError> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
        self.reply.clone().ok_or(ChatbotError::Status(503))
    }
}

/// A fully wired application over a scratch database.
pub struct TestApp {
    /// Shared context as injected into handlers.
    pub ctx: AppContext,
    /// The mailer behind `ctx.mailer`.
    pub mailer: Arc<RecordingMailer>,
    /// The chatbot behind `ctx.chatbot`.
    pub chatbot: Arc<StubChatbot>,
    /// Backing database.
    pub db: TestDb,
}

impl TestApp {
    /// Build an app with a recording mailer and a chatbot that always fails.
    ///
    /// # Errors
    /// Returns an error if the database cannot be prepared.
    pub async fn new() -> Result<Self, AnyError> {
        Self::with_doubles(RecordingMailer::default(), StubChatbot::default()).await
    }

    /// Build an app around the given doubles.
    ///
    /// # Errors
    /// Returns an error if the database cannot be prepared.
    pub async fn with_doubles(
        mailer: RecordingMailer,
        chatbot: StubChatbot,
    ) -> Result<Self, AnyError> {
        let db = TestDb::new().await?;
        let mailer = Arc::new(mailer);
        let chatbot = Arc::new(chatbot);
        let ctx = AppContext::new(
            db.pool(),
            Arc::new(argon2::Argon2::default()),
            Arc::clone(&mailer) as Arc<dyn Mailer>,
            Arc::clone(&chatbot) as Arc<dyn ChatCompletion>,
        );
        Ok(Self {
            ctx,
            mailer,
            chatbot,
            db,
        })
    }

    /// The router the daemon would serve for this app.
    ///
    /// # Errors
    /// Returns an error if the router cannot be assembled.
    pub fn router(&self) -> Result<Router, AnyError> {
        build_router(self.ctx.clone(), TEST_ORIGIN).map_err(AnyError::from)
    }

    /// Insert a small hospital directory.
    ///
    /// # Errors
    /// Returns an error if the inserts fail.
    pub async fn seed_hospitals(&self) -> Result<(), AnyError> {
        let mut conn = self.ctx.pool.get().await?;
        for hospital in sample_hospitals() {
            create_hospital(&mut conn, &hospital).await?;
        }
        Ok(())
    }
}

/// Two hospitals with bilingual department lists.
#[must_use]
pub fn sample_hospitals() -> [NewHospital<'static>; 2] {
    [
        NewHospital {
            name: "Peking Union Medical College Hospital",
            address_zh: "北京市东城区帅府园1号",
            address_en: "1 Shuaifuyuan, Dongcheng, Beijing",
            phone: "010-69156114",
            intro: "Comprehensive teaching hospital",
            departments_zh: "内科,外科,儿科",
            departments_en: "Internal Medicine,Surgery,Pediatrics",
            img_url: "/img/pumch.jpg",
        },
        NewHospital {
            name: "City Eye Hospital",
            address_zh: "上海市汾阳路83号",
            address_en: "83 Fenyang Road, Shanghai",
            phone: "021-64377134",
            intro: "Ophthalmology specialist",
            departments_zh: "眼科",
            departments_en: "Ophthalmology",
            img_url: "/img/eye.jpg",
        },
    ]
}
