//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use subtrack_core::{
  store::{RecordStore, UserFilter},
  subscription::{NewSubscription, Subscription},
  user::{NewUser, NotificationPrefs, User},
};

use crate::{
  Error, Result,
  encode::{RawSubscription, RawUser, encode_dt, encode_uuid},
  schema::SCHEMA,
};

const USER_COLUMNS: &str = "user_id, email, monthly_budget, \
   payment_reminders, budget_alerts, monthly_summary, new_subscription, \
   created_at";

const SUBSCRIPTION_COLUMNS: &str =
  "subscription_id, user_id, name, monthly_price, billing_day, created_at";

fn raw_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:           row.get(0)?,
    email:             row.get(1)?,
    monthly_budget:    row.get(2)?,
    payment_reminders: row.get(3)?,
    budget_alerts:     row.get(4)?,
    monthly_summary:   row.get(5)?,
    new_subscription:  row.get(6)?,
    created_at:        row.get(7)?,
  })
}

fn raw_subscription(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSubscription> {
  Ok(RawSubscription {
    subscription_id: row.get(0)?,
    user_id:         row.get(1)?,
    name:            row.get(2)?,
    monthly_price:   row.get(3)?,
    billing_day:     row.get(4)?,
    created_at:      row.get(5)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A SubTrack record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn user_exists(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    if self.get_user_by_email(input.email.clone()).await?.is_some() {
      return Err(Error::DuplicateEmail(input.email));
    }

    let user = User {
      user_id:        Uuid::new_v4(),
      email:          input.email,
      monthly_budget: input.monthly_budget,
      prefs:          input.prefs,
      created_at:     Utc::now(),
    };

    let id_str = encode_uuid(user.user_id);
    let email = user.email.clone();
    let budget = user.monthly_budget;
    let prefs = user.prefs;
    let at_str = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, email, monthly_budget,
             payment_reminders, budget_alerts, monthly_summary,
             new_subscription, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            email,
            budget,
            prefs.payment_reminders,
            prefs.budget_alerts,
            prefs.monthly_summary,
            prefs.new_subscription,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              raw_user,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user_by_email(&self, email: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
              rusqlite::params![email],
              raw_user,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn update_profile(
    &self,
    id: Uuid,
    monthly_budget: f64,
    prefs: NotificationPrefs,
  ) -> Result<User> {
    let id_str = encode_uuid(id);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET
             monthly_budget = ?2,
             payment_reminders = ?3, budget_alerts = ?4,
             monthly_summary = ?5, new_subscription = ?6
           WHERE user_id = ?1",
          rusqlite::params![
            id_str,
            monthly_budget,
            prefs.payment_reminders,
            prefs.budget_alerts,
            prefs.monthly_summary,
            prefs.new_subscription,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::UserNotFound(id));
    }
    self.get_user(id).await?.ok_or(Error::UserNotFound(id))
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        // Cascade explicitly; the FK clause only applies with
        // foreign_keys=ON, and the subscriptions must go either way.
        conn.execute(
          "DELETE FROM subscriptions WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(conn.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn find_users(&self, filter: UserFilter) -> Result<Vec<User>> {
    let mut clauses: Vec<String> = Vec::new();
    if let Some(v) = filter.payment_reminders {
      clauses.push(format!("payment_reminders = {}", i64::from(v)));
    }
    if let Some(v) = filter.budget_alerts {
      clauses.push(format!("budget_alerts = {}", i64::from(v)));
    }
    if let Some(v) = filter.monthly_summary {
      clauses.push(format!("monthly_summary = {}", i64::from(v)));
    }
    if filter.require_budget {
      clauses.push("monthly_budget > 0".to_string());
    }

    let mut sql = format!("SELECT {USER_COLUMNS} FROM users");
    if !clauses.is_empty() {
      sql.push_str(" WHERE ");
      sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY email");

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], raw_user)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  async fn add_subscription(
    &self,
    input: NewSubscription,
  ) -> Result<Subscription> {
    if !self.user_exists(input.user_id).await? {
      return Err(Error::UserNotFound(input.user_id));
    }

    let subscription = Subscription {
      subscription_id: Uuid::new_v4(),
      user_id:         input.user_id,
      name:            input.name,
      monthly_price:   input.monthly_price,
      billing_day:     input.billing_day,
      created_at:      Utc::now(),
    };

    let id_str = encode_uuid(subscription.subscription_id);
    let owner_str = encode_uuid(subscription.user_id);
    let name = subscription.name.clone();
    let price = subscription.monthly_price;
    let day = i64::from(subscription.billing_day);
    let at_str = encode_dt(subscription.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subscriptions (
             subscription_id, user_id, name, monthly_price, billing_day,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, owner_str, name, price, day, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(subscription)
  }

  async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions
                 WHERE subscription_id = ?1"
              ),
              rusqlite::params![id_str],
              raw_subscription,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  async fn subscriptions_for(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
    let owner_str = encode_uuid(user_id);

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions
           WHERE user_id = ?1 ORDER BY name"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], raw_subscription)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawSubscription::into_subscription)
      .collect()
  }

  async fn delete_subscription(
    &self,
    user_id: Uuid,
    subscription_id: Uuid,
  ) -> Result<bool> {
    let owner_str = encode_uuid(user_id);
    let id_str = encode_uuid(subscription_id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subscriptions
           WHERE subscription_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, owner_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }
}
