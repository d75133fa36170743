/*
 *  Podio - Discord bot maintaining a point-based ranking for a guild.
 *  Copyright (C) 2025  Podio contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use chrono::Utc;
use getset::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::Mutex;

/// Largest delta a single add/subtract command may apply.
pub const MAX_STEP: i64 = 100_000;
/// Absolute bound on any user's point total.
pub const MAX_TOTAL: i64 = 10_000_000;

/* Data structures: */

/**
 * One ranked user's persisted record.
 *
 * `created_at` (epoch milliseconds) is only used as a tie-break when sorting;
 * records written by older versions of the database may lack it.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, Serialize, Deserialize, Getters)]
pub struct ScoreRecord {
    #[getset(get = "pub")]
    points: i64,
    #[getset(get = "pub")]
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    created_at: Option<i64>,
}

impl ScoreRecord {
    fn new() -> ScoreRecord {
        ScoreRecord {
            points: 0,
            created_at: Some(now_ms()),
        }
    }
}

/**
 * The whole ranking database, as persisted on disk:
 *
 * ```json
 * { "users": { "<userId>": { "points": 0, "createdAt": 0 } }, "updatedAt": 0 }
 * ```
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Default, Serialize, Deserialize, Getters)]
pub struct RankingDb {
    #[getset(get = "pub")]
    #[serde(default)]
    users: HashMap<String, ScoreRecord>,
    #[getset(get = "pub")]
    #[serde(rename = "updatedAt", default)]
    updated_at: i64,
}

/**
 * What `rank-reset` should do with the existing records.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum ResetMode {
    /// Keep every user on the ranking, but set all totals to zero.
    #[name = "zero"]
    Zero,
    /// Discard every record.
    #[name = "wipe"]
    Wipe,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a target user is required")]
    MissingUserId,
    #[error("point delta out of range (at most ±{MAX_STEP} per command): {0}")]
    InvalidDelta(i64),
    #[error("point total out of range (at most ±{MAX_TOTAL}): {0}")]
    InvalidValue(i64),
    #[error("could not persist the ranking database: {0}")]
    Io(#[from] std::io::Error),
}

/**
 * Durable CRUD over the ranking database.
 *
 * Every operation is a full read-modify-write of the backing JSON file.
 * Mutations are serialized behind `write_lock`, so two concurrent point
 * adjustments cannot lose each other's update; reads stay lock-free.
 */
pub struct Store {
    path: PathBuf,
    write_lock: Mutex<()>,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Store {
        Store {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /**
     * Makes sure the backing file exists and is well-formed, rewriting it
     * normalized. Called once at startup.
     */
    pub async fn init(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let _guard = self.write_lock.lock().await;
        let mut db = self.read_db();
        self.persist(&mut db)
    }

    /**
     * Adds `delta` points to a user, creating a zero-point record first if the
     * user is not on the ranking. The resulting total is clamped to
     * `[-MAX_TOTAL, MAX_TOTAL]`. Returns the new total.
     */
    pub async fn add_points(&self, user_id: &str, delta: i64) -> Result<i64, StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::MissingUserId);
        }
        if delta.unsigned_abs() > MAX_STEP as u64 {
            return Err(StoreError::InvalidDelta(delta));
        }

        let _guard = self.write_lock.lock().await;
        let mut db = self.read_db();
        let record = db
            .users
            .entry(user_id.to_string())
            .or_insert_with(ScoreRecord::new);
        record.points = (record.points + delta).clamp(-MAX_TOTAL, MAX_TOTAL);
        let total = record.points;
        self.persist(&mut db)?;

        Ok(total)
    }

    /**
     * Overwrites a user's total with `value`, creating the record if absent.
     * `created_at` is preserved for existing records.
     */
    pub async fn set_points(&self, user_id: &str, value: i64) -> Result<i64, StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::MissingUserId);
        }
        if value.unsigned_abs() > MAX_TOTAL as u64 {
            return Err(StoreError::InvalidValue(value));
        }

        let _guard = self.write_lock.lock().await;
        let mut db = self.read_db();
        let record = db
            .users
            .entry(user_id.to_string())
            .or_insert_with(ScoreRecord::new);
        record.points = value;
        self.persist(&mut db)?;

        Ok(value)
    }

    /**
     * Ensures a zero-point record exists for the user. Returns `true` if a new
     * record was created, `false` if the user was already on the ranking.
     */
    pub async fn add_user(&self, user_id: &str) -> Result<bool, StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::MissingUserId);
        }

        let _guard = self.write_lock.lock().await;
        let mut db = self.read_db();
        if db.users.contains_key(user_id) {
            return Ok(false);
        }
        db.users.insert(user_id.to_string(), ScoreRecord::new());
        self.persist(&mut db)?;

        Ok(true)
    }

    /**
     * Deletes a user's record. Removing an absent user is a no-op, not an
     * error; the returned flag tells whether a record was actually removed.
     */
    pub async fn remove_user(&self, user_id: &str) -> Result<bool, StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::MissingUserId);
        }

        let _guard = self.write_lock.lock().await;
        let mut db = self.read_db();
        if db.users.remove(user_id).is_none() {
            return Ok(false);
        }
        self.persist(&mut db)?;

        Ok(true)
    }

    /**
     * Resets the whole ranking, either zeroing every total or wiping all
     * records, depending on `mode`.
     */
    pub async fn reset_all(&self, mode: ResetMode) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut db = self.read_db();
        match mode {
            ResetMode::Zero => {
                for record in db.users.values_mut() {
                    record.points = 0;
                }
            }
            ResetMode::Wipe => db.users.clear(),
        }
        self.persist(&mut db)
    }

    /**
     * Returns every record as a list. No ordering is guaranteed; callers that
     * need the leaderboard order go through `ranking::get_sorted`.
     */
    pub async fn get_all(&self) -> Vec<(String, ScoreRecord)> {
        self.read_db().users.into_iter().collect()
    }

    /**
     * The full persisted structure, pretty-printed, for backup/inspection.
     */
    pub async fn export_json(&self) -> String {
        serde_json::to_string_pretty(&self.read_db())
            .expect("Could not serialize the ranking database into JSON.")
    }

    /**
     * Loads the database from disk. A missing, empty or unparsable file is
     * treated as the empty database; this never surfaces a parse error to the
     * caller. Stored totals are clamped on the way in, self-healing any
     * out-of-range value written by older versions.
     *
     * Never writes: only `init` and the mutators (which hold `write_lock`)
     * recreate a corrupt file, so a lock-free read cannot clobber a concurrent
     * mutation's persist.
     */
    fn read_db(&self) -> RankingDb {
        let raw = fs::read_to_string(&self.path).unwrap_or_default();
        let mut db: RankingDb = match serde_json::from_str(&raw) {
            Ok(db) => db,
            Err(e) => {
                if !raw.is_empty() {
                    tracing::warn!(
                        "ranking database at {} is corrupt ({e}); starting over empty",
                        self.path.display()
                    );
                }
                return RankingDb::default();
            }
        };
        for record in db.users.values_mut() {
            record.points = record.points.clamp(-MAX_TOTAL, MAX_TOTAL);
        }
        db
    }

    fn persist(&self, db: &mut RankingDb) -> Result<(), StoreError> {
        db.updated_at = now_ms();
        let json = serde_json::to_string_pretty(db)
            .expect("Could not serialize the ranking database into JSON.");
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> Store {
        let dir = std::env::temp_dir().join(format!("podio-store-{}-{tag}", std::process::id()));
        fs::create_dir_all(&dir).expect("could not create temp dir");
        let path = dir.join("ranking.json");
        let _ = fs::remove_file(&path);
        Store::new(path)
    }

    async fn points_of(store: &Store, user_id: &str) -> Option<i64> {
        store
            .get_all()
            .await
            .into_iter()
            .find(|(id, _)| id == user_id)
            .map(|(_, rec)| *rec.points())
    }

    #[tokio::test]
    async fn add_points_creates_record_and_applies_delta() {
        let store = temp_store("add-creates");
        let total = store.add_points("X", 30).await.unwrap();
        assert_eq!(total, 30);
        assert_eq!(points_of(&store, "X").await, Some(30));

        let total = store.add_points("X", -50).await.unwrap();
        assert_eq!(total, -20);
    }

    #[tokio::test]
    async fn add_points_sets_creation_timestamp() {
        let store = temp_store("add-created-at");
        store.add_points("X", 1).await.unwrap();
        let (_, record) = store.get_all().await.into_iter().next().unwrap();
        assert!(record.created_at().is_some());
    }

    #[tokio::test]
    async fn oversized_delta_is_rejected_without_mutation() {
        let store = temp_store("delta-bound");
        store.add_points("X", 10).await.unwrap();

        let err = store.add_points("X", MAX_STEP + 1).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidDelta(_)));
        assert_eq!(points_of(&store, "X").await, Some(10));

        let err = store.add_points("X", -(MAX_STEP + 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidDelta(_)));
        assert_eq!(points_of(&store, "X").await, Some(10));
    }

    #[tokio::test]
    async fn totals_clamp_at_max_total() {
        let store = temp_store("clamp");
        store.set_points("X", MAX_TOTAL - 10).await.unwrap();
        let total = store.add_points("X", MAX_STEP).await.unwrap();
        assert_eq!(total, MAX_TOTAL);
    }

    #[tokio::test]
    async fn set_points_is_idempotent() {
        let store = temp_store("set-idempotent");
        store.set_points("X", 42).await.unwrap();
        let first = store.export_json().await;
        store.set_points("X", 42).await.unwrap();
        assert_eq!(points_of(&store, "X").await, Some(42));
        // Same users, same points; only updatedAt may differ.
        let db_a: RankingDb = serde_json::from_str(&first).unwrap();
        let db_b: RankingDb = serde_json::from_str(&store.export_json().await).unwrap();
        assert_eq!(db_a.users().len(), db_b.users().len());
        assert_eq!(
            db_a.users().get("X").map(|r| *r.points()),
            db_b.users().get("X").map(|r| *r.points())
        );
    }

    #[tokio::test]
    async fn set_points_beyond_max_total_fails_and_store_is_unchanged() {
        let store = temp_store("set-bound");
        store.set_points("X", 5).await.unwrap();
        let err = store.set_points("X", 20_000_000).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue(_)));
        assert_eq!(points_of(&store, "X").await, Some(5));
    }

    #[tokio::test]
    async fn empty_user_id_is_rejected() {
        let store = temp_store("missing-id");
        assert!(matches!(
            store.add_points("", 1).await.unwrap_err(),
            StoreError::MissingUserId
        ));
        assert!(matches!(
            store.remove_user("").await.unwrap_err(),
            StoreError::MissingUserId
        ));
    }

    #[tokio::test]
    async fn remove_user_deletes_and_tolerates_absent_users() {
        let store = temp_store("remove");
        store.add_user("X").await.unwrap();
        assert!(store.remove_user("X").await.unwrap());
        assert_eq!(points_of(&store, "X").await, None);
        // Absent user: no-op, not an error.
        assert!(!store.remove_user("X").await.unwrap());
    }

    #[tokio::test]
    async fn add_user_is_a_noop_when_already_ranked() {
        let store = temp_store("add-user");
        assert!(store.add_user("X").await.unwrap());
        store.add_points("X", 7).await.unwrap();
        assert!(!store.add_user("X").await.unwrap());
        assert_eq!(points_of(&store, "X").await, Some(7));
    }

    #[tokio::test]
    async fn reset_zero_keeps_users_reset_wipe_discards_them() {
        let store = temp_store("reset");
        store.add_points("A", 10).await.unwrap();
        store.add_points("B", 20).await.unwrap();

        store.reset_all(ResetMode::Zero).await.unwrap();
        let all = store.get_all().await;
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|(_, rec)| *rec.points() == 0));

        store.reset_all(ResetMode::Wipe).await.unwrap();
        assert!(store.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn export_round_trips_to_an_equivalent_database() {
        let store = temp_store("export");
        store.add_points("A", 50).await.unwrap();
        store.add_points("B", -3).await.unwrap();

        let exported = store.export_json().await;
        let copy = temp_store("export-copy");
        fs::write(&copy.path, &exported).unwrap();

        let mut original = store.get_all().await;
        let mut reread = copy.get_all().await;
        original.sort_by(|a, b| a.0.cmp(&b.0));
        reread.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(original.len(), reread.len());
        for ((id_a, rec_a), (id_b, rec_b)) in original.iter().zip(reread.iter()) {
            assert_eq!(id_a, id_b);
            assert_eq!(rec_a.points(), rec_b.points());
        }
    }

    #[tokio::test]
    async fn corrupt_file_is_recovered_as_empty() {
        let store = temp_store("corrupt");
        fs::write(&store.path, "{ not json !!").unwrap();
        assert!(store.get_all().await.is_empty());
        // Plain reads never touch the file; recreation is the locked paths'
        // job.
        assert_eq!(fs::read_to_string(&store.path).unwrap(), "{ not json !!");

        store.init().await.unwrap();
        let raw = fs::read_to_string(&store.path).unwrap();
        let db: RankingDb = serde_json::from_str(&raw).unwrap();
        assert!(db.users().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_recovery_does_not_clobber_a_mutation() {
        let store = temp_store("corrupt-race");
        store.add_points("X", 5).await.unwrap();
        fs::write(&store.path, "{ not json !!").unwrap();

        // A read of the corrupt file followed by a mutation: the mutation's
        // persist is the only write, and it wins.
        let _ = store.export_json().await;
        store.add_points("Y", 3).await.unwrap();
        assert_eq!(points_of(&store, "Y").await, Some(3));
    }

    #[tokio::test]
    async fn out_of_range_totals_are_clamped_on_read() {
        let store = temp_store("heal");
        fs::write(
            &store.path,
            r#"{ "users": { "X": { "points": 99999999 } }, "updatedAt": 0 }"#,
        )
        .unwrap();
        assert_eq!(points_of(&store, "X").await, Some(MAX_TOTAL));
    }
}
