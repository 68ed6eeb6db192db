//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::governance::LmdbGovernanceStore;
use crate::meta::LmdbMetaStore;
use crate::migration::Migrator;
use crate::LmdbError;

/// Names of every database the governance schema uses.
pub(crate) const DATABASE_NAMES: &[&str] = &["proposals", "deposits", "receipts", "meta"];

/// Default map size: 256 MiB.
pub const DEFAULT_MAP_SIZE: usize = 256 * 1024 * 1024;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    proposals_db: Database<Bytes, Bytes>,
    deposits_db: Database<Bytes, Bytes>,
    receipts_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path and bring its
    /// schema up to date.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        let mut options = EnvOpenOptions::new();
        options.map_size(map_size).max_dbs(DATABASE_NAMES.len() as u32);
        // SAFETY: the environment is opened once per path by this process and
        // never by a second `Env` in the same process.
        let env = unsafe { options.open(path)? };

        let mut wtxn = env.write_txn()?;
        let proposals_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("proposals"))?;
        let deposits_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("deposits"))?;
        let receipts_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("receipts"))?;
        let meta_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        let environment = Self {
            env: Arc::new(env),
            proposals_db,
            deposits_db,
            receipts_db,
            meta_db,
        };

        Migrator::run(&environment.meta_store())?;
        tracing::info!(path = %path.display(), "opened LMDB environment");
        Ok(environment)
    }

    pub fn governance_store(&self) -> LmdbGovernanceStore {
        LmdbGovernanceStore {
            env: Arc::clone(&self.env),
            proposals_db: self.proposals_db,
            deposits_db: self.deposits_db,
            receipts_db: self.receipts_db,
            meta_db: self.meta_db,
        }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
        }
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::MetaStore;

    #[test]
    fn open_creates_directory_and_sets_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db");
        let env = LmdbEnvironment::open(&path, 1 << 20).unwrap();
        assert!(path.exists());
        assert_eq!(
            env.meta_store().get_schema_version().unwrap(),
            agora_store::CURRENT_SCHEMA_VERSION
        );
    }
}
