//! Nullable level oracle.

use agora_interfaces::LevelOracle;
use agora_types::Address;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct NullLevelOracle {
    levels: Mutex<HashMap<Address, u8>>,
    max_level: u8,
}

impl NullLevelOracle {
    pub fn new(max_level: u8) -> Self {
        Self {
            levels: Mutex::new(HashMap::new()),
            max_level,
        }
    }

    pub fn set_level(&self, account: Address, level: u8) {
        self.levels.lock().unwrap().insert(account, level);
    }
}

impl Default for NullLevelOracle {
    fn default() -> Self {
        Self::new(10)
    }
}

impl LevelOracle for NullLevelOracle {
    fn level_of(&self, account: &Address) -> u8 {
        self.levels.lock().unwrap().get(account).copied().unwrap_or(0)
    }

    fn max_level(&self) -> u8 {
        self.max_level
    }
}
