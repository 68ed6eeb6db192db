use agora_types::BlockNumber;

/// Block-indexed value history. A write in the same block as the last entry
/// overwrites it.
#[derive(Clone, Debug, Default)]
pub(crate) struct History {
    entries: Vec<(BlockNumber, u128)>,
}

impl History {
    pub(crate) fn latest(&self) -> u128 {
        self.entries.last().map(|&(_, v)| v).unwrap_or(0)
    }

    pub(crate) fn at(&self, block: BlockNumber) -> u128 {
        let idx = self.entries.partition_point(|&(b, _)| b <= block);
        if idx == 0 {
            0
        } else {
            self.entries[idx - 1].1
        }
    }

    pub(crate) fn set(&mut self, block: BlockNumber, value: u128) {
        match self.entries.last_mut() {
            Some(last) if last.0 >= block => last.1 = value,
            _ => self.entries.push((block, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_overwrite() {
        let mut h = History::default();
        assert_eq!(h.at(10), 0);
        h.set(5, 100);
        h.set(5, 120);
        h.set(9, 50);
        assert_eq!(h.at(4), 0);
        assert_eq!(h.at(5), 120);
        assert_eq!(h.at(8), 120);
        assert_eq!(h.at(9), 50);
        assert_eq!(h.latest(), 50);
    }
}
