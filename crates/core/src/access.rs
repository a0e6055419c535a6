use std::collections::HashSet;

/// The set of ids allowed to talk to the relay. An empty allowlist lets
/// everyone in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Allowlist {
    ids: HashSet<i64>,
}

impl Allowlist {
    /// Returns `true` if the allowlist admits everyone.
    #[inline]
    pub fn is_public(&self) -> bool {
        self.ids.is_empty()
    }

    /// Checks whether a caller in a conversation may use the relay. Either
    /// the caller or the whole conversation may be listed.
    pub fn permits(&self, conversation_id: i64, caller_id: i64) -> bool {
        self.is_public()
            || self.ids.contains(&caller_id)
            || self.ids.contains(&conversation_id)
    }
}

impl FromIterator<i64> for Allowlist {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public() {
        let allowlist = Allowlist::default();
        assert!(allowlist.is_public());
        assert!(allowlist.permits(1, 2));
    }

    #[test]
    fn test_restricted() {
        let allowlist: Allowlist = [42, -100200].into_iter().collect();
        assert!(!allowlist.is_public());
        assert!(allowlist.permits(7, 42));
        assert!(allowlist.permits(-100200, 7));
        assert!(!allowlist.permits(7, 7));
    }
}
