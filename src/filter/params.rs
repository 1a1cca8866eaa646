/// Query-string parameters of a listing request, in arrival order.
///
/// Repeated keys resolve to their last occurrence, so `?sort=a&sort=b` sorts by `b`.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Keys consumed by the pipeline itself; never treated as filters.
    pub const RESERVED: [&'static str; 4] = ["page", "sort", "limit", "fields"];

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn is_reserved(key: &str) -> bool {
        Self::RESERVED.contains(&key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Non-reserved pairs, first-seen key order, last value per key.
    pub fn filter_pairs(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = Vec::new();
        for (key, value) in &self.pairs {
            if Self::is_reserved(key) {
                continue;
            }
            match out.iter_mut().find(|(k, _)| *k == key.as_str()) {
                Some(slot) => slot.1 = value.as_str(),
                None => out.push((key.as_str(), value.as_str())),
            }
        }
        out
    }

    /// Positive integer value of `key` that fits a signed 64-bit column.
    /// Anything else counts as absent.
    pub fn positive(&self, key: &str) -> Option<u64> {
        self.get(key)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|n| *n > 0)
            .map(|n| n as u64)
    }

    /// Sort label reported back in listing metadata.
    pub fn sort_label(&self) -> String {
        self.get("sort")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(super::features::DEFAULT_SORT_FIELD)
            .to_string()
    }
}
