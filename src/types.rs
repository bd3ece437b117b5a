//! Group and subscription records shared by the sync and serving sides

/// Backend type tag stored with subscriptions
pub const NNTP_TYPE: &str = "nntp";

/// A newsgroup known to this relay
///
/// Identity is `(name, source)`, where `source` names the upstream backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub description: String,
    pub source: String,
    pub low: i64,
    pub high: i64,
}

impl Group {
    /// Article count as `high - low`; not normalized, may be zero or negative
    pub fn count(&self) -> i64 {
        self.high - self.low
    }

    /// Name as exposed downstream: `<source>.<name>`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.source, self.name)
    }
}

/// An upstream catalog entry; gates which groups are materialized locally
///
/// Identity is `(name, type, source)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub name: String,
    pub description: String,
    pub high: i64,
    pub low: i64,
    pub kind: String,
    pub source: String,
}

impl From<&Subscription> for Group {
    fn from(sub: &Subscription) -> Self {
        Group {
            name: sub.name.clone(),
            description: sub.description.clone(),
            source: sub.source.clone(),
            low: sub.low,
            high: sub.high,
        }
    }
}
