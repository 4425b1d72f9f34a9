// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Relational closure over raw, typed records.
//!
//! Given a seed predicate over one record type, the [`ClosureFilter`] finds
//! every record related to the seeds through the ids the records reference,
//! without building a [`NetworkGraph`][crate::NetworkGraph].  The resulting id
//! set can then be used to keep or drop whole records of a data set.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::Value;
use uuid::Uuid;

use crate::Error;

/// A record that can take part in a relational closure.
///
/// Sample implementation:
///
/// ```rust
/// use dso_network_topology::ClosureRecord;
/// use uuid::Uuid;
///
/// struct Row {
///     id: Uuid,
///     class: String,
///     links: Vec<Uuid>,
/// }
///
/// impl ClosureRecord for Row {
///     fn record_id(&self) -> Uuid {
///         self.id
///     }
///     fn type_name(&self) -> &str {
///         &self.class
///     }
///     fn referenced_ids(&self) -> Vec<Uuid> {
///         self.links.clone()
///     }
/// }
/// ```
pub trait ClosureRecord {
    /// The id of the record.
    fn record_id(&self) -> Uuid;

    /// The declared type of the record, e.g. `"Terminal"`.
    fn type_name(&self) -> &str;

    /// Every id the record references, anywhere in its fields.
    fn referenced_ids(&self) -> Vec<Uuid>;
}

/// Configuration options for the [`ClosureFilter`].
#[derive(Clone, Debug)]
pub struct ClosureFilterConfig {
    /// The record type the seed predicate applies to.
    pub seed_type: String,

    /// Record types that are scanned only until they first contribute to the
    /// result.  Their records reference almost every equipment, so scanning
    /// them again would pull in the whole network.
    pub hub_types: Vec<String>,
}

impl ClosureFilterConfig {
    /// Creates a configuration for the given seed type, with `Terminal` as the
    /// only hub type.
    pub fn new(seed_type: impl Into<String>) -> Self {
        Self {
            seed_type: seed_type.into(),
            hub_types: vec![String::from("Terminal")],
        }
    }
}

/// The ids included by a [`ClosureFilter`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClosureResult {
    pub included: BTreeSet<Uuid>,
    /// The size of `included` after seeding, and after every fixed-point
    /// pass.
    pub pass_sizes: Vec<usize>,
}

impl ClosureResult {
    /// Returns true if the record with the given id should be kept.
    pub fn contains(&self, id: Uuid) -> bool {
        self.included.contains(&id)
    }
}

struct IndexedRecord {
    id: Uuid,
    references: HashSet<Uuid>,
}

/// Computes the records related to a set of seed records.
pub struct ClosureFilter {
    config: ClosureFilterConfig,
}

impl ClosureFilter {
    pub fn new(config: ClosureFilterConfig) -> Self {
        Self { config }
    }

    /// Returns the ids of the seed records, i.e. the records of the seed type
    /// matching `seed`, and of every record related to them.
    ///
    /// A record is related when its id is referenced by a related record, or
    /// when it references a related id.  Hub types stop being scanned after
    /// the pass in which they first contribute.
    pub fn closure<R, I, P>(&self, records: I, mut seed: P) -> Result<ClosureResult, Error>
    where
        R: ClosureRecord,
        I: IntoIterator<Item = R>,
        P: FnMut(&R) -> bool,
    {
        if self.config.seed_type.is_empty() {
            return Err(Error::invalid_argument("Closure seed type must not be empty."));
        }

        let mut result = ClosureResult::default();
        let mut related: HashSet<Uuid> = HashSet::new();
        let mut index: BTreeMap<String, Vec<IndexedRecord>> = BTreeMap::new();

        for record in records {
            let id = record.record_id();
            if record.type_name() == self.config.seed_type && seed(&record) {
                result.included.insert(id);
                related.insert(id);
                related.extend(record.referenced_ids());
                continue;
            }
            index
                .entry(record.type_name().to_string())
                .or_default()
                .push(IndexedRecord {
                    id,
                    references: record.referenced_ids().into_iter().collect(),
                });
        }
        result.pass_sizes.push(result.included.len());
        tracing::debug!(
            "Closure seeded with {} records, {} types indexed.",
            result.included.len(),
            index.len()
        );

        let mut unresolved: Vec<String> = index.keys().cloned().collect();
        loop {
            let before = result.included.len();
            let mut frozen = vec![];

            for type_name in &unresolved {
                let Some(records) = index.get(type_name) else {
                    continue;
                };
                let mut contributed = false;
                for record in records {
                    if result.included.contains(&record.id) {
                        continue;
                    }
                    if related.contains(&record.id) || !record.references.is_disjoint(&related) {
                        result.included.insert(record.id);
                        related.insert(record.id);
                        related.extend(record.references.iter().copied());
                        contributed = true;
                    }
                }
                if contributed && self.config.hub_types.contains(type_name) {
                    tracing::debug!("Hub type {} contributed, not scanning it again.", type_name);
                    frozen.push(type_name.clone());
                }
            }

            unresolved.retain(|t| {
                !frozen.contains(t)
                    && index
                        .get(t)
                        .is_some_and(|r| r.iter().any(|r| !result.included.contains(&r.id)))
            });
            result.pass_sizes.push(result.included.len());

            if result.included.len() == before {
                break;
            }
        }

        tracing::info!(
            "Closure included {} records after {} passes.",
            result.included.len(),
            result.pass_sizes.len() - 1
        );
        Ok(result)
    }
}

/// A record read from one line of JSON.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonRecord {
    mrid: Uuid,
    type_name: String,
    references: Vec<Uuid>,
    value: Value,
}

impl JsonRecord {
    /// Parses one JSON object carrying a `$type` discriminator and an `mRID`.
    /// Every other string holding a UUID, at any depth, is a reference.
    pub fn parse(line: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| Error::invalid_record(format!("Invalid JSON record: {e}")))?;
        let Value::Object(fields) = &value else {
            return Err(Error::invalid_record(format!(
                "Expected a JSON object, found: {line}"
            )));
        };

        let type_name = match fields.get("$type") {
            Some(Value::String(t)) => t.clone(),
            _ => {
                return Err(Error::invalid_record(format!(
                    "Record has no $type discriminator: {line}"
                )))
            }
        };
        let mrid = match fields.get("mRID") {
            Some(Value::String(id)) => Uuid::parse_str(id).map_err(|e| {
                Error::invalid_record(format!("Record has an invalid mRID {id}: {e}"))
            })?,
            _ => {
                return Err(Error::invalid_record(format!(
                    "Record of type {type_name} has no mRID."
                )))
            }
        };

        let mut references = BTreeSet::new();
        for (key, field) in fields {
            if key != "mRID" {
                collect_uuids(field, &mut references);
            }
        }
        references.remove(&mrid);

        Ok(Self {
            mrid,
            type_name,
            references: references.into_iter().collect(),
            value,
        })
    }

    /// Parses every non-blank line of the given text.
    pub fn parse_lines(text: &str) -> Result<Vec<Self>, Error> {
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    /// Returns the parsed JSON value of the record.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

fn collect_uuids(value: &Value, into: &mut BTreeSet<Uuid>) {
    match value {
        Value::String(s) => {
            if let Ok(id) = Uuid::parse_str(s) {
                into.insert(id);
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_uuids(v, into)),
        Value::Object(fields) => fields.values().for_each(|v| collect_uuids(v, into)),
        _ => {}
    }
}

impl ClosureRecord for JsonRecord {
    fn record_id(&self) -> Uuid {
        self.mrid
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn referenced_ids(&self) -> Vec<Uuid> {
        self.references.clone()
    }
}

impl<T: ClosureRecord> ClosureRecord for &T {
    fn record_id(&self) -> Uuid {
        (**self).record_id()
    }

    fn type_name(&self) -> &str {
        (**self).type_name()
    }

    fn referenced_ids(&self) -> Vec<Uuid> {
        (**self).referenced_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        id: Uuid,
        class: &'static str,
        links: Vec<Uuid>,
    }

    impl ClosureRecord for Row {
        fn record_id(&self) -> Uuid {
            self.id
        }
        fn type_name(&self) -> &str {
            self.class
        }
        fn referenced_ids(&self) -> Vec<Uuid> {
            self.links.clone()
        }
    }

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn row(n: u128, class: &'static str, links: &[u128]) -> Row {
        Row {
            id: id(n),
            class,
            links: links.iter().map(|l| id(*l)).collect(),
        }
    }

    /// Two cables, each with two terminals on its own connectivity node, and
    /// a container holding the first cable.
    fn records() -> Vec<Row> {
        vec![
            row(1, "ACLineSegment", &[10]),
            row(2, "ACLineSegment", &[]),
            row(10, "Substation", &[]),
            row(21, "Terminal", &[1, 31]),
            row(22, "Terminal", &[2, 32]),
            row(31, "ConnectivityNode", &[]),
            row(32, "ConnectivityNode", &[]),
            row(40, "Unrelated", &[99]),
        ]
    }

    fn filter() -> ClosureFilter {
        ClosureFilter::new(ClosureFilterConfig::new("ACLineSegment"))
    }

    #[test]
    fn test_closure_follows_references_both_ways() -> Result<(), Error> {
        let result = filter().closure(records(), |r| r.id == id(1))?;
        assert_eq!(
            result.included,
            BTreeSet::from([id(1), id(10), id(21), id(31)])
        );
        assert!(!result.contains(id(2)));
        assert!(!result.contains(id(40)));

        Ok(())
    }

    #[test]
    fn test_closure_is_monotonic_and_terminates() -> Result<(), Error> {
        let records = records();
        let types = records
            .iter()
            .map(|r| r.class)
            .collect::<BTreeSet<_>>()
            .len();
        let result = filter().closure(&records, |_| true)?;

        assert!(result.pass_sizes.windows(2).all(|w| w[0] <= w[1]));
        assert!(result.pass_sizes.len() <= types + 1);
        assert_eq!(result.pass_sizes.last(), Some(&result.included.len()));
        assert_eq!(result.included.len(), 7);

        Ok(())
    }

    #[test]
    fn test_hub_type_is_frozen_after_contributing() -> Result<(), Error> {
        // The second terminal only becomes related in the second pass,
        // through the switch.
        let records = vec![
            row(1, "ACLineSegment", &[]),
            row(21, "Terminal", &[1, 31]),
            row(22, "Terminal", &[2, 32]),
            row(31, "ConnectivityNode", &[]),
            row(2, "Switch", &[31, 32]),
        ];

        let result = filter().closure(&records, |_| true)?;
        assert!(result.contains(id(2)));
        assert!(!result.contains(id(22)));

        let unfrozen = ClosureFilter::new(ClosureFilterConfig {
            seed_type: String::from("ACLineSegment"),
            hub_types: vec![],
        });
        let result = unfrozen.closure(&records, |_| true)?;
        assert!(result.contains(id(22)));

        Ok(())
    }

    #[test]
    fn test_reverse_chain_needs_one_pass_per_link() -> Result<(), Error> {
        // Each link only relates to the one declared after it, so every pass
        // resolves a single link, and the pass count exceeds the number of
        // indexed types.
        let records = vec![
            row(1, "ACLineSegment", &[]),
            row(13, "Link", &[12]),
            row(12, "Link", &[11]),
            row(11, "Link", &[1]),
        ];

        let result = filter().closure(&records, |_| true)?;
        assert_eq!(result.pass_sizes, vec![1, 2, 3, 4, 4]);
        assert_eq!(result.included.len(), 4);

        Ok(())
    }

    #[test]
    fn test_empty_seed_type() {
        let filter = ClosureFilter::new(ClosureFilterConfig::new(""));
        assert_eq!(
            filter.closure(records(), |_| true).map(|r| r.included.len()),
            Err(Error::invalid_argument("Closure seed type must not be empty."))
        );
    }

    #[test]
    fn test_json_record_parse() -> Result<(), Error> {
        let line = format!(
            r#"{{"$type":"Terminal","mRID":"{}","Name":"T1","ConductingEquipment":{{"@ref":"{}"}},"Extra":["{}","not-a-uuid"],"SequenceNumber":1}}"#,
            id(21),
            id(1),
            id(31)
        );
        let record = JsonRecord::parse(&line)?;
        assert_eq!(record.record_id(), id(21));
        assert_eq!(record.type_name(), "Terminal");
        assert_eq!(record.referenced_ids(), vec![id(1), id(31)]);
        assert_eq!(record.value()["Name"], "T1");

        Ok(())
    }

    #[test]
    fn test_json_record_errors() {
        for line in [
            "not json",
            "[1, 2]",
            r#"{"mRID":"00000000-0000-0000-0000-000000000001"}"#,
            r#"{"$type":"Terminal","mRID":"nope"}"#,
            r#"{"$type":"Terminal"}"#,
        ] {
            let err = JsonRecord::parse(line).map(|_| ()).unwrap_err();
            assert_eq!(err.kind_name(), "InvalidRecord", "{line}");
        }
    }

    #[test]
    fn test_json_closure() -> Result<(), Error> {
        let text = format!(
            "{}\n\n{}\n{}\n",
            format!(r#"{{"$type":"ACLineSegment","mRID":"{}"}}"#, id(1)),
            format!(
                r#"{{"$type":"Terminal","mRID":"{}","ConductingEquipment":"{}"}}"#,
                id(21),
                id(1)
            ),
            format!(r#"{{"$type":"Fuse","mRID":"{}"}}"#, id(5)),
        );
        let records = JsonRecord::parse_lines(&text)?;
        assert_eq!(records.len(), 3);

        let result = filter().closure(&records, |_| true)?;
        assert_eq!(result.included, BTreeSet::from([id(1), id(21)]));

        Ok(())
    }
}
