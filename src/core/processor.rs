use crate::config::PipelineSettings;
use crate::domain::model::Record;
use crate::utils::helpers::deep_merge;
use crate::utils::validation::sanitize_string;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

type Step = Box<dyn Fn(Vec<Record>) -> Vec<Record> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
}

/// An ordered chain of record transformations.
///
/// ```
/// use sample_app::core::processor::DataProcessor;
///
/// let processor = DataProcessor::new()
///     .add_step("drop_missing", |r| DataProcessor::drop_missing(r, &["name"]))
///     .add_step("normalize", |r| DataProcessor::normalize_strings(r, &["name"]));
/// assert_eq!(processor.step_names(), vec!["drop_missing", "normalize"]);
/// ```
#[derive(Default)]
pub struct DataProcessor {
    steps: Vec<(String, Step)>,
}

impl DataProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the cleaning chain described by `[pipeline]` settings. Empty field lists add no step.
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        let mut processor = Self::new();

        if !settings.required_fields.is_empty() {
            let fields = settings.required_fields.clone();
            processor =
                processor.add_step("drop_missing", move |r| Self::drop_missing(r, &fields));
        }
        if !settings.normalize_fields.is_empty() {
            let fields = settings.normalize_fields.clone();
            processor = processor
                .add_step("normalize_strings", move |r| Self::normalize_strings(r, &fields));
        }
        if !settings.numeric_fields.is_empty() {
            let fields = settings.numeric_fields.clone();
            processor =
                processor.add_step("cast_numeric", move |r| Self::cast_numeric(r, &fields));
        }

        processor
    }

    pub fn add_step<F>(mut self, name: &str, step: F) -> Self
    where
        F: Fn(Vec<Record>) -> Vec<Record> + Send + Sync + 'static,
    {
        self.steps.push((name.to_string(), Box::new(step)));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn run(&self, data: Vec<Record>) -> Vec<Record> {
        let mut result = data;
        for (name, step) in &self.steps {
            result = step(result);
            tracing::debug!("After step '{}': {} records", name, result.len());
        }
        result
    }

    /// Drops records where any required key is absent, null, an empty string or an empty array.
    pub fn drop_missing<S: AsRef<str>>(records: Vec<Record>, required_keys: &[S]) -> Vec<Record> {
        let total = records.len();
        let cleaned: Vec<Record> = records
            .into_iter()
            .filter(|r| {
                required_keys.iter().all(|k| match r.get(k.as_ref()) {
                    None | Some(Value::Null) => false,
                    Some(Value::String(s)) => !s.is_empty(),
                    Some(Value::Array(a)) => !a.is_empty(),
                    Some(_) => true,
                })
            })
            .collect();

        tracing::info!("drop_missing: kept {}/{} records", cleaned.len(), total);
        cleaned
    }

    /// Trims and lower-cases the given string fields; other value types are left alone.
    pub fn normalize_strings<S: AsRef<str>>(mut records: Vec<Record>, fields: &[S]) -> Vec<Record> {
        for record in &mut records {
            for field in fields {
                if let Some(Value::String(s)) = record.data.get_mut(field.as_ref()) {
                    *s = sanitize_string(s, None).to_lowercase();
                }
            }
        }
        records
    }

    /// Converts the given fields to floats. Records with a missing or unparsable field are
    /// dropped.
    pub fn cast_numeric<S: AsRef<str>>(records: Vec<Record>, fields: &[S]) -> Vec<Record> {
        let mut result = Vec::with_capacity(records.len());

        'records: for mut record in records {
            for field in fields {
                let field = field.as_ref();
                let parsed = match record.data.get(field) {
                    Some(Value::Number(n)) => n.as_f64(),
                    Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };

                match parsed.filter(|v| v.is_finite()) {
                    Some(v) => {
                        record.data.insert(field.to_string(), Value::from(v));
                    }
                    None => {
                        tracing::warn!(
                            "Skipping record due to cast failure on '{}': {:?}",
                            field,
                            record.data
                        );
                        continue 'records;
                    }
                }
            }
            result.push(record);
        }

        result
    }

    /// `None` when no record carries a numeric value for `numeric_field`.
    pub fn compute_stats(records: &[Record], numeric_field: &str) -> Option<FieldStats> {
        let mut values: Vec<f64> = records
            .iter()
            .filter_map(|r| r.get_f64(numeric_field))
            .collect();
        if values.is_empty() {
            return None;
        }

        values.sort_by(f64::total_cmp);
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 1 {
            values[count / 2]
        } else {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        };
        let stdev = if count > 1 {
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Some(FieldStats {
            count,
            mean,
            median,
            stdev,
            min: values[0],
            max: values[count - 1],
        })
    }

    /// Groups by the value of `key`. Missing or null values land under `"unknown"`.
    pub fn group_by<'a>(records: &'a [Record], key: &str) -> BTreeMap<String, Vec<&'a Record>> {
        let mut groups: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
        for record in records {
            let group_key = match record.get(key) {
                None | Some(Value::Null) => "unknown".to_string(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            groups.entry(group_key).or_default().push(record);
        }
        groups
    }

    /// Fills in missing keys from `defaults`; values already on the record win.
    pub fn merge_defaults(records: Vec<Record>, defaults: &Value) -> Vec<Record> {
        records
            .into_iter()
            .map(|record| {
                let current = Value::Object(record.data.into_iter().collect());
                match deep_merge(defaults, &current) {
                    Value::Object(map) => Record::from(map),
                    _ => Record::default(),
                }
            })
            .collect()
    }
}
