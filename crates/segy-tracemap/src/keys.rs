//! Key list validation and value binding

use crate::error::{Result, TraceMapError};
use segy_format::FieldInfo;
use segy_format::fields::trace_field;

/// Reserved trailing key selecting one record of a concatenated gather by
/// position
pub const SEQUENCE_NUMBER: &str = "sequence_number";

/// Validated key list of a trace map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    names: Vec<String>,
    fields: Vec<FieldInfo>,
    ordinal: bool,
}

impl KeySpec {
    /// Validate a key list.
    ///
    /// Keys must be non-empty and unique, every key must be a trace header
    /// field, and [`SEQUENCE_NUMBER`] is accepted only as the last key after
    /// at least one stored key.
    pub fn new<S: AsRef<str>>(keys: &[S]) -> Result<Self> {
        let mut names: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
        if names.is_empty() {
            return Err(TraceMapError::InvalidConfig(
                "at least one key is required".to_string(),
            ));
        }

        let ordinal = names.last().is_some_and(|k| k == SEQUENCE_NUMBER);
        if ordinal {
            names.pop();
        }
        if names.is_empty() {
            return Err(TraceMapError::InvalidConfig(format!(
                "{SEQUENCE_NUMBER} needs at least one header key before it"
            )));
        }

        let mut fields = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name == SEQUENCE_NUMBER {
                return Err(TraceMapError::InvalidConfig(format!(
                    "{SEQUENCE_NUMBER} is only allowed as the last key"
                )));
            }
            if names[..i].contains(name) {
                return Err(TraceMapError::InvalidConfig(format!(
                    "duplicate key: {name}"
                )));
            }
            let field =
                trace_field(name).map_err(|_| TraceMapError::UnknownKey(name.clone()))?;
            fields.push(field);
        }

        Ok(Self {
            names,
            fields,
            ordinal,
        })
    }

    /// Stored key names, in column order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Header fields of the stored keys
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Whether a trailing [`SEQUENCE_NUMBER`] key was configured
    pub fn has_ordinal(&self) -> bool {
        self.ordinal
    }

    /// Number of values a query may carry
    pub fn arity(&self) -> usize {
        self.names.len() + usize::from(self.ordinal)
    }

    /// Position of a stored key column
    pub fn column(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|k| k == name)
            .ok_or_else(|| TraceMapError::UnknownKey(name.to_string()))
    }

    /// Split query values into stored key bindings and the ordinal
    pub(crate) fn bind<'a>(
        &'a self,
        values: &[Option<i32>],
    ) -> Result<(Vec<(&'a str, i32)>, Option<i32>)> {
        if values.len() > self.arity() {
            return Err(TraceMapError::KeyArity {
                expected: self.arity(),
                actual: values.len(),
            });
        }

        let bound = self
            .names
            .iter()
            .zip(values)
            .filter_map(|(name, value)| value.map(|v| (name.as_str(), v)))
            .collect();

        let ordinal = if self.ordinal {
            values.get(self.names.len()).copied().flatten()
        } else {
            None
        };

        Ok((bound, ordinal))
    }
}
