// Builder Patterns
// Fluent construction of records from interactive or parsed input, with
// validation at the build step.

use anyhow::{ensure, Result};

use crate::contracts::Record;

/// Fluent builder for creating Records.
pub struct RecordBuilder {
    name: Option<String>,
    category: Option<String>,
    locations: Vec<String>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            category: None,
            locations: Vec::new(),
        }
    }

    /// Set the display name the key will be derived from.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the category. Defaults to empty when not provided.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Add a single location.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.locations.push(location.into());
        self
    }

    /// Add several locations at once.
    pub fn locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations.extend(locations.into_iter().map(Into::into));
        self
    }

    /// Build the record, deriving its key from the name.
    ///
    /// A blank name is rejected here, but only here: `Record::new` and the
    /// file loader (`catalog_store::decode_line`) accept empty names, so a
    /// data file written elsewhere always loads back even when its records
    /// could not have been entered through this builder.
    pub fn build(self) -> Result<Record> {
        let name = self
            .name
            .ok_or_else(|| anyhow::anyhow!("Record name is required"))?;
        ensure!(!name.trim().is_empty(), "Record name cannot be blank");

        Ok(Record::new(
            name,
            self.category.unwrap_or_default(),
            self.locations,
        ))
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
