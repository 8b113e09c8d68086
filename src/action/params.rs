// Parameter map
// Flattened name -> value view of the request parameter list

use std::collections::HashMap;

use super::types::Parameter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    values: HashMap<String, String>,
}

impl ParameterMap {
    /// Build the map in one pass; a repeated name keeps its last value
    pub fn from_parameters(parameters: &[Parameter]) -> Self {
        let mut values = HashMap::with_capacity(parameters.len());
        for param in parameters {
            values.insert(param.name.clone(), param.value.clone());
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value for `name`, or the empty string when absent
    pub fn get_or_default(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
