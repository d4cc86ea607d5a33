//! RON documents
//!
//! Writes the in-memory model as-is, so nothing is guessed on load.

use super::{FormatError, FormatSerializer};
use crate::save::SaveData;
use crate::schema::SaveSchema;

pub struct RonFormat;

impl FormatSerializer for RonFormat {
    fn load_config(&self, text: &str) -> Result<SaveData, FormatError> {
        Ok(ron::from_str(text)?)
    }

    fn save_config(&self, data: &SaveData) -> Result<String, FormatError> {
        Ok(ron::ser::to_string_pretty(data, ron::ser::PrettyConfig::default())?)
    }

    fn load_schema(&self, text: &str) -> Result<SaveSchema, FormatError> {
        Ok(ron::from_str(text)?)
    }

    fn save_schema(&self, schema: &SaveSchema) -> Result<String, FormatError> {
        Ok(ron::ser::to_string_pretty(schema, ron::ser::PrettyConfig::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FieldType, Value};

    #[test]
    fn test_keeps_untyped_empty_arrays() {
        let mut data = SaveData::new();
        data.insert("Pending", Value::array(FieldType::None, Vec::new()));
        data.set_string("Count", "12");

        let text = RonFormat.save_config(&data).unwrap();
        let back = RonFormat.load_config(&text).unwrap();
        // no guessing: the string stays a string
        assert_eq!(back.get_string("Count", ""), "12");
        assert_eq!(back, data);
    }
}
