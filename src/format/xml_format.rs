//! XML documents
//!
//! Config layout:
//!
//! ```xml
//! <Config>
//!   <Field Name="Gold" Type="Int">100</Field>
//!   <Field Name="Scores" Type="Int"><Array><Item>1</Item></Array></Field>
//! </Config>
//! ```
//!
//! The `Type` attribute is optional when reading; without it the type is
//! guessed from the text.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{FormatError, FormatSerializer};
use crate::save::SaveData;
use crate::schema::{FieldDescriptor, SaveSchema};
use crate::value::{
    deduce_array_from_text, deduce_from_text, parse_bool, parse_float, refine_by_key, FieldType, Value,
};

pub struct XmlFormat;

fn xml_error(e: impl std::fmt::Display) -> FormatError {
    FormatError::Xml(e.to_string())
}

// ============================================================================
// Reading
// ============================================================================

/// Minimal element tree
#[derive(Debug, Default)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn from_start(start: &BytesStart) -> Result<Self, FormatError> {
        let mut node = Node {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Default::default()
        };
        for attr in start.attributes() {
            let attr = attr.map_err(xml_error)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_error)?.into_owned();
            node.attributes.push((key, value));
        }
        Ok(node)
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of every `<Item>` child
    fn items(&self) -> Vec<String> {
        self.children_named("Item").map(|i| i.text.clone()).collect()
    }
}

/// Parse a document into its first root element
fn parse_root(text: &str) -> Result<Option<Node>, FormatError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Node> = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => stack.push(Node::from_start(&start)?),
            Event::Empty(start) => {
                let node = Node::from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(Some(node)),
                }
            }
            Event::End(_) => {
                let Some(node) = stack.pop() else {
                    return Err(FormatError::Xml("unexpected closing tag".to_string()));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(Some(node)),
                }
            }
            Event::Text(t) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(c) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.is_empty() {
        Ok(None)
    } else {
        Err(FormatError::Xml("unexpected end of document".to_string()))
    }
}

fn field_value(key: &str, field: &Node) -> Value {
    let declared = field.attr("Type").map(FieldType::parse);
    match (field.child("Array"), declared) {
        (Some(array), Some(t)) => Value::array(t, array.items()),
        (Some(array), None) => refine_by_key(key, deduce_array_from_text(array.items())),
        (None, Some(t)) => Value::scalar(t, field.text.clone()),
        (None, None) => refine_by_key(key, deduce_from_text(&field.text)),
    }
}

fn descriptor_of(field: &Node) -> Option<FieldDescriptor> {
    let name = field.attr("Name").filter(|n| !n.trim().is_empty())?;
    let attr = |key: &str| field.attr(key).unwrap_or_default().to_string();
    Some(FieldDescriptor {
        name: name.to_string(),
        field_type: FieldType::parse(&attr("Type")),
        is_array: parse_bool(&attr("IsArray")),
        default_value: attr("DefaultValue"),
        default_array: field.child("DefaultArray").map(Node::items).unwrap_or_default(),
        enable_validation: parse_bool(&attr("EnableValidation")),
        min_value: parse_float(&attr("MinValue")),
        max_value: parse_float(&attr("MaxValue")),
        regex_pattern: attr("RegexPattern"),
        validation_error_message: attr("ValidationErrorMessage"),
    })
}

// ============================================================================
// Writing
// ============================================================================

type XmlWriter = Writer<Vec<u8>>;

fn start_document(writer: &mut XmlWriter, root: &str) -> Result<(), FormatError> {
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new(root)))
        .map_err(xml_error)?;
    Ok(())
}

fn finish_document(mut writer: XmlWriter, root: &str) -> Result<String, FormatError> {
    writer
        .write_event(Event::End(BytesEnd::new(root)))
        .map_err(xml_error)?;
    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), FormatError> {
    if text.is_empty() {
        return writer.write_event(Event::Empty(BytesStart::new(name))).map_err(xml_error);
    }
    writer.write_event(Event::Start(BytesStart::new(name))).map_err(xml_error)?;
    writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_error)?;
    writer.write_event(Event::End(BytesEnd::new(name))).map_err(xml_error)
}

/// Write `<{wrapper}><Item>..</Item>...</{wrapper}>`
fn write_items(writer: &mut XmlWriter, wrapper: &str, items: &[String]) -> Result<(), FormatError> {
    writer.write_event(Event::Start(BytesStart::new(wrapper))).map_err(xml_error)?;
    for item in items {
        write_text_element(writer, "Item", item)?;
    }
    writer.write_event(Event::End(BytesEnd::new(wrapper))).map_err(xml_error)
}

impl FormatSerializer for XmlFormat {
    fn load_config(&self, text: &str) -> Result<SaveData, FormatError> {
        let root = parse_root(text)?
            .filter(|r| r.name == "Config")
            .ok_or(FormatError::XmlRootMissing("Config"))?;

        let mut data = SaveData::new();
        for field in root.children_named("Field") {
            let Some(key) = field.attr("Name").filter(|k| !k.is_empty()) else {
                log::debug!("Skipping XML field without a name");
                continue;
            };
            data.insert(key.to_string(), field_value(key, field));
        }
        Ok(data)
    }

    fn save_config(&self, data: &SaveData) -> Result<String, FormatError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        start_document(&mut writer, "Config")?;

        for (key, value) in data.iter() {
            let mut field = BytesStart::new("Field");
            field.push_attribute(("Name", key.as_str()));
            field.push_attribute(("Type", value.field_type.name()));

            match value.as_array() {
                Some(items) => {
                    writer.write_event(Event::Start(field)).map_err(xml_error)?;
                    write_items(&mut writer, "Array", items)?;
                    writer.write_event(Event::End(BytesEnd::new("Field"))).map_err(xml_error)?;
                }
                None => {
                    let text = value.as_scalar().unwrap_or_default();
                    if text.is_empty() {
                        writer.write_event(Event::Empty(field)).map_err(xml_error)?;
                    } else {
                        writer.write_event(Event::Start(field)).map_err(xml_error)?;
                        writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_error)?;
                        writer.write_event(Event::End(BytesEnd::new("Field"))).map_err(xml_error)?;
                    }
                }
            }
        }

        finish_document(writer, "Config")
    }

    /// A document without a `Schema` root is an empty schema
    fn load_schema(&self, text: &str) -> Result<SaveSchema, FormatError> {
        let Some(root) = parse_root(text)?.filter(|r| r.name == "Schema") else {
            log::warn!("XML schema has no 'Schema' root, using an empty schema");
            return Ok(SaveSchema::new());
        };

        let schema: SaveSchema = root
            .child("Fields")
            .map(|fields| fields.children_named("Field").filter_map(descriptor_of).collect())
            .unwrap_or_default();
        Ok(schema)
    }

    fn save_schema(&self, schema: &SaveSchema) -> Result<String, FormatError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        start_document(&mut writer, "Schema")?;
        writer.write_event(Event::Start(BytesStart::new("Fields"))).map_err(xml_error)?;

        for descriptor in schema.iter() {
            let min = descriptor.min_value.to_string();
            let max = descriptor.max_value.to_string();

            let mut field = BytesStart::new("Field");
            field.push_attribute(("Name", descriptor.name.as_str()));
            field.push_attribute(("Type", descriptor.field_type.name()));
            field.push_attribute(("IsArray", if descriptor.is_array { "true" } else { "false" }));
            field.push_attribute(("DefaultValue", descriptor.default_value.as_str()));
            if descriptor.enable_validation || descriptor.has_rules() {
                field.push_attribute(("EnableValidation", if descriptor.enable_validation { "true" } else { "false" }));
                field.push_attribute(("MinValue", min.as_str()));
                field.push_attribute(("MaxValue", max.as_str()));
                field.push_attribute(("RegexPattern", descriptor.regex_pattern.as_str()));
                field.push_attribute(("ValidationErrorMessage", descriptor.validation_error_message.as_str()));
            }

            if descriptor.default_array.is_empty() {
                writer.write_event(Event::Empty(field)).map_err(xml_error)?;
            } else {
                writer.write_event(Event::Start(field)).map_err(xml_error)?;
                write_items(&mut writer, "DefaultArray", &descriptor.default_array)?;
                writer.write_event(Event::End(BytesEnd::new("Field"))).map_err(xml_error)?;
            }
        }

        writer.write_event(Event::End(BytesEnd::new("Fields"))).map_err(xml_error)?;
        finish_document(writer, "Schema")
    }
}
