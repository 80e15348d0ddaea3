//! Compiling JSON Schema documents into [`JsonSchema`] trees.
//!
//! Supports the draft-3/draft-4 keyword set the engine models. `$ref`
//! pointers are resolved locally: `#` fragments against the document that
//! contains them, anything else as a file path relative to that document's
//! directory. Reference cycles are rejected because the compiled tree owns
//! its children.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fancy_regex::Regex;
use serde_json::{Map, Number, Value};

use crate::array::ArraySchema;
use crate::error::{ConfigError, LoadError};
use crate::format::FormatRegistry;
use crate::loader::{load_json, navigate_fragment};
use crate::object::{AdditionalProperties, ObjectSchema};
use crate::schema::JsonSchema;
use crate::simple::SimpleTypeSchema;
use crate::types::SimpleType;

const OBJECT_KEYWORDS: &[&str] = &["properties", "patternProperties", "additionalProperties"];
const ARRAY_KEYWORDS: &[&str] = &["items", "minItems", "maxItems"];
const STRING_KEYWORDS: &[&str] = &["pattern", "minLength", "maxLength"];
const NUMERIC_KEYWORDS: &[&str] = &["minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum"];
const LEAF_KEYWORDS: &[&str] = &[
    "pattern",
    "format",
    "minLength",
    "maxLength",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "enum",
];

/// Keywords that carry no validation meaning here.
const ANNOTATIONS: &[&str] = &[
    "$schema",
    "$id",
    "id",
    "title",
    "description",
    "default",
    "definitions",
    "$defs",
    "required",
    "type",
];

/// Compiles schema documents.
///
/// # Example
///
/// ```
/// use jsoncheck::SchemaCompiler;
/// use serde_json::json;
///
/// let schema = SchemaCompiler::new()
///     .compile(&json!({
///         "type": "array",
///         "items": { "type": "string", "format": "date" }
///     }))
///     .unwrap();
///
/// let errors = schema.validate(&json!(["2011-05-10", "2011-05-44"]));
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].location, "[1]");
/// ```
#[derive(Debug, Clone)]
pub struct SchemaCompiler {
    formats: FormatRegistry,
    base_dir: PathBuf,
}

impl SchemaCompiler {
    /// A compiler using the built-in formats, resolving relative file
    /// references from the current directory.
    pub fn new() -> Self {
        Self {
            formats: FormatRegistry::default(),
            base_dir: PathBuf::from("."),
        }
    }

    /// Use `formats` to resolve `format` keywords.
    pub fn formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    /// Directory that file references in an in-memory schema resolve against.
    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Compile an in-memory schema document.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidSchema` or `LoadError::Config` for malformed
    /// or contradictory keywords, and the `$ref` variants for references that
    /// cannot be resolved.
    pub fn compile(&self, schema: &Value) -> Result<JsonSchema, LoadError> {
        let doc = Document {
            root: Rc::new(schema.clone()),
            dir: self.base_dir.clone(),
            name: String::new(),
        };
        Compilation::new(&self.formats).compile_root(doc)
    }

    /// Load and compile a schema file.
    pub fn compile_file(&self, path: &Path) -> Result<JsonSchema, LoadError> {
        let mut compilation = Compilation::new(&self.formats);
        let doc = compilation.open(path)?;
        compilation.compile_root(doc)
    }
}

impl Default for SchemaCompiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile `schema` with default options.
pub fn compile_schema(schema: &Value) -> Result<JsonSchema, LoadError> {
    SchemaCompiler::new().compile(schema)
}

enum Kind {
    Simple(SimpleType),
    Array,
    Object,
}

#[derive(Clone)]
struct Document {
    root: Rc<Value>,
    dir: PathBuf,
    /// Display name; empty for the in-memory root document.
    name: String,
}

impl Document {
    fn location(&self, pointer: &str) -> String {
        format!("{}#{}", self.name, pointer)
    }
}

/// State for one compile call: loaded files, finished `$ref` targets and
/// the chain of targets currently being expanded.
struct Compilation<'c> {
    formats: &'c FormatRegistry,
    files: HashMap<PathBuf, Rc<Value>>,
    compiled: HashMap<String, JsonSchema>,
    active: Vec<String>,
}

impl<'c> Compilation<'c> {
    fn new(formats: &'c FormatRegistry) -> Self {
        Self {
            formats,
            files: HashMap::new(),
            compiled: HashMap::new(),
            active: Vec::new(),
        }
    }

    fn open(&mut self, path: &Path) -> Result<Document, LoadError> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let root = match self.files.get(&canonical) {
            Some(root) => Rc::clone(root),
            None => {
                let root = Rc::new(load_json(path)?);
                self.files.insert(canonical.clone(), Rc::clone(&root));
                root
            }
        };
        Ok(Document {
            root,
            dir: canonical
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            name: canonical.display().to_string(),
        })
    }

    fn compile_root(mut self, doc: Document) -> Result<JsonSchema, LoadError> {
        let location = doc.location("");
        tracing::debug!(schema = %location, "compiling schema");
        let root = Rc::clone(&doc.root);
        self.active.push(location.clone());
        self.compile_node(&root, &doc, &location)
    }

    fn compile_node(
        &mut self,
        node: &Value,
        doc: &Document,
        path: &str,
    ) -> Result<JsonSchema, LoadError> {
        let Some(map) = node.as_object() else {
            return Err(invalid(path, "schema must be a JSON object"));
        };

        if let Some(reference) = map.get("$ref") {
            let Some(reference) = reference.as_str() else {
                return Err(invalid(path, "\"$ref\" must be a string"));
            };
            return self.compile_ref(reference, doc, path);
        }

        for key in map.keys() {
            if !is_known_keyword(key) {
                tracing::debug!(path, keyword = %key, "ignoring unsupported keyword");
            }
        }

        match kind_of(map, path, self.formats)? {
            Kind::Simple(ty) => self.compile_simple(map, ty, path).map(JsonSchema::from),
            Kind::Array => {
                reject_keywords(map, LEAF_KEYWORDS, "array", path)?;
                reject_keywords(map, OBJECT_KEYWORDS, "array", path)?;
                self.compile_array(map, doc, path).map(JsonSchema::from)
            }
            Kind::Object => {
                reject_keywords(map, LEAF_KEYWORDS, "object", path)?;
                reject_keywords(map, ARRAY_KEYWORDS, "object", path)?;
                self.compile_object(map, doc, path).map(JsonSchema::from)
            }
        }
    }

    fn compile_ref(
        &mut self,
        reference: &str,
        doc: &Document,
        path: &str,
    ) -> Result<JsonSchema, LoadError> {
        let (file_part, pointer) = match reference.find('#') {
            Some(idx) => (&reference[..idx], &reference[idx + 1..]),
            None => (reference, ""),
        };

        let target_doc = if file_part.is_empty() {
            doc.clone()
        } else {
            self.open(&doc.dir.join(file_part))?
        };

        let location = target_doc.location(pointer);
        if self.active.contains(&location) {
            return Err(LoadError::CircularReference {
                reference: reference.to_string(),
            });
        }
        if let Some(schema) = self.compiled.get(&location) {
            return Ok(schema.clone());
        }

        let root = Rc::clone(&target_doc.root);
        let target = navigate_fragment(&root, pointer).ok_or_else(|| LoadError::UnresolvedRef {
            path: path.to_string(),
            reference: reference.to_string(),
        })?;

        tracing::debug!(path, reference, target = %location, "resolving $ref");
        self.active.push(location.clone());
        let compiled = self.compile_node(target, &target_doc, &location);
        self.active.pop();

        let compiled = compiled?;
        self.compiled.insert(location, compiled.clone());
        Ok(compiled)
    }

    fn compile_simple(
        &mut self,
        map: &Map<String, Value>,
        ty: SimpleType,
        path: &str,
    ) -> Result<SimpleTypeSchema, LoadError> {
        for name in OBJECT_KEYWORDS.iter().chain(ARRAY_KEYWORDS) {
            if map.contains_key(*name) {
                return Err(invalid(
                    &child(path, name),
                    format!("\"{name}\" does not apply to {ty} schemas"),
                ));
            }
        }

        let mut schema = SimpleTypeSchema::new(ty);

        if let Some(source) = keyword(map, "pattern", path, "a string", Value::as_str)? {
            let pattern = Regex::new(source).map_err(|e| {
                invalid(&child(path, "pattern"), format!("invalid regex: {e}"))
            })?;
            schema
                .set_pattern(pattern)
                .map_err(|e| config(path, "pattern", e))?;
        }
        if let Some(name) = keyword(map, "format", path, "a string", Value::as_str)? {
            schema
                .set_format_with(name, self.formats)
                .map_err(|e| config(path, "format", e))?;
        }
        if let Some(n) = keyword(map, "maxLength", path, "a non-negative integer", as_usize)? {
            schema
                .set_max_length(n)
                .map_err(|e| config(path, "maxLength", e))?;
        }
        if let Some(n) = keyword(map, "minLength", path, "a non-negative integer", as_usize)? {
            schema
                .set_min_length(n)
                .map_err(|e| config(path, "minLength", e))?;
        }
        if let Some(n) = keyword(map, "minimum", path, "a number", as_number)? {
            schema
                .set_minimum(n.clone())
                .map_err(|e| config(path, "minimum", e))?;
        }
        if let Some(n) = keyword(map, "maximum", path, "a number", as_number)? {
            schema
                .set_maximum(n.clone())
                .map_err(|e| config(path, "maximum", e))?;
        }
        if let Some(flag) = keyword(map, "exclusiveMinimum", path, "a boolean", Value::as_bool)? {
            schema
                .set_exclusive_minimum(flag)
                .map_err(|e| config(path, "exclusiveMinimum", e))?;
        }
        if let Some(flag) = keyword(map, "exclusiveMaximum", path, "a boolean", Value::as_bool)? {
            schema
                .set_exclusive_maximum(flag)
                .map_err(|e| config(path, "exclusiveMaximum", e))?;
        }
        if let Some(values) = keyword(map, "enum", path, "an array", Value::as_array)? {
            schema
                .set_enumeration(values.clone())
                .map_err(|e| config(path, "enum", e))?;
        }

        Ok(schema)
    }

    fn compile_array(
        &mut self,
        map: &Map<String, Value>,
        doc: &Document,
        path: &str,
    ) -> Result<ArraySchema, LoadError> {
        let mut schema = ArraySchema::new();

        match map.get("items") {
            None => {}
            Some(Value::Array(_)) => {
                return Err(invalid(
                    &child(path, "items"),
                    "tuple-typed \"items\" is not supported",
                ))
            }
            Some(items) => {
                let items = self.compile_node(items, doc, &child(path, "items"))?;
                schema.set_items(items);
            }
        }
        if let Some(n) = keyword(map, "minItems", path, "a non-negative integer", as_usize)? {
            schema.set_min_items(n);
        }
        if let Some(n) = keyword(map, "maxItems", path, "a non-negative integer", as_usize)? {
            schema.set_max_items(n);
        }

        Ok(schema)
    }

    fn compile_object(
        &mut self,
        map: &Map<String, Value>,
        doc: &Document,
        path: &str,
    ) -> Result<ObjectSchema, LoadError> {
        let mut schema = ObjectSchema::new();

        if let Some(properties) = keyword(map, "properties", path, "an object", Value::as_object)? {
            let properties_path = child(path, "properties");
            for (name, property) in properties {
                let property_path = child(&properties_path, name);
                let compiled = self.compile_node(property, doc, &property_path)?;
                schema.set_property(name.clone(), compiled);
                // draft-3 style: "required": true inside the property
                if property.get("required").and_then(Value::as_bool) == Some(true) {
                    schema.add_required(name.clone());
                }
            }
        }

        if let Some(Value::Array(names)) = map.get("required") {
            for name in names {
                let Some(name) = name.as_str() else {
                    return Err(invalid(
                        &child(path, "required"),
                        "\"required\" must contain only strings",
                    ));
                };
                schema.add_required(name);
            }
        }

        if let Some(patterns) =
            keyword(map, "patternProperties", path, "an object", Value::as_object)?
        {
            let patterns_path = child(path, "patternProperties");
            for (source, property) in patterns {
                let property_path = child(&patterns_path, source);
                let pattern = Regex::new(source)
                    .map_err(|e| invalid(&property_path, format!("invalid regex: {e}")))?;
                let compiled = self.compile_node(property, doc, &property_path)?;
                schema.add_pattern_property(pattern, compiled);
            }
        }

        match map.get("additionalProperties") {
            None | Some(Value::Bool(true)) => {}
            Some(Value::Bool(false)) => {
                schema.set_additional_properties(AdditionalProperties::Deny);
            }
            Some(additional @ Value::Object(_)) => {
                let compiled =
                    self.compile_node(additional, doc, &child(path, "additionalProperties"))?;
                schema.set_additional_properties(AdditionalProperties::Schema(Box::new(compiled)));
            }
            Some(_) => {
                return Err(invalid(
                    &child(path, "additionalProperties"),
                    "\"additionalProperties\" must be a boolean or a schema",
                ))
            }
        }

        Ok(schema)
    }
}

/// Work out which node kind a schema object describes.
///
/// An explicit `type` wins. Without one, container keywords select a
/// container, `enum` members of a single kind select that kind, and leaf
/// keywords select string or number. A known `format` selects the first of
/// string or number it applies to.
fn kind_of(
    map: &Map<String, Value>,
    path: &str,
    formats: &FormatRegistry,
) -> Result<Kind, LoadError> {
    match map.get("type") {
        Some(Value::String(name)) => match name.as_str() {
            "array" => Ok(Kind::Array),
            "object" => Ok(Kind::Object),
            other => SimpleType::parse(other).map(Kind::Simple).ok_or_else(|| {
                invalid(&child(path, "type"), format!("unknown type \"{other}\""))
            }),
        },
        Some(Value::Array(_)) => Err(invalid(
            &child(path, "type"),
            "union types are not supported",
        )),
        Some(_) => Err(invalid(&child(path, "type"), "\"type\" must be a string")),
        None => Ok(infer_kind(map, formats)),
    }
}

fn infer_kind(map: &Map<String, Value>, formats: &FormatRegistry) -> Kind {
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| map.contains_key(*k));

    if has_any(OBJECT_KEYWORDS) || map.get("required").is_some_and(Value::is_array) {
        Kind::Object
    } else if has_any(ARRAY_KEYWORDS) {
        Kind::Array
    } else if let Some(Value::Array(members)) = map.get("enum") {
        Kind::Simple(infer_enum_type(members))
    } else if has_any(STRING_KEYWORDS) {
        Kind::Simple(SimpleType::String)
    } else if has_any(NUMERIC_KEYWORDS) {
        Kind::Simple(SimpleType::Number)
    } else {
        let checker = map
            .get("format")
            .and_then(Value::as_str)
            .and_then(|name| formats.get(name));
        let ty = [SimpleType::String, SimpleType::Number]
            .into_iter()
            .find(|ty| checker.is_some_and(|c| c.is_compatible(*ty)))
            .unwrap_or(SimpleType::Any);
        Kind::Simple(ty)
    }
}

/// The narrowest type every member satisfies, or `Any` when the members mix
/// kinds (which `set_enumeration` then rejects).
fn infer_enum_type(members: &[Value]) -> SimpleType {
    [
        SimpleType::Boolean,
        SimpleType::String,
        SimpleType::Integer,
        SimpleType::Number,
    ]
    .into_iter()
    .find(|ty| !members.is_empty() && members.iter().all(|m| ty.is_acceptable_type(m)))
    .unwrap_or(SimpleType::Any)
}

fn is_known_keyword(key: &str) -> bool {
    key == "$ref"
        || ANNOTATIONS.contains(&key)
        || LEAF_KEYWORDS.contains(&key)
        || OBJECT_KEYWORDS.contains(&key)
        || ARRAY_KEYWORDS.contains(&key)
}

fn reject_keywords(
    map: &Map<String, Value>,
    keywords: &[&str],
    kind: &str,
    path: &str,
) -> Result<(), LoadError> {
    match keywords.iter().find(|k| map.contains_key(**k)) {
        Some(keyword) => Err(invalid(
            &child(path, keyword),
            format!("\"{keyword}\" does not apply to {kind} schemas"),
        )),
        None => Ok(()),
    }
}

/// Read an optional keyword, failing when it is present with the wrong shape.
fn keyword<'v, T>(
    map: &'v Map<String, Value>,
    key: &str,
    path: &str,
    expected: &str,
    extract: impl Fn(&'v Value) -> Option<T>,
) -> Result<Option<T>, LoadError> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => extract(value)
            .map(Some)
            .ok_or_else(|| invalid(&child(path, key), format!("\"{key}\" must be {expected}"))),
    }
}

fn as_usize(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

fn as_number(value: &Value) -> Option<&Number> {
    match value {
        Value::Number(n) => Some(n),
        _ => None,
    }
}

/// Append a JSON Pointer segment, escaping `~` and `/`.
fn child(path: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        path,
        segment.replace('~', "~0").replace('/', "~1")
    )
}

fn invalid(path: &str, message: impl Into<String>) -> LoadError {
    LoadError::InvalidSchema {
        path: path.to_string(),
        message: message.into(),
    }
}

fn config(path: &str, keyword: &str, source: ConfigError) -> LoadError {
    LoadError::Config {
        path: child(path, keyword),
        source,
    }
}
