//! The record contract.
//!
//! [`Record`] is the engine's only boundary: anything that can enumerate its
//! declared fields and read/write them by name can be diffed and merged. The
//! engine never constructs, destroys, or persists records — it only reads
//! named fields and, during `apply()`, writes resolved values back onto the
//! baseline.

use super::value::{FieldState, Value};
use crate::error::{MergeError, Result};
use indexmap::IndexMap;

/// Declared metadata for a single record field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Field name, unique within the record.
    pub name: &'static str,
    /// Whether the field participates in the record's primary key.
    pub primary_key: bool,
    /// Declared default value; `Value::Null` when the field has none.
    pub default: Value,
}

impl FieldDef {
    /// A plain field with no default.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            primary_key: false,
            default: Value::Null,
        }
    }

    /// A primary-key field.
    #[must_use]
    pub fn key(name: &'static str) -> Self {
        Self {
            name,
            primary_key: true,
            default: Value::Null,
        }
    }

    /// Attach a declared default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }
}

/// A structurally typed entity with a fixed, named set of fields.
///
/// Implementors provide the three required methods; everything else is
/// derived. Field order in [`fields`](Record::fields) is the declaration
/// order, and it is observable — diffs iterate their working set in that
/// order.
pub trait Record {
    /// Stable name of this record type, used in error messages and reports.
    fn record_name(&self) -> &'static str;

    /// Declared fields, in declaration order.
    fn fields(&self) -> Vec<FieldDef>;

    /// Read a field's current value by name.
    fn get(&self, field: &str) -> Result<Value>;

    /// Write a field's value by name.
    fn set(&mut self, field: &str, value: Value) -> Result<()>;

    /// Declared field names, in declaration order.
    fn field_names(&self) -> Vec<&'static str> {
        self.fields().iter().map(|f| f.name).collect()
    }

    /// The declaration for a single field, if it exists.
    fn field_def(&self, field: &str) -> Option<FieldDef> {
        self.fields().into_iter().find(|f| f.name == field)
    }

    /// True if the record declares a field with this name.
    fn has_field(&self, field: &str) -> bool {
        self.fields().iter().any(|f| f.name == field)
    }

    /// Names of the fields making up the primary key.
    fn primary_key_names(&self) -> Vec<&'static str> {
        self.fields()
            .iter()
            .filter(|f| f.primary_key)
            .map(|f| f.name)
            .collect()
    }

    /// Classify a field's current value against its declared default.
    fn state_of(&self, field: &str) -> Result<FieldState> {
        let def = self
            .field_def(field)
            .ok_or_else(|| MergeError::unknown_field(self.record_name(), field))?;
        Ok(FieldState::classify(&self.get(field)?, &def.default))
    }

    /// Names of fields currently holding a deliberately set value (neither
    /// empty nor equal to their declared default).
    fn assigned_fields(&self) -> Vec<&'static str> {
        self.fields()
            .iter()
            .filter(|def| {
                self.get(def.name)
                    .map(|v| FieldState::classify(&v, &def.default) == FieldState::Modified)
                    .unwrap_or(false)
            })
            .map(|def| def.name)
            .collect()
    }

    /// Fields whose values differ between `self` and `other`, as
    /// `name -> (self value, other value)` in declaration order.
    ///
    /// Primary-key fields are skipped unless `include_pk` is set.
    fn compare(&self, other: &Self, include_pk: bool) -> IndexMap<String, (Value, Value)>
    where
        Self: Sized,
    {
        let mut differing = IndexMap::new();
        for def in self.fields() {
            if def.primary_key && !include_pk {
                continue;
            }
            // Both reads are infallible for declared fields; a broken
            // implementation surfaces as a missing entry, not a panic.
            if let (Ok(left), Ok(right)) = (self.get(def.name), other.get(def.name)) {
                if left != right {
                    differing.insert(def.name.to_string(), (left, right));
                }
            }
        }
        differing
    }

    /// Copy every non-primary-key field value from `source` onto `self`.
    fn copy_values_from(&mut self, source: &Self) -> Result<()>
    where
        Self: Sized,
    {
        let fields = self.fields();
        for def in fields.iter().filter(|f| !f.primary_key) {
            let value = source.get(def.name)?;
            self.set(def.name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Contact {
        name: String,
        email: Option<String>,
        phone: Option<String>,
        active: bool,
    }

    impl Record for Contact {
        fn record_name(&self) -> &'static str {
            "contact"
        }

        fn fields(&self) -> Vec<FieldDef> {
            vec![
                FieldDef::key("name"),
                FieldDef::new("email"),
                FieldDef::new("phone"),
                FieldDef::new("active").with_default(true),
            ]
        }

        fn get(&self, field: &str) -> Result<Value> {
            match field {
                "name" => Ok(Value::from(self.name.clone())),
                "email" => Ok(Value::from(self.email.clone())),
                "phone" => Ok(Value::from(self.phone.clone())),
                "active" => Ok(Value::from(self.active)),
                _ => Err(MergeError::unknown_field(self.record_name(), field)),
            }
        }

        fn set(&mut self, field: &str, value: Value) -> Result<()> {
            match (field, value) {
                ("name", Value::Text(v)) => self.name = v,
                ("email", Value::Text(v)) => self.email = Some(v),
                ("email", Value::Null) => self.email = None,
                ("phone", Value::Text(v)) => self.phone = Some(v),
                ("phone", Value::Null) => self.phone = None,
                ("active", Value::Bool(v)) => self.active = v,
                (field, value) => {
                    return Err(MergeError::type_mismatch(field, "text", value.type_name()))
                }
            }
            Ok(())
        }
    }

    fn alice() -> Contact {
        Contact {
            name: "alice".into(),
            email: Some("alice@example.com".into()),
            phone: None,
            active: true,
        }
    }

    fn bob() -> Contact {
        Contact {
            name: "bob".into(),
            email: None,
            phone: Some("555-0100".into()),
            active: false,
        }
    }

    #[test]
    fn test_field_names_in_declaration_order() {
        assert_eq!(
            alice().field_names(),
            vec!["name", "email", "phone", "active"]
        );
        assert_eq!(alice().primary_key_names(), vec!["name"]);
    }

    #[test]
    fn test_state_of() {
        let contact = alice();
        assert_eq!(contact.state_of("email").unwrap(), FieldState::Modified);
        assert_eq!(contact.state_of("phone").unwrap(), FieldState::Empty);
        // active == declared default
        assert_eq!(contact.state_of("active").unwrap(), FieldState::Default);
        assert!(contact.state_of("missing").is_err());
    }

    #[test]
    fn test_assigned_fields() {
        assert_eq!(alice().assigned_fields(), vec!["name", "email"]);
        assert_eq!(bob().assigned_fields(), vec!["name", "phone", "active"]);
    }

    #[test]
    fn test_compare_excludes_pk_by_default() {
        let differing = alice().compare(&bob(), false);
        assert_eq!(
            differing.keys().collect::<Vec<_>>(),
            vec!["email", "phone", "active"]
        );
        assert!(!differing.contains_key("name"));

        let with_pk = alice().compare(&bob(), true);
        assert!(with_pk.contains_key("name"));
    }

    #[test]
    fn test_compare_equal_records_is_empty() {
        assert!(alice().compare(&alice(), true).is_empty());
    }

    #[test]
    fn test_copy_values_from_skips_pk() {
        let mut left = alice();
        left.copy_values_from(&bob()).unwrap();
        assert_eq!(left.name, "alice");
        assert_eq!(left.email, None);
        assert_eq!(left.phone.as_deref(), Some("555-0100"));
        assert!(!left.active);
    }

    #[test]
    fn test_set_type_mismatch_fails_loudly() {
        let mut contact = alice();
        let err = contact.set("active", Value::from("yes")).unwrap_err();
        assert!(matches!(err, MergeError::TypeMismatch { .. }));
    }
}
