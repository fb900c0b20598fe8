//! Typed, named settings exposed by each brush.

use std::fmt;

use crate::EditError;

/// Declared type of a brush field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Add/remove toggle.
    AddRemove,
    /// Integer of at least one.
    PositiveInteger,
    /// Team selector (0 or 1).
    Team,
    /// Choice among a fixed option list.
    SingleSelect,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AddRemove => "add/remove",
            Self::PositiveInteger => "positive integer",
            Self::Team => "team",
            Self::SingleSelect => "single select",
        };
        f.write_str(name)
    }
}

/// Current value held by a brush field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// `true` adds content, `false` removes it.
    AddRemove(bool),
    /// Integer of at least one.
    PositiveInteger(u32),
    /// Relative team index (0 or 1).
    Team(u8),
    /// Selected option value.
    Select(u8),
}

impl FieldValue {
    /// Declared type matching the value.
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::AddRemove(_) => FieldKind::AddRemove,
            Self::PositiveInteger(_) => FieldKind::PositiveInteger,
            Self::Team(_) => FieldKind::Team,
            Self::Select(_) => FieldKind::SingleSelect,
        }
    }
}

/// Entry of a single-select field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SelectOption {
    /// Stored value.
    pub value: u8,
    /// Display label.
    pub label: &'static str,
}

/// Named slot with a fixed type and a current value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrushField {
    name: &'static str,
    label: Option<&'static str>,
    value: FieldValue,
    options: Vec<SelectOption>,
}

impl BrushField {
    pub(crate) fn add_remove(name: &'static str) -> Self {
        Self {
            name,
            label: None,
            value: FieldValue::AddRemove(true),
            options: Vec::new(),
        }
    }

    pub(crate) fn positive_integer(name: &'static str, label: &'static str, value: u32) -> Self {
        Self {
            name,
            label: Some(label),
            value: FieldValue::PositiveInteger(value.max(1)),
            options: Vec::new(),
        }
    }

    pub(crate) fn team(name: &'static str) -> Self {
        Self {
            name,
            label: None,
            value: FieldValue::Team(0),
            options: Vec::new(),
        }
    }

    pub(crate) fn single_select(
        name: &'static str,
        label: &'static str,
        options: Vec<SelectOption>,
    ) -> Self {
        let first = options.first().map_or(0, |option| option.value);
        Self {
            name,
            label: Some(label),
            value: FieldValue::Select(first),
            options,
        }
    }

    /// Identifier used to address the field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Display label, if the field has one.
    #[must_use]
    pub const fn label(&self) -> Option<&'static str> {
        self.label
    }

    /// Declared type of the field.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.value.kind()
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> FieldValue {
        self.value
    }

    /// Options of a single-select field; empty otherwise.
    #[must_use]
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    fn set(&mut self, value: FieldValue) -> Result<(), EditError> {
        if value.kind() != self.kind() {
            return Err(EditError::FieldKind {
                field: self.name,
                expected: self.kind(),
                actual: value.kind(),
            });
        }
        let accepted = match value {
            FieldValue::AddRemove(_) => true,
            FieldValue::PositiveInteger(number) => number >= 1,
            FieldValue::Team(team) => team <= 1,
            FieldValue::Select(selected) => {
                self.options.iter().any(|option| option.value == selected)
            }
        };
        if !accepted {
            let raw = match value {
                FieldValue::AddRemove(flag) => u32::from(flag),
                FieldValue::PositiveInteger(number) => number,
                FieldValue::Team(team) | FieldValue::Select(team) => u32::from(team),
            };
            return Err(EditError::InvalidOption {
                field: self.name,
                value: raw,
            });
        }
        self.value = value;
        Ok(())
    }
}

/// Fixed set of fields belonging to one brush.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrushFields {
    fields: Vec<BrushField>,
}

impl BrushFields {
    pub(crate) fn new(fields: Vec<BrushField>) -> Self {
        Self { fields }
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BrushField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Fields in display order.
    pub fn iter(&self) -> impl Iterator<Item = &BrushField> + '_ {
        self.fields.iter()
    }

    /// Writes a value, rejecting unknown names and values of the wrong type.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), EditError> {
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| EditError::UnknownField {
                field: name.to_owned(),
            })?;
        field.set(value)
    }

    pub(crate) fn flag(&self, name: &str) -> bool {
        match self.get(name).map(BrushField::value) {
            Some(FieldValue::AddRemove(flag)) => flag,
            _ => false,
        }
    }

    pub(crate) fn integer(&self, name: &str) -> u32 {
        match self.get(name).map(BrushField::value) {
            Some(FieldValue::PositiveInteger(number)) => number,
            _ => 1,
        }
    }

    pub(crate) fn team(&self, name: &str) -> u8 {
        match self.get(name).map(BrushField::value) {
            Some(FieldValue::Team(team)) => team,
            _ => 0,
        }
    }

    pub(crate) fn selected(&self, name: &str) -> u8 {
        match self.get(name).map(BrushField::value) {
            Some(FieldValue::Select(selected)) => selected,
            _ => 0,
        }
    }
}
