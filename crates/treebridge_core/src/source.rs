//! Source descriptors attached to plan nodes.

/// Where a plan node comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestSource {
    /// A test class, by fully-qualified name.
    Class { class_name: String },
    /// A test method; `parameter_types` is the comma-separated signature (empty for no parameters).
    Method {
        class_name: String,
        method_name: String,
        parameter_types: String,
    },
    /// Any other source shape (files, URIs, engine-specific descriptors).
    Other(String),
}

impl TestSource {
    pub fn class(class_name: impl Into<String>) -> Self {
        Self::Class {
            class_name: class_name.into(),
        }
    }

    pub fn method(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        parameter_types: impl Into<String>,
    ) -> Self {
        Self::Method {
            class_name: class_name.into(),
            method_name: method_name.into(),
            parameter_types: parameter_types.into(),
        }
    }

    /// Derive the technical name of this source.
    ///
    /// `None` for shapes that carry no usable name (blank class or method names, [`TestSource::Other`]);
    /// callers fall back to the display name.
    pub fn technical_name(&self) -> Option<String> {
        match self {
            TestSource::Class { class_name } if !class_name.trim().is_empty() => Some(class_name.clone()),
            TestSource::Method {
                method_name,
                parameter_types,
                ..
            } if !method_name.trim().is_empty() => {
                if parameter_types.trim().is_empty() {
                    Some(method_name.clone())
                } else {
                    Some(format!("{method_name}({parameter_types})"))
                }
            }
            _ => None,
        }
    }
}
