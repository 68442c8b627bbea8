use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// One failed constraint, addressed by its dotted field path
/// (`details.deadline`, `questions[1].label`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Required text must carry something other than whitespace.
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("required"))
    } else {
        Ok(())
    }
}

pub fn collect(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_into(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    out
}

fn collect_into(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = match (prefix.is_empty(), field.as_ref()) {
            (true, f) => f.to_string(),
            // struct level (schema) errors belong to the parent field
            (false, "__all__") => prefix.to_string(),
            (false, f) => format!("{}.{}", prefix, f),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    let message = match &e.message {
                        Some(m) => m.to_string(),
                        None => format!("{} is invalid ({})", &path, &e.code),
                    };
                    out.push(FieldError {
                        field: path.clone(),
                        message,
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_into(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_into(inner, &format!("{}[{}]", &path, idx), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use validator::{Validate, ValidationError};

    use super::*;

    #[derive(Validate)]
    struct Inner {
        #[validate(length(min = 1, message = "city cannot be empty"))]
        city: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(length(min = 1))]
        name: String,
        #[validate(nested)]
        inner: Inner,
    }

    #[test]
    fn nested_errors_are_addressed_by_path() {
        let outer = Outer {
            name: String::new(),
            inner: Inner {
                city: String::new(),
            },
        };
        let errors = outer.validate().unwrap_err();
        let collected = collect(&errors);
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].field, "inner.city");
        assert_eq!(collected[0].message, "city cannot be empty");
        assert_eq!(collected[1].field, "name");
        assert!(collected[1].message.contains("name is invalid"));
    }

    #[test]
    fn whitespace_is_blank() {
        assert!(non_blank("").is_err());
        assert!(non_blank(" \t\n ").is_err());
        assert!(non_blank(" x ").is_ok());
    }

    #[test]
    fn manual_errors_keep_their_message() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "title",
            ValidationError::new("required").with_message("title cannot be empty".into()),
        );
        assert_eq!(
            collect(&errors),
            vec![FieldError {
                field: "title".into(),
                message: "title cannot be empty".into()
            }]
        );
    }
}
