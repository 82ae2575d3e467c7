use crate::record::Field;
use crate::{ConfigError, REQUIRED};

/// A field's binding directive: where to look and whether absence is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTag {
    path: String,
    required: bool,
}

impl FieldTag {
    /// Parses an annotation of the form `path` or `path,required`.
    ///
    /// Every component after the path must be the `required` marker. Repeating
    /// the marker is allowed and changes nothing.
    pub fn parse(field: &'static str, annotation: &str) -> Result<Self, ConfigError> {
        let mut parts = annotation.split(',');
        let path = parts.next().unwrap_or_default();
        if path.is_empty() {
            return Err(ConfigError::EmptyTag { field });
        }

        let mut required = false;
        for token in parts {
            if token != REQUIRED {
                return Err(ConfigError::InvalidTag {
                    field,
                    token: token.to_string(),
                });
            }
            required = true;
        }

        Ok(Self {
            path: path.to_string(),
            required,
        })
    }

    /// Resolves the directive a field declares under `tag_key`.
    ///
    /// Returns `Ok(None)` when the field has no annotation for that key.
    pub fn resolve(field: &Field<'_>, tag_key: &str) -> Result<Option<Self>, ConfigError> {
        field
            .annotation(tag_key)
            .map(|annotation| Self::parse(field.name(), annotation))
            .transpose()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        let tag = FieldTag::parse("port", "server.port").unwrap();
        assert_eq!(tag.path(), "server.port");
        assert!(!tag.is_required());
    }

    #[test]
    fn test_required_marker() {
        let tag = FieldTag::parse("port", "server.port,required").unwrap();
        assert!(tag.is_required());

        let twice = FieldTag::parse("port", "server.port,required,required").unwrap();
        assert_eq!(twice, tag);
    }

    #[test]
    fn test_unknown_marker_names_token() {
        let err = FieldTag::parse("port", "path,unrequired").unwrap_err();
        match err {
            ConfigError::InvalidTag { field, token } => {
                assert_eq!(field, "port");
                assert_eq!(token, "unrequired");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err_token(FieldTag::parse("port", "path,")).is_empty());
        assert_eq!(err_token(FieldTag::parse("port", "path,required,opt")), "opt");
    }

    #[test]
    fn test_empty_path() {
        assert!(matches!(
            FieldTag::parse("port", ""),
            Err(ConfigError::EmptyTag { field: "port" })
        ));
        assert!(matches!(
            FieldTag::parse("port", ",required"),
            Err(ConfigError::EmptyTag { .. })
        ));
    }

    #[test]
    fn test_resolve_by_key() {
        let mut port = 0u16;
        let field = Field::new("port", &mut port)
            .tag("conf", "server.port,required")
            .tag("env", "PORT");

        let conf = FieldTag::resolve(&field, "conf").unwrap().unwrap();
        assert_eq!(conf.path(), "server.port");
        assert!(conf.is_required());

        let env = FieldTag::resolve(&field, "env").unwrap().unwrap();
        assert_eq!(env.path(), "PORT");

        assert_eq!(FieldTag::resolve(&field, "yaml").unwrap(), None);
    }

    fn err_token(result: Result<FieldTag, ConfigError>) -> String {
        match result {
            Err(ConfigError::InvalidTag { token, .. }) => token,
            other => panic!("expected InvalidTag, got {other:?}"),
        }
    }
}
