//! Catalog kinds offered by the wizard pick-lists.

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Themes,
    Subjects,
    Messages,
    Styles,
    AgeCategories,
}

impl CatalogKind {
    /// Parse the URL segment (`themes`, `age-categories`, ...).
    pub fn from_slug(slug: &str) -> Result<Self, CoreError> {
        match slug {
            "themes" => Ok(Self::Themes),
            "subjects" => Ok(Self::Subjects),
            "messages" => Ok(Self::Messages),
            "styles" => Ok(Self::Styles),
            "age-categories" => Ok(Self::AgeCategories),
            _ => Err(CoreError::Validation(format!(
                "Unknown catalog '{slug}'. Must be one of: themes, subjects, messages, styles, age-categories"
            ))),
        }
    }

    /// Backing table. Only ever one of these fixed names, so it is safe to
    /// interpolate into SQL.
    pub fn table(self) -> &'static str {
        match self {
            Self::Themes => "themes",
            Self::Subjects => "subjects",
            Self::Messages => "messages",
            Self::Styles => "styles",
            Self::AgeCategories => "age_categories",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_map_to_tables() {
        assert_eq!(CatalogKind::from_slug("themes").unwrap().table(), "themes");
        assert_eq!(
            CatalogKind::from_slug("age-categories").unwrap().table(),
            "age_categories"
        );
    }

    #[test]
    fn unknown_slug_rejected() {
        assert!(CatalogKind::from_slug("profiles").is_err());
        assert!(CatalogKind::from_slug("age_categories").is_err());
    }
}
