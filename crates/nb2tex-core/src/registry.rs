//! Cell type to converter mapping

use crate::converter::{CellConverter, LiteralSourceConverter, MarkedCodeOutputConverter};
use crate::heading::LatexHeadingConverter;
use nb_format::CellType;
use std::collections::HashMap;

/// Converters keyed by the effective cell type
///
/// Cell types without an entry are skipped during conversion.
#[derive(Debug)]
pub struct ConverterRegistry {
    converters: HashMap<CellType, Box<dyn CellConverter>>,
}

impl Default for ConverterRegistry {
    /// markdown and raw cells are copied, code cells contribute marked
    /// output, heading cells become sectioning commands
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.insert(CellType::Markdown, LiteralSourceConverter);
        registry.insert(CellType::Raw, LiteralSourceConverter);
        registry.insert(CellType::Code, MarkedCodeOutputConverter::default());
        registry.insert(CellType::Heading, LatexHeadingConverter::default());
        registry
    }
}

impl ConverterRegistry {
    /// A registry without any converters
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register a converter, returning the one it replaces
    pub fn insert(
        &mut self,
        kind: CellType,
        converter: impl CellConverter + 'static,
    ) -> Option<Box<dyn CellConverter>> {
        self.converters.insert(kind, Box::new(converter))
    }

    pub fn remove(&mut self, kind: &CellType) -> Option<Box<dyn CellConverter>> {
        self.converters.remove(kind)
    }

    pub fn get(&self, kind: &CellType) -> Option<&dyn CellConverter> {
        self.converters.get(kind).map(|c| &**c)
    }

    pub fn contains(&self, kind: &CellType) -> bool {
        self.converters.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::IgnoreConverter;

    #[test]
    fn test_default_registry() {
        let registry = ConverterRegistry::default();
        assert_eq!(registry.len(), 4);
        for kind in [
            CellType::Markdown,
            CellType::Raw,
            CellType::Code,
            CellType::Heading,
        ] {
            assert!(registry.contains(&kind), "missing {kind}");
        }
        assert!(registry.get(&CellType::Other("widget".into())).is_none());
    }

    #[test]
    fn test_override_and_remove() {
        let mut registry = ConverterRegistry::default();
        let previous = registry.insert(CellType::Code, IgnoreConverter);
        assert!(format!("{previous:?}").contains("MarkedCodeOutputConverter"));
        assert!(format!("{:?}", registry.get(&CellType::Code)).contains("IgnoreConverter"));

        assert!(registry.remove(&CellType::Raw).is_some());
        assert!(!registry.contains(&CellType::Raw));
        assert!(ConverterRegistry::empty().is_empty());
    }
}
