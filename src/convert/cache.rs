//! Number format to style record cache.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::ole::xls::{CellStyleId, XlsResult, XlsWriter};

/// Maps source number-format ids to destination style records.
///
/// The first cell seen with a format id creates a style record carrying that
/// id; every later cell with the same id shares the record.
#[derive(Debug, Default)]
pub struct FormatStyleCache {
    styles: HashMap<u16, CellStyleId>,
}

impl FormatStyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Style record for `format_id`, created in `writer` on first use.
    pub fn style_for(&mut self, writer: &mut XlsWriter, format_id: u16) -> XlsResult<CellStyleId> {
        match self.styles.entry(format_id) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let style = writer.create_cell_style()?;
                writer.set_data_format(style, format_id)?;
                Ok(*entry.insert(style))
            },
        }
    }

    #[cfg(test)]
    fn get(&self, format_id: u16) -> Option<CellStyleId> {
        self.styles.get(&format_id).copied()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_style_per_format_id() {
        let mut writer = XlsWriter::new();
        let mut cache = FormatStyleCache::new();
        assert!(cache.is_empty());

        let general = cache.style_for(&mut writer, 0).unwrap();
        let custom = cache.style_for(&mut writer, 164).unwrap();
        assert_ne!(general, custom);
        assert_eq!(cache.style_for(&mut writer, 164).unwrap(), custom);
        assert_eq!(cache.style_for(&mut writer, 0).unwrap(), general);

        assert_eq!(cache.len(), 2);
        assert!(!cache.is_empty());
        assert_eq!(cache.get(164), Some(custom));
        assert_eq!(writer.style_count(), 2);
        assert_eq!(writer.formatting().data_format(custom), Some(164));
        assert_eq!(cache.get(14), None);
    }
}
