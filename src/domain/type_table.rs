use std::collections::BTreeMap;

const DEFAULT_LABELS: &[(i64, &str)] = &[
    (41, "کلینیک"),
    (61, "تصویربرداری"),
    (1000083, "عینک سازی"),
    (1000103, "جراحی محدود"),
    (1000104, "فیزیوتراپی"),
    (1000105, "داروخانه"),
    (1000106, "آزمایشگاه"),
    (1000107, "بیمارستان خصوصی"),
    (1000108, "بیمارستان دولتی"),
    (1000109, "دندان پزشکی"),
    (1000123, "بیمارستان غیر دولتی عمومی"),
    (1000143, "مطب"),
    (1000144, "خیریه"),
    (1000166, "درمانگاه"),
];

/// Maps a center's `typeId` to its display category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTable {
    labels: BTreeMap<i64, String>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::from_labels(
            DEFAULT_LABELS
                .iter()
                .map(|(code, label)| (*code, label.to_string())),
        )
    }
}

impl TypeTable {
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = (i64, String)>,
    {
        Self {
            labels: labels.into_iter().collect(),
        }
    }

    /// The built-in table with `overrides` layered on top.
    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (i64, String)>,
    {
        let mut table = Self::default();
        table.labels.extend(overrides);
        table
    }

    pub fn label(&self, code: i64) -> Option<&str> {
        self.labels.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = TypeTable::default();
        assert_eq!(table.len(), 14);
        assert_eq!(table.label(41), Some("کلینیک"));
        assert_eq!(table.label(1000166), Some("درمانگاه"));
        assert_eq!(table.label(999999), None);
    }

    #[test]
    fn test_overrides_replace_and_extend() {
        let table = TypeTable::with_overrides(vec![
            (41, "Clinic".to_string()),
            (7, "Lab".to_string()),
        ]);
        assert_eq!(table.label(41), Some("Clinic"));
        assert_eq!(table.label(7), Some("Lab"));
        assert_eq!(table.label(61), Some("تصویربرداری"));
    }
}
