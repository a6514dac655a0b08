use serde_json::Value;

use super::arcgis::Attributes;

/// Picks a categorical value out of heterogeneous feature attributes: the
/// named candidates in order, then the first key containing one of the hints.
#[derive(Debug, Clone, Copy)]
pub struct AttributeMatcher {
    candidates: &'static [&'static str],
    key_hints: &'static [&'static str],
    text_only: bool,
}

impl AttributeMatcher {
    pub const fn new(candidates: &'static [&'static str], key_hints: &'static [&'static str]) -> Self {
        Self {
            candidates,
            key_hints,
            text_only: false,
        }
    }

    /// Zero and `false` candidates count as empty, and the key scan only
    /// accepts string values. Numeric ids and flags never pass as labels.
    pub const fn text_only(self) -> Self {
        Self {
            text_only: true,
            ..self
        }
    }

    pub fn pick(&self, attributes: &Attributes) -> Option<String> {
        let named = self.candidates.iter().find_map(|key| {
            attributes.get(*key).and_then(|value| {
                if self.text_only {
                    truthy_value(value)
                } else {
                    text_value(value)
                }
            })
        });
        if named.is_some() {
            return named;
        }

        attributes.iter().find_map(|(key, value)| {
            let key = key.to_ascii_uppercase();
            if !self
                .key_hints
                .iter()
                .any(|hint| key.contains(&hint.to_ascii_uppercase()))
            {
                return None;
            }
            match value {
                Value::String(_) => text_value(value),
                _ if self.text_only => None,
                _ => text_value(value),
            }
        })
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn truthy_value(value: &Value) -> Option<String> {
    match value {
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        _ => text_value(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ZONE: AttributeMatcher = AttributeMatcher::new(&["ZONE_CODE", "ZONE"], &["zone"]);

    fn attributes(value: Value) -> Attributes {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn candidates_win_in_order() {
        let attrs = attributes(json!({ "ZONE": "GRZ1", "ZONE_CODE": "NRZ1" }));
        assert_eq!(ZONE.pick(&attrs).as_deref(), Some("NRZ1"));
    }

    #[test]
    fn blank_candidates_are_skipped() {
        let attrs = attributes(json!({ "ZONE_CODE": "  ", "ZONE": "GRZ1" }));
        assert_eq!(ZONE.pick(&attrs).as_deref(), Some("GRZ1"));
    }

    #[test]
    fn falls_back_to_key_substring() {
        let attrs = attributes(json!({ "OBJECTID": 7, "LGA_ZONE_DESC": "Mixed Use" }));
        assert_eq!(ZONE.pick(&attrs).as_deref(), Some("Mixed Use"));
    }

    #[test]
    fn numbers_are_stringified_and_nulls_ignored() {
        let attrs = attributes(json!({ "ZONE_CODE": null, "ZONE": 3 }));
        assert_eq!(ZONE.pick(&attrs).as_deref(), Some("3"));
        assert_eq!(ZONE.pick(&attributes(json!({ "OTHER": "x" }))), None);
    }

    const CATEGORY: AttributeMatcher =
        AttributeMatcher::new(&["CATEGORY", "BUSHFIREPRONE"], &["CATEGORY", "BF"]).text_only();

    #[test]
    fn text_only_skips_zero_and_false_candidates() {
        assert_eq!(CATEGORY.pick(&attributes(json!({ "BUSHFIREPRONE": 0 }))), None);
        assert_eq!(CATEGORY.pick(&attributes(json!({ "CATEGORY": false }))), None);
        let attrs = attributes(json!({ "CATEGORY": 0, "BUSHFIREPRONE": 1 }));
        assert_eq!(CATEGORY.pick(&attrs).as_deref(), Some("1"));
    }

    #[test]
    fn text_only_scan_ignores_numeric_values() {
        let attrs = attributes(json!({ "OBJECTID": 4, "BF_AREA_ID": 17 }));
        assert_eq!(CATEGORY.pick(&attrs), None);
        let attrs = attributes(json!({ "BF_AREA_ID": 17, "VEG_CATEGORY_DESC": "Vegetation Category 2" }));
        assert_eq!(CATEGORY.pick(&attrs).as_deref(), Some("Vegetation Category 2"));
    }
}
