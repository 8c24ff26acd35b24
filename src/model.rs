use serde::{Deserialize, Serialize};

/// Top-level result document for one plan run (`results/{n}/index.js`).
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultIndex {
    pub plan_entity_name: Option<String>,
    pub thread_name: Option<String>,
    #[serde(default)]
    pub process_id: i64,
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub stop: i64,
    #[serde(default)]
    pub summary: Vec<TestResultSummary>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultSummary {
    #[serde(default)]
    pub process_id: i64,
    pub group: Option<String>,
    pub thread_name: Option<String>,
    pub entity_name: Option<String>,
    #[serde(default)]
    pub successful: bool,
    pub error_message: Option<String>,
    #[serde(default)]
    pub initial_properties: Vec<serde_json::Value>,
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub stop: i64,
}

impl TestResultSummary {
    pub fn duration_ms(&self) -> i64 {
        self.stop.saturating_sub(self.start)
    }
}

impl TestResultIndex {
    pub fn duration_ms(&self) -> i64 {
        self.stop.saturating_sub(self.start)
    }

    pub fn passed(&self) -> usize {
        self.summary.iter().filter(|s| s.successful).count()
    }

    pub fn failed(&self) -> usize {
        self.summary.len() - self.passed()
    }
}

#[cfg(test)]
mod tests {
    use super::TestResultIndex;

    #[test]
    fn parses_index_with_missing_fields() {
        let json = r#"
        {
          "planEntityName": "smoke",
          "processId": 7,
          "start": 1000,
          "stop": 66000,
          "summary": [
            {"entityName": "login", "successful": true, "start": 1000, "stop": 3000},
            {"entityName": "checkout", "errorMessage": "timeout", "start": 3000, "stop": 66000}
          ]
        }
        "#;

        let index: TestResultIndex = serde_json::from_str(json).expect("index should parse");
        assert_eq!(index.plan_entity_name.as_deref(), Some("smoke"));
        assert_eq!(index.summary.len(), 2);
        assert_eq!(index.passed(), 1);
        assert_eq!(index.failed(), 1);
        assert_eq!(index.duration_ms(), 65_000);
        assert_eq!(index.summary[1].duration_ms(), 63_000);
        assert!(index.summary[0].initial_properties.is_empty());
    }
}
