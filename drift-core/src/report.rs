use crate::recorder::{DriftStore, RunMetadata};
use crate::schema_drift::DriftKind;
use crate::tracking::TrackingMap;
use serde::Serialize;

/// 受影响的一个位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub section: String,
    pub host: String,
    pub database: String,
}

/// 一个漂移键的汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub key: String,
    pub title: String,
    pub section_count: usize,
    pub sections: Vec<String>,
    pub tracked: Option<String>,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftReport {
    pub metadata: RunMetadata,
    pub entries: Vec<ReportEntry>,
}

/// 汇总漂移结果：按受影响分片数降序，相同时按漂移键排序
pub fn build_report(store: &DriftStore, tracked: &TrackingMap, untracked_only: bool) -> DriftReport {
    let mut entries: Vec<ReportEntry> = store
        .drifts
        .iter()
        .filter(|(key, _)| !(untracked_only && tracked.contains_key(*key)))
        .map(|(key, sections)| ReportEntry {
            key: key.clone(),
            title: title_for(key),
            section_count: sections.len(),
            sections: sections.keys().cloned().collect(),
            tracked: tracked.get(key).cloned(),
            rows: sections
                .iter()
                .flat_map(|(section, locations)| {
                    locations.iter().map(move |location| split_location(section, location))
                })
                .collect(),
        })
        .collect();

    // 稳定排序，BTreeMap 已按键有序
    entries.sort_by(|a, b| b.section_count.cmp(&a.section_count));

    DriftReport {
        metadata: store.metadata.clone(),
        entries,
    }
}

/// 漂移键 `<table> <element> <kind>` 的可读标题，无法识别时原样返回
pub fn title_for(key: &str) -> String {
    let parts: Vec<&str> = key.split_whitespace().collect();
    let Some(kind) = parts.last().and_then(|token| DriftKind::parse(token)) else {
        return key.to_string();
    };
    let table = parts.first().copied().unwrap_or_default();
    let element = if parts.len() > 2 { parts[1] } else { "" };

    kind.title_template()
        .replace("{table}", table)
        .replace("{element}", element)
}

/// `host[:port]:database` 在最后一个冒号处拆开
fn split_location(section: &str, location: &str) -> ReportRow {
    let (host, database) = location.rsplit_once(':').unwrap_or((location, ""));
    ReportRow {
        section: section.to_string(),
        host: host.to_string(),
        database: database.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DriftStore {
        let mut store = DriftStore::new(1.0);
        store.insert("page page_len field-nullable-mismatch", "s1", "db1001:enwiki");
        store.insert("revision rev_id field-unsigned-mismatch", "s1", "db1002:3311:enwiki");
        store.insert("revision rev_id field-unsigned-mismatch", "s2", "db2001:bgwiki");
        store.insert("revision rev_id field-unsigned-mismatch", "s2", "db2001:cswiki");
        store.insert("archive ar_page_id index-mismatch-prod-extra", "s3", "db3001:frwiki");
        store
    }

    #[test]
    fn test_titles() {
        assert_eq!(
            title_for("page page_counter field-mismatch-prod-extra"),
            "Extra field page.page_counter in production"
        );
        assert_eq!(
            title_for("logging log_legacy index-mismatch-prod-extra"),
            "Extra index log_legacy in production on table logging"
        );
        assert_eq!(
            title_for("categorylinks PRIMARY primary-key-mismatch"),
            "Mismatching primary key on table categorylinks"
        );
        assert_eq!(title_for("odd key shape"), "odd key shape");
    }

    #[test]
    fn test_report_ordering_and_rows() {
        let report = build_report(&store(), &TrackingMap::new(), false);

        let keys: Vec<&str> = report.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "revision rev_id field-unsigned-mismatch",
                "archive ar_page_id index-mismatch-prod-extra",
                "page page_len field-nullable-mismatch",
            ]
        );

        let first = &report.entries[0];
        assert_eq!(first.section_count, 2);
        assert_eq!(first.sections, vec!["s1", "s2"]);
        assert_eq!(first.rows.len(), 3);
        assert_eq!(
            first.rows[0],
            ReportRow {
                section: "s1".to_string(),
                host: "db1002:3311".to_string(),
                database: "enwiki".to_string(),
            }
        );
    }

    #[test]
    fn test_untracked_only() {
        let mut tracked = TrackingMap::new();
        tracked.insert("revision rev_id field-unsigned-mismatch".to_string(), "T1".to_string());

        let all = build_report(&store(), &tracked, false);
        assert_eq!(all.entries.len(), 3);
        assert_eq!(all.entries[0].tracked.as_deref(), Some("T1"));

        let untracked = build_report(&store(), &tracked, true);
        assert_eq!(untracked.entries.len(), 2);
        assert!(untracked.entries.iter().all(|e| e.tracked.is_none()));
    }
}
