use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

const ICON_BASE: &str = "https://www.hko.gov.hk/en/wxinfo/dailywx/images/";

/// Icon file for each warning signal subtype.
const WARNING_ICONS: [(&str, &str); 21] = [
    ("WFIREY", "firey.gif"),
    ("WFIRER", "firer.gif"),
    ("WFROST", "frost.gif"),
    ("WHOT", "vhot.gif"),
    ("WCOLD", "cold.gif"),
    ("WMSGNL", "sms.gif"),
    ("WRAINA", "raina.gif"),
    ("WRAINR", "rainr.gif"),
    ("WRAINB", "rainb.gif"),
    ("WFNTSA", "ntfl.gif"),
    ("WL", "landslip.gif"),
    ("TC1", "tc1.gif"),
    ("TC3", "tc3.gif"),
    ("TC8NE", "tc8ne.gif"),
    ("TC8SE", "tc8b.gif"),
    ("TC8NW", "tc8d.gif"),
    ("TC8SW", "tc8c.gif"),
    ("TC9", "tc9.gif"),
    ("TC10", "tc10.gif"),
    ("WTMW", "tsunami-warn.gif"),
    ("WTS", "ts.gif"),
];

pub fn warning_icon_url(code: &str) -> Option<String> {
    WARNING_ICONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, file)| format!("{ICON_BASE}{file}"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarningInfo {
    /// Warning statement key, e.g. `WRAIN`.
    pub key: String,
    /// Signal subtype, e.g. `WRAINA`; falls back to the key.
    pub code: String,
    pub name: String,
    pub action_code: Option<String>,
    pub issue_time: Option<DateTime<FixedOffset>>,
    pub icon_url: Option<String>,
}

impl WarningInfo {
    pub fn is_cancelled(&self) -> bool {
        self.code == "CANCEL" || self.action_code.as_deref() == Some("CANCEL")
    }
}

pub type WarningsByCode = BTreeMap<String, WarningInfo>;

// Wire format of one `dataType=warnsum` entry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WarningEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    action_code: Option<String>,
    #[serde(default)]
    issue_time: Option<DateTime<FixedOffset>>,
}

pub(crate) fn into_warnings(raw: BTreeMap<String, WarningEntry>) -> WarningsByCode {
    raw.into_iter()
        .map(|(key, entry)| {
            let code = entry.code.unwrap_or_else(|| key.clone());
            let info = WarningInfo {
                name: entry.name.unwrap_or_else(|| code.clone()),
                icon_url: warning_icon_url(&code),
                action_code: entry.action_code,
                issue_time: entry.issue_time,
                key: key.clone(),
                code,
            };
            (key, info)
        })
        .collect()
}

/// Warnings currently in force that have a signal icon, in key order.
pub fn active_warnings(warnings: &WarningsByCode) -> Vec<&WarningInfo> {
    warnings
        .values()
        .filter(|w| !w.is_cancelled() && w.icon_url.is_some())
        .collect()
}
