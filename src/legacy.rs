//! Legacy per-summary decoding for pre-bulk-export xcresulttool.
//!
//! The legacy `get --format json` output wraps every scalar and list in typed
//! envelopes (`{"_value": ...}` / `{"_values": [...]}`), and attachments live
//! on activities nested arbitrarily deep under each test summary. Decoding
//! flattens all of that into the canonical `Entry`, keeping the payload
//! reference only long enough to export each attachment individually.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Attachment, Entry};

/// Activities of exactly this type hold baseline attachments; attachments on
/// any other activity type are ignored.
pub const ATTACHMENT_CONTAINER_TYPE: &str =
    "com.apple.dt.xctest.activity-type.attachmentContainer";

#[derive(Debug, Deserialize)]
struct TypedString {
    _value: String,
}

#[derive(Debug, Deserialize)]
struct TypedArray<T> {
    _values: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct PayloadRef {
    id: TypedString,
}

#[derive(Debug, Deserialize)]
struct ActivityAttachment {
    filename: TypedString,
    name: TypedString,
    #[serde(rename = "payloadRef")]
    payload_ref: PayloadRef,
    // other fields intentionally ignored
}

#[derive(Debug, Deserialize)]
struct Activity {
    #[serde(rename = "activityType")]
    activity_type: Option<TypedString>,
    attachments: Option<TypedArray<ActivityAttachment>>,
    subactivities: Option<TypedArray<Activity>>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(rename = "activitySummaries")]
    activity_summaries: Option<TypedArray<Activity>>,
    identifier: Option<TypedString>,
}

/// One attachment discovered in a legacy summary. The payload reference is
/// consumed by the per-attachment export and never reaches the canonical
/// model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyAttachment {
    pub exported_file_name: String,
    pub suggested_human_readable_name: String,
    pub payload_reference_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyEntry {
    pub attachments: Vec<LegacyAttachment>,
    pub test_identifier: Option<String>,
}

impl From<LegacyEntry> for Entry {
    fn from(legacy: LegacyEntry) -> Self {
        Self {
            attachments: legacy
                .attachments
                .into_iter()
                .map(|attachment| Attachment {
                    exported_file_name: attachment.exported_file_name,
                    suggested_human_readable_name: attachment.suggested_human_readable_name,
                })
                .collect(),
            test_identifier: legacy.test_identifier,
        }
    }
}

/// Decode one `get --format json` document into a flattened legacy entry.
pub fn decode_summary(data: &str) -> Result<LegacyEntry> {
    let summary: Summary = serde_json::from_str(data).context("decode test summary")?;
    let roots = summary
        .activity_summaries
        .map(|activities| activities._values)
        .unwrap_or_default();
    Ok(LegacyEntry {
        attachments: collect_attachments(&roots),
        test_identifier: summary.identifier.map(|identifier| identifier._value),
    })
}

// Depth-first over an explicit worklist so deeply nested activity trees
// cannot overflow the stack. Children are pushed in reverse to preserve
// document order.
fn collect_attachments(roots: &[Activity]) -> Vec<LegacyAttachment> {
    let mut out = Vec::new();
    let mut stack: Vec<&Activity> = roots.iter().rev().collect();
    while let Some(activity) = stack.pop() {
        let is_container = activity
            .activity_type
            .as_ref()
            .is_some_and(|activity_type| activity_type._value == ATTACHMENT_CONTAINER_TYPE);
        if is_container {
            if let Some(attachments) = &activity.attachments {
                for attachment in &attachments._values {
                    out.push(LegacyAttachment {
                        exported_file_name: attachment.name._value.clone(),
                        suggested_human_readable_name: attachment.filename._value.clone(),
                        payload_reference_id: attachment.payload_ref.id._value.clone(),
                    });
                }
            }
        }
        if let Some(subactivities) = &activity.subactivities {
            stack.extend(subactivities._values.iter().rev());
        }
    }
    out
}
