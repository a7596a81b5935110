//! Read projections returned to front ends.
//!
//! Projections are composed rather than layered: `CowView` is the base cow
//! projection and `CowDetailView` decorates it with the nested record list.

use super::cow::{Cow, CowNumber, Sex};
use super::record::Record;
use super::{CowId, RecordId};
use chrono::NaiveDate;
use serde::Serialize;

/// Base cow projection used by list and detail endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CowView {
    pub id: CowId,
    pub number: CowNumber,
    pub sex: Sex,
    pub birthday: Option<NaiveDate>,
    pub mother_number: Option<CowNumber>,
    /// Id of the owner's cow whose number equals `mother_number`, if any.
    pub mother_id: Option<CowId>,
    pub deleted: bool,
    pub created: i64,
    pub summary: String,
}

impl CowView {
    /// Projects a stored cow with its already-resolved lineage.
    pub fn project(cow: &Cow, mother_id: Option<CowId>) -> Self {
        Self {
            id: cow.id,
            number: cow.number.clone(),
            sex: cow.sex,
            birthday: cow.birthday,
            mother_number: cow.mother_number.clone(),
            mother_id,
            deleted: cow.deleted,
            created: cow.created_at,
            summary: cow.summary(),
        }
    }
}

/// Cow projection with nested records, used by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CowDetailView {
    #[serde(flatten)]
    pub cow: CowView,
    pub records: Vec<RecordView>,
}

impl CowDetailView {
    pub fn with_records(cow: CowView, records: &[Record]) -> Self {
        Self {
            cow,
            records: records.iter().map(RecordView::from).collect(),
        }
    }
}

/// Record projection; the owner is implied by the request and omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordView {
    pub id: RecordId,
    pub cow: CowId,
    pub content: String,
    pub etc: Option<String>,
    pub day: NaiveDate,
    pub created: i64,
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            cow: record.cow_id,
            content: record.content.clone(),
            etc: record.etc.clone(),
            day: record.day,
            created: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CowDetailView, CowView};
    use crate::model::cow::{Cow, CowNumber, Sex};
    use crate::model::record::Record;
    use chrono::NaiveDate;
    use serde_json::json;

    fn sample_cow() -> Cow {
        Cow {
            id: 3,
            owner_id: 1,
            number: CowNumber::parse("002-1023-1203-1").unwrap(),
            sex: Sex::Female,
            birthday: NaiveDate::from_ymd_opt(2020, 1, 2),
            mother_number: None,
            deleted: false,
            created_at: 1_600_000_000_000,
        }
    }

    #[test]
    fn detail_view_flattens_base_projection() {
        let record = Record {
            id: 9,
            owner_id: 1,
            cow_id: 3,
            content: "weighed".to_string(),
            etc: None,
            day: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
            created_at: 1_600_000_000_500,
        };
        let view = CowDetailView::with_records(CowView::project(&sample_cow(), None), &[record]);

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["number"], json!("002-1023-1203-1"));
        assert_eq!(value["sex"], json!("female"));
        assert_eq!(value["birthday"], json!("2020-01-02"));
        assert_eq!(value["mother_id"], json!(null));
        assert_eq!(value["summary"], json!("203♀"));
        assert_eq!(value["records"][0]["cow"], json!(3));
        assert_eq!(value["records"][0]["day"], json!("2021-06-01"));
        assert!(value["records"][0].get("owner_id").is_none());
    }
}
