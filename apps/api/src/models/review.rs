use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{de_id, de_lenient_f64, de_lenient_timestamp};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewUser {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    pub user: ReviewUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_list_entry_parses() {
        let json = r#"[{
            "id": 1,
            "rating": 4.5,
            "comment": "Muy claro",
            "created_at": "2024-03-02T10:15:00.000000Z",
            "user": {"id": 9, "name": "Ana"}
        }]"#;
        let reviews: Vec<Review> = serde_json::from_str(json).unwrap();
        assert_eq!(reviews[0].user.id, "9");
        assert_eq!(reviews[0].rating, Some(4.5));
        assert!(reviews[0].created_at.is_some());
    }

    #[test]
    fn test_review_accepts_space_separated_timestamp() {
        let json = r#"{
            "id": "3",
            "rating": "5",
            "created_at": "2024-03-02 10:15:00",
            "user": {"id": "9"}
        }"#;
        let review: Review = serde_json::from_str(json).unwrap();
        let expected = chrono::NaiveDate::from_ymd_opt(2024, 3, 2)
            .and_then(|d| d.and_hms_opt(10, 15, 0))
            .unwrap()
            .and_utc();
        assert_eq!(review.created_at, Some(expected));
    }

    #[test]
    fn test_review_with_unreadable_timestamp_still_parses() {
        let json = r#"[
            {"id": 1, "rating": 4, "created_at": "hace 2 días", "user": {"id": 9}},
            {"id": 2, "rating": 3, "created_at": null, "user": {"id": 10}},
            {"id": 3, "rating": 5, "created_at": 1709374500, "user": {"id": 11}}
        ]"#;
        let reviews: Vec<Review> = serde_json::from_str(json).unwrap();
        assert_eq!(reviews.len(), 3);
        assert!(reviews.iter().all(|r| r.created_at.is_none()));
        assert_eq!(reviews[0].user.id, "9");
    }
}
