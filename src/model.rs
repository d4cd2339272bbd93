use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The document body of a book, everything except the store-assigned id.
///
/// `publishedYear` and `rating` are kept as whatever JSON the client sent;
/// the store schema decides what it accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<Value>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub genre: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// A lone tag is stored as a one-tag list, `null` as an empty one.
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(tag)) => vec![tag],
        Some(OneOrMany::Many(tags)) => tags,
        None => vec![],
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: BookFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_fields_keep_the_sent_json() {
        let fields: BookFields = serde_json::from_value(json!({
            "title": "Dune",
            "publishedYear": "1965",
            "rating": 4.5
        }))
        .unwrap();

        assert_eq!(fields.published_year, Some(json!("1965")));
        assert_eq!(fields.rating, Some(json!(4.5)));
    }

    #[test]
    fn genre_accepts_a_single_tag() {
        let single: BookFields = serde_json::from_value(json!({ "genre": "Fiction" })).unwrap();
        assert_eq!(single.genre, vec!["Fiction"]);

        let many: BookFields = serde_json::from_value(json!({ "genre": ["Fiction", "Drama"] })).unwrap();
        assert_eq!(many.genre, vec!["Fiction", "Drama"]);

        let null: BookFields = serde_json::from_value(json!({ "genre": null })).unwrap();
        assert!(null.genre.is_empty());
    }
}
