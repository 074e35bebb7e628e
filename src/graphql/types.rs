//! Wire types for the GraphQL schema.
//!
//! Field names follow what the portal pages already send and read, so most
//! fields carry an explicit name instead of the default camel-case rename.

use async_graphql::{ComplexObject, Enum, ID, InputObject, SimpleObject};

use crate::{
    models::{self, Blog, Hospital, NewRecord, Record},
    operations::BlogDraft,
};

/// Blog category.
#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
#[graphql(
    name = "BlogTag",
    remote = "crate::models::BlogTag",
    rename_items = "lowercase"
)]
pub enum BlogTagValue {
    /// Recently published.
    Latest,
    /// Currently popular.
    Trending,
    /// Editor's pick.
    Top,
}

/// Split a comma-joined department list into trimmed names.
fn split_departments(joined: &str) -> Vec<String> {
    joined
        .split([',', '，'])
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
        .collect()
}

/// A hospital listing with bilingual address and departments.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "Hospital")]
pub struct HospitalObject {
    /// Store identifier.
    #[graphql(name = "_id")]
    pub id: ID,
    /// Hospital name.
    pub name: String,
    /// Address in Chinese.
    #[graphql(name = "address_zh")]
    pub address_zh: String,
    /// Address in English.
    #[graphql(name = "address_en")]
    pub address_en: String,
    /// Switchboard number.
    pub phone: String,
    /// Short introduction.
    pub intro: String,
    /// Department names in Chinese.
    #[graphql(name = "departments_zh")]
    pub departments_zh: Vec<String>,
    /// Department names in English.
    #[graphql(name = "departments_en")]
    pub departments_en: Vec<String>,
    /// Path or URL of the listing image.
    #[graphql(name = "img_url")]
    pub img_url: String,
}

impl From<Hospital> for HospitalObject {
    fn from(h: Hospital) -> Self {
        Self {
            id: ID::from(h.id.to_string()),
            departments_zh: split_departments(&h.departments_zh),
            departments_en: split_departments(&h.departments_en),
            name: h.name,
            address_zh: h.address_zh,
            address_en: h.address_en,
            phone: h.phone,
            intro: h.intro,
            img_url: h.img_url,
        }
    }
}

/// A community blog post.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "Blog", complex)]
pub struct BlogObject {
    /// Store identifier.
    #[graphql(name = "_id")]
    pub store_id: ID,
    /// Client-assigned post number.
    pub id: i32,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Author display name.
    pub author: String,
    /// Publication date as `YYYY-MM-DD`.
    #[graphql(name = "publication_date")]
    pub publication_date: String,
    /// Category as stored.
    #[graphql(skip)]
    pub stored_tag: String,
}

#[ComplexObject]
impl BlogObject {
    /// Category.
    async fn tag(&self) -> async_graphql::Result<BlogTagValue> {
        let tag = self.stored_tag.parse::<models::BlogTag>()?;
        Ok(BlogTagValue::from(tag))
    }
}

impl From<Blog> for BlogObject {
    fn from(b: Blog) -> Self {
        Self {
            store_id: ID::from(b.id.to_string()),
            id: b.post_id,
            title: b.title,
            content: b.content,
            author: b.author,
            publication_date: b.publication_date,
            stored_tag: b.tag,
        }
    }
}

/// A blog post submitted from the editor.
#[derive(InputObject, Debug, Clone)]
#[graphql(name = "BlogInput")]
pub struct BlogInput {
    /// Client-assigned post number.
    pub id: i32,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Author display name.
    pub author: String,
    /// Publication date as `YYYY-MM-DD`; empty when omitted.
    #[graphql(name = "publication_date", default)]
    pub publication_date: String,
    /// Category.
    pub tag: BlogTagValue,
}

impl From<BlogInput> for BlogDraft {
    fn from(input: BlogInput) -> Self {
        Self {
            post_id: input.id,
            title: input.title,
            content: input.content,
            author: input.author,
            publication_date: input.publication_date,
            tag: models::BlogTag::from(input.tag),
        }
    }
}

/// A patient's medical record.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "Record")]
pub struct RecordObject {
    /// Store identifier.
    #[graphql(name = "_id")]
    pub id: ID,
    /// Owner email.
    #[graphql(name = "userEm")]
    pub user_em: String,
    /// Diagnosed condition.
    #[graphql(name = "Disease")]
    pub disease: String,
    /// Reported symptoms.
    #[graphql(name = "Symptoms")]
    pub symptoms: String,
    /// Prescribed medications.
    #[graphql(name = "Medications")]
    pub medications: String,
    /// Illness duration.
    #[graphql(name = "Duration")]
    pub duration: String,
    /// Treating hospital.
    #[graphql(name = "Hospital")]
    pub hospital: String,
    /// Treating clinic.
    #[graphql(name = "Clinic")]
    pub clinic: String,
}

impl From<Record> for RecordObject {
    fn from(r: Record) -> Self {
        Self {
            id: ID::from(r.id.to_string()),
            user_em: r.user_em,
            disease: r.disease,
            symptoms: r.symptoms,
            medications: r.medications,
            duration: r.duration,
            hospital: r.hospital,
            clinic: r.clinic,
        }
    }
}

/// A medical record as entered on the records page. Only the owner email
/// is required.
#[derive(InputObject, Debug, Clone, Default)]
#[graphql(name = "RecordInput")]
pub struct RecordInput {
    /// Owner email.
    #[graphql(name = "userEm")]
    pub user_em: String,
    /// Diagnosed condition.
    #[graphql(name = "Disease", default)]
    pub disease: String,
    /// Reported symptoms.
    #[graphql(name = "Symptoms", default)]
    pub symptoms: String,
    /// Prescribed medications.
    #[graphql(name = "Medications", default)]
    pub medications: String,
    /// Illness duration.
    #[graphql(name = "Duration", default)]
    pub duration: String,
    /// Treating hospital.
    #[graphql(name = "Hospital", default)]
    pub hospital: String,
    /// Treating clinic.
    #[graphql(name = "Clinic", default)]
    pub clinic: String,
}

impl From<RecordInput> for NewRecord {
    fn from(input: RecordInput) -> Self {
        Self {
            user_em: input.user_em,
            disease: input.disease,
            symptoms: input.symptoms,
            medications: input.medications,
            duration: input.duration,
            hospital: input.hospital,
            clinic: input.clinic,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("内科,外科,儿科", &["内科", "外科", "儿科"])]
    #[case("Surgery, Pediatrics ,", &["Surgery", "Pediatrics"])]
    #[case("内科，外科", &["内科", "外科"])]
    #[case("", &[])]
    fn splits_department_lists(#[case] joined: &str, #[case] expected: &[&str]) {
        assert_eq!(split_departments(joined), expected);
    }

    #[rstest]
    fn blog_input_maps_tag_through_remote_enum() {
        let draft = BlogDraft::from(BlogInput {
            id: 11,
            title: "X".into(),
            content: "Y".into(),
            author: "Z".into(),
            publication_date: String::new(),
            tag: BlogTagValue::Latest,
        });
        assert_eq!(draft.post_id, 11);
        assert_eq!(draft.tag, models::BlogTag::Latest);
    }

    fn blog(tag: &str) -> BlogObject {
        BlogObject::from(Blog {
            id: 3,
            post_id: 11,
            title: "X".into(),
            content: "Y".into(),
            author: "Z".into(),
            publication_date: "2024-06-10".into(),
            tag: tag.into(),
        })
    }

    #[rstest]
    #[case("latest", BlogTagValue::Latest)]
    #[case("trending", BlogTagValue::Trending)]
    #[case("top", BlogTagValue::Top)]
    #[tokio::test]
    async fn blog_tag_resolves_to_enum(#[case] stored: &str, #[case] expected: BlogTagValue) {
        assert_eq!(blog(stored).tag().await.expect("known tag"), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_stored_tag_is_a_field_error() {
        let err = blog("archived").tag().await.expect_err("unknown tag");
        assert_eq!(err.message, "unknown blog tag 'archived'");
    }
}
