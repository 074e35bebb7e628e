//! Row types for the five collections.
//!
//! Queryable structs mirror the column order in [`crate::schema`]. Insertable
//! structs carry everything except the store-generated identifier.

use std::{fmt, str::FromStr};

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored user account.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Store-generated identifier.
    #[serde(rename = "_id")]
    pub id: i32,
    /// Login email; unique.
    pub email: String,
    /// Argon2 PHC string. Absent for accounts created through Google sign-in.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// First name captured at signup.
    pub first_name: Option<String>,
    /// Last name captured at signup.
    pub last_name: Option<String>,
    /// Given name, copied from the first name or supplied by Google.
    pub given_name: Option<String>,
    /// Family name supplied by Google.
    pub family_name: Option<String>,
    /// Display name supplied by Google.
    pub name: Option<String>,
}

/// Insertable user account.
#[derive(Insertable, Debug, Default)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    /// Login email.
    pub email: &'a str,
    /// Argon2 PHC string.
    pub password: Option<&'a str>,
    /// First name.
    pub first_name: Option<&'a str>,
    /// Last name.
    pub last_name: Option<&'a str>,
    /// Given name.
    pub given_name: Option<&'a str>,
    /// Family name.
    pub family_name: Option<&'a str>,
    /// Display name.
    pub name: Option<&'a str>,
}

/// Blog post category shown on the community page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogTag {
    /// Recently published.
    Latest,
    /// Currently popular.
    Trending,
    /// Editor's pick.
    Top,
}

impl BlogTag {
    /// Storage representation of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Trending => "trending",
            Self::Top => "top",
        }
    }
}

impl fmt::Display for BlogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Returned when a stored tag is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown blog tag '{0}'")]
pub struct UnknownBlogTag(pub String);

impl FromStr for BlogTag {
    type Err = UnknownBlogTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(Self::Latest),
            "trending" => Ok(Self::Trending),
            "top" => Ok(Self::Top),
            other => Err(UnknownBlogTag(other.to_owned())),
        }
    }
}

/// Stored blog post.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Blog {
    /// Store-generated identifier.
    pub id: i32,
    /// Client-assigned post number.
    pub post_id: i32,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Author display name.
    pub author: String,
    /// Publication date as `YYYY-MM-DD`.
    pub publication_date: String,
    /// One of `latest`, `trending`, `top`.
    pub tag: String,
}

/// Insertable blog post.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::blogs)]
pub struct NewBlog<'a> {
    /// Client-assigned post number.
    pub post_id: i32,
    /// Headline.
    pub title: &'a str,
    /// Body text.
    pub content: &'a str,
    /// Author display name.
    pub author: &'a str,
    /// Publication date.
    pub publication_date: &'a str,
    /// Tag, stored as text.
    pub tag: &'a str,
}

/// Stored medical record.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Store-generated identifier.
    pub id: i32,
    /// Owner email.
    pub user_em: String,
    /// Diagnosed disease.
    pub disease: String,
    /// Reported symptoms.
    pub symptoms: String,
    /// Prescribed medications.
    pub medications: String,
    /// Duration, free text.
    pub duration: String,
    /// Treating hospital.
    pub hospital: String,
    /// Treating clinic.
    pub clinic: String,
}

/// Insertable medical record.
#[derive(Insertable, Debug, Clone, PartialEq, Eq, Default)]
#[diesel(table_name = crate::schema::records)]
pub struct NewRecord {
    /// Owner email.
    pub user_em: String,
    /// Diagnosed disease.
    pub disease: String,
    /// Reported symptoms.
    pub symptoms: String,
    /// Prescribed medications.
    pub medications: String,
    /// Duration, free text.
    pub duration: String,
    /// Treating hospital.
    pub hospital: String,
    /// Treating clinic.
    pub clinic: String,
}

/// Stored hospital listing.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Hospital {
    /// Store-generated identifier.
    pub id: i32,
    /// Hospital name.
    pub name: String,
    /// Address in Chinese.
    pub address_zh: String,
    /// Address in English.
    pub address_en: String,
    /// Contact number.
    pub phone: String,
    /// Short description.
    pub intro: String,
    /// Comma-joined department names in Chinese.
    pub departments_zh: String,
    /// Comma-joined department names in English.
    pub departments_en: String,
    /// Image location.
    pub img_url: String,
}

/// Insertable hospital listing.
#[derive(Insertable, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::hospitals)]
pub struct NewHospital<'a> {
    /// Hospital name.
    pub name: &'a str,
    /// Address in Chinese.
    pub address_zh: &'a str,
    /// Address in English.
    pub address_en: &'a str,
    /// Contact number.
    pub phone: &'a str,
    /// Short description.
    pub intro: &'a str,
    /// Comma-joined department names in Chinese.
    pub departments_zh: &'a str,
    /// Comma-joined department names in English.
    pub departments_en: &'a str,
    /// Image location.
    pub img_url: &'a str,
}

/// Stored appointment booking.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    /// Store-generated identifier.
    #[serde(rename = "_id")]
    pub id: i32,
    /// Patient name.
    pub name: String,
    /// Patient email.
    pub email: String,
    /// Patient phone.
    pub phone: String,
    /// Hospital name.
    pub hospital: String,
    /// Department name.
    pub department: String,
    /// Requested date.
    pub date: String,
    /// Requested time slot.
    pub timeslot: String,
    /// Whether staff have approved the booking.
    pub approved: bool,
}

/// Insertable appointment booking.
#[derive(Insertable, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[diesel(table_name = crate::schema::appointments)]
pub struct NewAppointment {
    /// Patient name.
    pub name: String,
    /// Patient email.
    pub email: String,
    /// Patient phone.
    pub phone: String,
    /// Hospital name.
    pub hospital: String,
    /// Department name.
    pub department: String,
    /// Requested date.
    pub date: String,
    /// Requested time slot.
    pub timeslot: String,
    /// Approval flag; new bookings start unapproved.
    #[serde(skip, default)]
    pub approved: bool,
}
