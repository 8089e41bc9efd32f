use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    InPerson,
    Phone,
    Video,
}

impl InterviewType {
    pub const ALL: [InterviewType; 3] = [
        InterviewType::InPerson,
        InterviewType::Phone,
        InterviewType::Video,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::InPerson => "in_person",
            InterviewType::Phone => "phone",
            InterviewType::Video => "video",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InterviewType::InPerson => "In Person",
            InterviewType::Phone => "Phone",
            InterviewType::Video => "Video Call",
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InterviewType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown interview type: {}", s))
    }
}

/// Where the interview happens; the payload depends on the medium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterviewVenue {
    InPerson { address: String },
    Phone { number: String },
    Video { link: Url },
}

impl InterviewVenue {
    /// Builds the venue from the stored medium and its free-text field.
    pub fn parse(medium: InterviewType, location_or_link: &str) -> Result<Self, &'static str> {
        let value = location_or_link.trim();
        if value.is_empty() {
            return Err(match medium {
                InterviewType::InPerson => "An address is required for in-person interviews.",
                InterviewType::Phone => "A phone number is required for phone interviews.",
                InterviewType::Video => "A call link is required for video interviews.",
            });
        }
        match medium {
            InterviewType::InPerson => Ok(InterviewVenue::InPerson {
                address: value.to_string(),
            }),
            InterviewType::Phone => Ok(InterviewVenue::Phone {
                number: value.to_string(),
            }),
            InterviewType::Video => match Url::parse(value) {
                Ok(link) if matches!(link.scheme(), "http" | "https") => {
                    Ok(InterviewVenue::Video { link })
                }
                _ => Err("Enter a valid http(s) link for the video call."),
            },
        }
    }

    pub fn medium(&self) -> InterviewType {
        match self {
            InterviewVenue::InPerson { .. } => InterviewType::InPerson,
            InterviewVenue::Phone { .. } => InterviewType::Phone,
            InterviewVenue::Video { .. } => InterviewType::Video,
        }
    }

    pub fn location_or_link(&self) -> String {
        match self {
            InterviewVenue::InPerson { address } => address.clone(),
            InterviewVenue::Phone { number } => number.clone(),
            InterviewVenue::Video { link } => link.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: i64,
    pub application_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub interview_type: InterviewType,
    pub location_or_link: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// An interview with the job it belongs to, for the applicant's dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewWithJob {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub interview: Interview,
    pub job_id: i64,
    pub job_title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venue_payload_follows_the_medium() {
        let venue = InterviewVenue::parse(InterviewType::InPerson, " 1 Main St ").unwrap();
        assert_eq!(
            venue,
            InterviewVenue::InPerson {
                address: "1 Main St".into()
            }
        );
        assert_eq!(venue.medium(), InterviewType::InPerson);

        let venue =
            InterviewVenue::parse(InterviewType::Video, "https://meet.example.com/abc").unwrap();
        assert_eq!(venue.medium(), InterviewType::Video);
        assert_eq!(venue.location_or_link(), "https://meet.example.com/abc");
    }

    #[test]
    fn video_requires_a_web_link() {
        assert!(InterviewVenue::parse(InterviewType::Video, "Room 4B").is_err());
        assert!(InterviewVenue::parse(InterviewType::Video, "ftp://files.example.com").is_err());
        assert!(InterviewVenue::parse(InterviewType::Phone, "Room 4B").is_ok());
    }

    #[test]
    fn blank_location_is_rejected_for_every_medium() {
        for medium in InterviewType::ALL {
            assert!(InterviewVenue::parse(medium, "   ").is_err());
        }
    }
}
