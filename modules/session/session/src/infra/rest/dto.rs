use serde::{Deserialize, Deserializer};
use session_sdk::UserProfile;

/// Current-user payload. Only the fields the client keeps are read.
#[derive(Debug, Deserialize)]
pub struct ProfileDto {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl From<ProfileDto> for UserProfile {
    fn from(dto: ProfileDto) -> Self {
        Self {
            id: dto.id,
            email: dto.email,
            full_name: dto.full_name,
            role: dto.role,
        }
    }
}

/// Backends disagree on whether ids are numbers or strings.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_ids() {
        let a: ProfileDto =
            serde_json::from_str(r#"{"id":42,"email":"a@x.io","name":"Ana"}"#).unwrap();
        assert_eq!(a.id, "42");
        assert_eq!(a.full_name.as_deref(), Some("Ana"));

        let b: ProfileDto =
            serde_json::from_str(r#"{"id":"u-9","email":"b@x.io","role":"admin"}"#).unwrap();
        let user = UserProfile::from(b);
        assert_eq!(user.id, "u-9");
        assert_eq!(user.role.as_deref(), Some("admin"));
        assert_eq!(user.full_name, None);
    }
}
