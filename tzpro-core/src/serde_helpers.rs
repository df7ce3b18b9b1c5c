//! Serde helpers for persisted record encodings.

/// Serialize `Option<DateTime<Utc>>` as an ISO-8601 string with millisecond
/// precision and a `Z` suffix (`2024-03-15T14:30:00.000Z`), or `null`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(instant) => {
                serializer.serialize_str(&instant.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(default, with = "super::iso_millis")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn writes_millisecond_precision() {
        let holder = Holder {
            at: Some(Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap()),
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"at":"2024-03-15T14:30:00.000Z"}"#);
    }

    #[test]
    fn reads_null_and_missing() {
        let null: Holder = serde_json::from_str(r#"{"at":null}"#).unwrap();
        let missing: Holder = serde_json::from_str("{}").unwrap();
        assert_eq!(null.at, None);
        assert_eq!(missing.at, None);
    }

    #[test]
    fn reads_offset_timestamps() {
        let holder: Holder = serde_json::from_str(r#"{"at":"2024-03-15T16:30:00+02:00"}"#).unwrap();
        assert_eq!(holder.at, Some(Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap()));
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Holder>(r#"{"at":"yesterday"}"#).is_err());
    }
}
