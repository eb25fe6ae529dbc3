//! Gateway timestamp format: `YYYY-MM-DDTHH:MM:SS±hhmm` (or a trailing `Z`),
//! with `null` meaning "unset".

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayDateTime(Option<OffsetDateTime>);

impl GatewayDateTime {
    pub fn new(at: OffsetDateTime) -> Self {
        Self(Some(at))
    }

    pub fn get(&self) -> Option<OffsetDateTime> {
        self.0
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn parse(s: &str) -> std::result::Result<Self, time::error::Parse> {
        let normalized = match s.strip_suffix('Z') {
            Some(head) => format!("{head}+0000"),
            None => s.to_string(),
        };
        OffsetDateTime::parse(&normalized, FORMAT).map(|t| Self(Some(t)))
    }
}

impl<'de> Deserialize<'de> for GatewayDateTime {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Self(None)),
            Some(s) if s == "null" => Ok(Self(None)),
            Some(s) => Self::parse(&s).map_err(D::Error::custom),
        }
    }
}

impl Serialize for GatewayDateTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            None => serializer.serialize_none(),
            Some(t) => {
                let s = t.format(FORMAT).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&s)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn offset_and_zulu_forms() {
        let a: GatewayDateTime = serde_json::from_str("\"2021-03-04T05:06:07+0200\"").unwrap();
        let b: GatewayDateTime = serde_json::from_str("\"2021-03-04T03:06:07Z\"").unwrap();
        assert_eq!(a.get().unwrap(), b.get().unwrap());
    }

    #[test]
    fn null_is_unset_and_round_trips() {
        let d: GatewayDateTime = serde_json::from_str("null").unwrap();
        assert!(!d.is_set());
        assert_eq!(serde_json::to_string(&d).unwrap(), "null");

        let s = "\"2021-03-04T05:06:07+0200\"";
        let d: GatewayDateTime = serde_json::from_str(s).unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), s);
    }
}
