use serde::Serializer;

/// Serialize an absent string as `""` instead of `null`
///
/// The registration endpoint expects every key to be present with a string value.
pub fn serialize_empty_if_none<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct TestStruct {
        #[serde(serialize_with = "serialize_empty_if_none")]
        inn: Option<String>,
    }

    #[test]
    fn test_none_becomes_empty_string() {
        let json = serde_json::to_string(&TestStruct { inn: None }).unwrap();
        assert_eq!(json, r#"{"inn":""}"#);
    }

    #[test]
    fn test_some_is_kept() {
        let json = serde_json::to_string(&TestStruct { inn: Some("7701234567".to_string()) }).unwrap();
        assert_eq!(json, r#"{"inn":"7701234567"}"#);
    }
}
