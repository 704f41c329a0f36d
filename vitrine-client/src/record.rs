use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user record as served by the profile endpoint.
///
/// Only the fields the profile view displays are required; a record missing
/// one of them fails to parse. Everything else the server sends is carried in
/// `extra` and serializes back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    pub email: String,
    pub company: Company,
    pub address: Address,
    pub phone: String,
    pub website: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProfileRecord {
    /// Label/value pairs in display order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Name", self.name.as_str()),
            ("Email", self.email.as_str()),
            ("Company", self.company.name.as_str()),
            ("City", self.address.city.as_str()),
            ("Phone", self.phone.as_str()),
            ("Website", self.website.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_extra_fields() {
        let json = r#"{
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {"street": "Kulas Light", "city": "Gwenborough"},
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {"name": "Romaguera-Crona", "bs": "harness real-time e-markets"}
        }"#;

        let record: ProfileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "Leanne Graham");
        assert_eq!(record.company.name, "Romaguera-Crona");
        assert_eq!(record.address.city, "Gwenborough");
        assert_eq!(record.extra["username"], "Bret");
        assert_eq!(record.address.extra["street"], "Kulas Light");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["id"], 1);
        assert_eq!(back["username"], "Bret");
        assert_eq!(back["address"]["street"], "Kulas Light");
        assert_eq!(back["company"]["bs"], "harness real-time e-markets");
        assert_eq!(back["name"], "Leanne Graham");
    }

    #[test]
    fn test_parse_rejects_missing_company() {
        let json = r#"{"name":"A","email":"a@b.com","address":{"city":"X"},"phone":"1","website":"w"}"#;
        let result = serde_json::from_str::<ProfileRecord>(json);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("company"));
    }

    #[test]
    fn test_fields_order() {
        let record = ProfileRecord {
            name: "Leanne".to_string(),
            email: "a@b.com".to_string(),
            company: Company {
                name: "Co".to_string(),
                ..Default::default()
            },
            address: Address {
                city: "X".to_string(),
                ..Default::default()
            },
            phone: "1".to_string(),
            website: "w".to_string(),
            ..Default::default()
        };

        let labels: Vec<&str> = record.fields().iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec!["Name", "Email", "Company", "City", "Phone", "Website"]
        );
        assert_eq!(record.fields()[2].1, "Co");
    }
}
