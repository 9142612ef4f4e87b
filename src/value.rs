//! Conversions from domain types into template [`Value`]s. Field names are
//! capitalized so templates read the same as their Go `text/template`
//! counterparts (`{{.Title}}`, `{{.URL}}`, ...).

use crate::post::Post;
use gtmpl_value::Value;
use std::collections::HashMap;

impl From<&Post> for Value {
    /// Converts a [`Post`] into a [`Value::Object`] with the fields `Title`,
    /// `Date`, `URL`, and `Content`.
    fn from(p: &Post) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Title".to_owned(), (&p.title).into());
        m.insert("Date".to_owned(), (&p.date).into());
        m.insert("URL".to_owned(), (&p.url).into());
        m.insert("Content".to_owned(), (&p.content).into());
        Value::Object(m)
    }
}

/// Converts an ordered slice of posts into a [`Value::Array`], preserving
/// order. This is the data context of the index template.
pub fn posts_to_value(posts: &[Post]) -> Value {
    Value::Array(posts.iter().map(Value::from).collect())
}
