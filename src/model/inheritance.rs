/// One class of a single-table inheritance hierarchy, keyed by the value
/// stored in the discriminator column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inheritance {
    pub key: String,
    pub class_name: String,
    pub ancestor: Option<String>,
}

impl Inheritance {
    pub fn new(key: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            class_name: class_name.into(),
            ancestor: None,
        }
    }
}
