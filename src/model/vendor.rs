use std::collections::BTreeMap;

/// Platform-specific parameters (`mysql`, `pgsql`, ...) attached to a model
/// element. Only platform emitters read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorInfo {
    pub vendor_type: String,
    pub parameters: BTreeMap<String, String>,
}

impl VendorInfo {
    pub fn new(vendor_type: impl Into<String>) -> Self {
        Self {
            vendor_type: vendor_type.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(|s| s.as_str())
    }

    pub fn is_for(&self, vendor_type: &str) -> bool {
        self.vendor_type.eq_ignore_ascii_case(vendor_type)
    }
}

/// Look up a vendor parameter for one platform in a vendor list.
pub fn vendor_parameter<'a>(vendor: &'a [VendorInfo], vendor_type: &str, name: &str) -> Option<&'a str> {
    vendor
        .iter()
        .filter(|v| v.is_for(vendor_type))
        .find_map(|v| v.parameter(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_parameter_lookup() {
        let vendor = vec![
            VendorInfo::new("pgsql").with_parameter("Engine", "none"),
            VendorInfo::new("mysql").with_parameter("Engine", "MyISAM"),
        ];
        assert_eq!(vendor_parameter(&vendor, "mysql", "Engine"), Some("MyISAM"));
        assert_eq!(vendor_parameter(&vendor, "MYSQL", "Engine"), Some("MyISAM"));
        assert_eq!(vendor_parameter(&vendor, "oracle", "Engine"), None);
    }
}
