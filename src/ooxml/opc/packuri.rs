/// Provides the PackURI value type used to address parts inside an OPC package.
///
/// A PackURI is an absolute part name such as `/xl/worksheets/sheet1.xml`.
/// Relationship targets are resolved onto PackURIs before the ZIP member
/// is looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/xl/workbook.xml")
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string.
    ///
    /// # Errors
    /// Returns an error message if the URI doesn't start with a forward slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Resolve a relationship target against the directory of its source part.
    ///
    /// Targets starting with `/` are already absolute (some producers write
    /// `/xl/worksheets/sheet1.xml`) and only get normalized.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else {
            Self::join_paths(base_uri, relative_ref)
        };
        Self::new(Self::normalize_path(&joined))
    }

    /// Get the base URI (directory portion) of this PackURI.
    ///
    /// For example, "/xl/worksheets" for "/xl/worksheets/sheet1.xml".
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion of this PackURI.
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Get the ZIP member name (URI with leading slash stripped).
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Get the PackURI of the .rels part corresponding to this PackURI.
    ///
    /// For example, "/xl/_rels/workbook.xml.rels" for "/xl/workbook.xml".
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        let base_uri = self.base_uri();
        let rels_uri = if base_uri == "/" {
            format!("/_rels/{}.rels", self.filename())
        } else {
            format!("{}/_rels/{}.rels", base_uri, self.filename())
        };
        Self::new(rels_uri)
    }

    /// Get the full URI string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    fn join_paths(base: &str, rel: &str) -> String {
        if base.ends_with('/') {
            format!("{}{}", base, rel)
        } else {
            format!("{}/{}", base, rel)
        }
    }

    /// Resolve "." and ".." segments.
    fn normalize_path(path: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();

        for part in path.split('/') {
            match part {
                "" | "." => {},
                ".." => {
                    parts.pop();
                },
                _ => parts.push(part),
            }
        }

        format!("/{}", parts.join("/"))
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packuri_new() {
        assert!(PackURI::new("/xl/workbook.xml").is_ok());
        assert!(PackURI::new("xl/workbook.xml").is_err());
    }

    #[test]
    fn test_base_uri_and_filename() {
        let uri = PackURI::new("/xl/worksheets/sheet1.xml").unwrap();
        assert_eq!(uri.base_uri(), "/xl/worksheets");
        assert_eq!(uri.filename(), "sheet1.xml");
        assert_eq!(uri.membername(), "xl/worksheets/sheet1.xml");

        let root = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(root.base_uri(), "/");
        assert_eq!(root.membername(), "");
    }

    #[test]
    fn test_from_rel_ref() {
        let uri = PackURI::from_rel_ref("/xl", "worksheets/sheet1.xml").unwrap();
        assert_eq!(uri.as_str(), "/xl/worksheets/sheet1.xml");

        let uri = PackURI::from_rel_ref("/xl/worksheets", "../comments1.xml").unwrap();
        assert_eq!(uri.as_str(), "/xl/comments1.xml");

        let uri = PackURI::from_rel_ref("/xl", "/xl/sharedStrings.xml").unwrap();
        assert_eq!(uri.as_str(), "/xl/sharedStrings.xml");

        let uri = PackURI::from_rel_ref("/", "xl/workbook.xml").unwrap();
        assert_eq!(uri.as_str(), "/xl/workbook.xml");
    }

    #[test]
    fn test_rels_uri() {
        let uri = PackURI::new("/xl/workbook.xml").unwrap();
        assert_eq!(uri.rels_uri().unwrap().as_str(), "/xl/_rels/workbook.xml.rels");

        let root = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(root.rels_uri().unwrap().as_str(), "/_rels/.rels");
    }
}
