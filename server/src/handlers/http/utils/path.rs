/// Final non-empty segment of a request path, used for the `:id` of routes
/// like `/products/:id` and `/products/reactivate/:id`.
pub fn path_id(path: &str) -> Option<&str> {
    path.split('?')
        .next()
        .unwrap_or(path)
        .rsplit('/')
        .find(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_last_segment() {
        assert_eq!(path_id("/api/v1/products/abc"), Some("abc"));
        assert_eq!(path_id("/api/v1/products/reactivate/abc/"), Some("abc"));
        assert_eq!(path_id("/api/v1/users/userProfile/42?x=1"), Some("42"));
        assert_eq!(path_id("/"), None);
    }
}
