//! Property tests for relative URL resolution.

use api_exchange::environment::{resolve_url, ActiveEnvironment};
use api_exchange::executor::RequestError;
use proptest::prelude::*;

struct Fixed(String);

impl ActiveEnvironment for Fixed {
    fn active_base_url(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

struct Inactive;

impl ActiveEnvironment for Inactive {
    fn active_base_url(&self) -> Option<String> {
        None
    }
}

fn base_url() -> impl Strategy<Value = String> {
    ("https?", "[a-z]{1,12}(\\.[a-z]{2,5}){0,2}", "(/[a-z0-9]{1,8}){0,2}", "/?")
        .prop_map(|(scheme, host, path, slash)| format!("{}://{}{}{}", scheme, host, path, slash))
}

fn relative_path() -> impl Strategy<Value = String> {
    ("/?", "[a-z0-9_-]{1,10}(/[a-z0-9_-]{1,10}){0,3}")
        .prop_map(|(slash, rest)| format!("{}{}", slash, rest))
}

proptest! {
    #[test]
    fn absolute_urls_are_unchanged(url in base_url()) {
        prop_assert_eq!(resolve_url(&url, &Inactive).unwrap(), url.clone());
        prop_assert_eq!(resolve_url(&url, &Fixed("http://other".into())).unwrap(), url);
    }

    #[test]
    fn relative_urls_join_with_one_slash(base in base_url(), path in relative_path()) {
        let resolved = resolve_url(&path, &Fixed(base.clone())).unwrap();

        let trimmed_base = base.strip_suffix('/').unwrap_or(&base);
        let trimmed_path = path.strip_prefix('/').unwrap_or(&path);
        prop_assert_eq!(&resolved, &format!("{}/{}", trimmed_base, trimmed_path));
        prop_assert!(resolved.starts_with(trimmed_base));
        prop_assert!(resolved.ends_with(trimmed_path));
    }

    #[test]
    fn relative_urls_need_an_environment(path in relative_path()) {
        prop_assert!(matches!(
            resolve_url(&path, &Inactive),
            Err(RequestError::NoActiveEnvironment)
        ));
    }
}
