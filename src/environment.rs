use crate::Store;

use regex::{Captures, Regex};
use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    sync::LazyLock,
};

/// Describes a set of variables that can be substituted into source text before
/// macros are expanded.
pub trait Environment {
    /// Return the value of the named variable, or `None` if it is not defined.
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl Environment for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|value| Cow::Borrowed(value.as_str()))
    }
}

impl Environment for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|value| Cow::Borrowed(value.as_str()))
    }
}

impl Environment for Store {
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get_text(name)
    }
}

/// Matches `$NAME`, `${NAME}` and `$$`.
static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z0-9_]+|\{[A-Za-z0-9_.]+\}|\$)").expect("variable expression should compile")
});

/// Substitute the variables defined in `environment` into `source`.
///
/// `$$` becomes `$`, and `$NAME` or `${NAME}` become the value of `NAME` when it is
/// defined. Anything else, including `${NAME, argument="value"}`, is left as written.
pub fn substitute<E>(source: &str, environment: &E) -> String
where
    E: Environment + ?Sized,
{
    VARIABLE
        .replace_all(source, |captures: &Captures| {
            let name = &captures[1];
            if name == "$" {
                return "$".to_string();
            }

            let bare = name
                .strip_prefix('{')
                .and_then(|inner| inner.strip_suffix('}'))
                .unwrap_or(name);
            match environment.lookup(bare) {
                Some(value) => value.into_owned(),
                None => captures[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute() {
        let environment = helper_environment();

        assert_eq!(substitute("$JOB_NAME #$BUILD", &environment), "nightly #$BUILD");
        assert_eq!(substitute("${JOB_NAME}-x", &environment), "nightly-x");
        assert_eq!(substitute("${node.label}", &environment), "linux");
        assert_eq!(substitute("$node.label", &environment), "$node.label");
    }

    #[test]
    fn test_substitute_escape() {
        let environment = helper_environment();

        assert_eq!(substitute("$$JOB_NAME", &environment), "$JOB_NAME");
        assert_eq!(substitute("$$$$JOB_NAME", &environment), "$$JOB_NAME");
        assert_eq!(substitute("$$$JOB_NAME", &environment), "$nightly");
    }

    #[test]
    fn test_substitute_leaves_macros() {
        let environment = helper_environment();
        let source = r#"${JOB_NAME, showPaths=true} ${#JOB_NAME} $5 $"#;

        assert_eq!(substitute(source, &environment), source);
    }

    #[test]
    fn test_store_environment() {
        let store = Store::new()
            .with_must("JOB_NAME", "nightly")
            .with_must("BUILD", 42);

        assert_eq!(substitute("$JOB_NAME #$BUILD", &store), "nightly #42");
    }

    fn helper_environment() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("JOB_NAME".to_string(), "nightly".to_string()),
            ("node.label".to_string(), "linux".to_string()),
        ])
    }
}
